//! HTTP-level tests for the upload endpoint, error mapping, and the health
//! probes. The transcoding tool and the object store are faked so the tests
//! exercise the service boundary rather than ffmpeg or a real backend.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum_test::multipart::{MultipartForm, Part};
use axum_test::TestServer;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use vodpack_api::setup::routes::setup_routes;
use vodpack_api::AppState;
use vodpack_core::{Config, StorageBackend};
use vodpack_pipeline::{
    ArtifactPublisher, HlsTranscoder, IngestionPipeline, StagingArea, ToolInvocation, ToolOutput,
    ToolRunner, TranscodeError, UploadValidator,
};
use vodpack_storage::{Storage, StorageError, StorageResult};

const MAX_TEST_FILE_SIZE: usize = 8 * 1024 * 1024;

/// Stands in for the transcoding tool: reads the segment pattern and manifest
/// path out of the arguments it receives and writes both to disk.
struct FakeFfmpeg {
    segments: usize,
}

fn arg_after(invocation: &ToolInvocation, flag: &str) -> Option<String> {
    let mut args = invocation.args.iter();
    while let Some(arg) = args.next() {
        if arg == flag {
            return args.next().cloned();
        }
    }
    None
}

#[async_trait]
impl ToolRunner for FakeFfmpeg {
    async fn run(
        &self,
        invocation: ToolInvocation,
        _cancel: &CancellationToken,
    ) -> Result<ToolOutput, TranscodeError> {
        let segment_pattern = arg_after(&invocation, "-hls_segment_filename")
            .expect("segment filename flag missing");
        let manifest_path = PathBuf::from(
            invocation
                .args
                .last()
                .expect("manifest path missing")
                .clone(),
        );

        let mut manifest = String::from("#EXTM3U\n#EXT-X-VERSION:3\n");
        for i in 0..self.segments {
            let segment_path = PathBuf::from(segment_pattern.replace("%03d", &format!("{i:03}")));
            tokio::fs::write(&segment_path, format!("segment {i} payload"))
                .await
                .unwrap();
            let segment_name = segment_path
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap()
                .to_string();
            manifest.push_str(&format!("#EXTINF:10.0,\n{segment_name}\n"));
        }
        manifest.push_str("#EXT-X-ENDLIST\n");
        tokio::fs::write(&manifest_path, manifest).await.unwrap();

        Ok(ToolOutput::succeeded())
    }
}

/// Tool fake that exits non-zero without writing anything.
struct BrokenFfmpeg;

#[async_trait]
impl ToolRunner for BrokenFfmpeg {
    async fn run(
        &self,
        _invocation: ToolInvocation,
        _cancel: &CancellationToken,
    ) -> Result<ToolOutput, TranscodeError> {
        Ok(ToolOutput {
            success: false,
            code: Some(1),
            stderr: "moov atom not found".to_string(),
        })
    }
}

/// In-memory object store; can be told to reject specific keys.
struct MemoryStorage {
    objects: Mutex<HashMap<String, Vec<u8>>>,
    fail_keys: Vec<String>,
}

impl MemoryStorage {
    fn new() -> Self {
        Self {
            objects: Mutex::new(HashMap::new()),
            fail_keys: Vec::new(),
        }
    }

    fn failing_on(keys: &[&str]) -> Self {
        Self {
            objects: Mutex::new(HashMap::new()),
            fail_keys: keys.iter().map(|k| k.to_string()).collect(),
        }
    }

    fn keys(&self) -> Vec<String> {
        let mut keys: Vec<_> = self.objects.lock().unwrap().keys().cloned().collect();
        keys.sort();
        keys
    }

    fn is_empty(&self) -> bool {
        self.objects.lock().unwrap().is_empty()
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn upload(
        &self,
        storage_key: &str,
        data: Vec<u8>,
        _content_type: &str,
    ) -> StorageResult<()> {
        if self.fail_keys.iter().any(|k| k == storage_key) {
            return Err(StorageError::UploadFailed(format!(
                "injected failure for {storage_key}"
            )));
        }
        self.objects
            .lock()
            .unwrap()
            .insert(storage_key.to_string(), data);
        Ok(())
    }

    async fn download(&self, storage_key: &str) -> StorageResult<Vec<u8>> {
        self.objects
            .lock()
            .unwrap()
            .get(storage_key)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(storage_key.to_string()))
    }

    async fn exists(&self, storage_key: &str) -> StorageResult<bool> {
        Ok(self.objects.lock().unwrap().contains_key(storage_key))
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Local
    }
}

/// Router plus the fakes behind it. The staging tempdir is kept alive for the
/// duration of the test.
struct TestApp {
    server: TestServer,
    storage: Arc<MemoryStorage>,
    _staging: tempfile::TempDir,
}

fn spawn_app_with(runner: Arc<dyn ToolRunner>, storage: Arc<MemoryStorage>) -> TestApp {
    let staging = tempfile::tempdir().unwrap();
    let config = Config::from_env().expect("default config should load");

    let pipeline = IngestionPipeline::new(
        StagingArea::new(staging.path()),
        HlsTranscoder::new("ffmpeg", 10, None, runner),
        ArtifactPublisher::new(storage.clone(), "media"),
    );
    let validator = UploadValidator::new(
        MAX_TEST_FILE_SIZE,
        vec!["mp4".to_string(), "mov".to_string(), "mkv".to_string()],
    );
    let state = Arc::new(AppState {
        pipeline,
        storage: storage.clone(),
        validator,
        shutdown: CancellationToken::new(),
    });

    let router = setup_routes(&config, state).expect("router setup");
    TestApp {
        server: TestServer::new(router).expect("test server"),
        storage,
        _staging: staging,
    }
}

fn spawn_app() -> TestApp {
    spawn_app_with(
        Arc::new(FakeFfmpeg { segments: 2 }),
        Arc::new(MemoryStorage::new()),
    )
}

fn video_form(file_name: &str, data: &[u8]) -> MultipartForm {
    let part = Part::bytes(bytes::Bytes::copy_from_slice(data))
        .file_name(file_name)
        .mime_type("video/mp4");
    MultipartForm::new().add_part("file", part)
}

fn artifact<'a>(report: &'a serde_json::Value, file_name: &str) -> &'a serde_json::Value {
    report
        .get("artifacts")
        .and_then(|a| a.as_array())
        .and_then(|a| {
            a.iter()
                .find(|o| o.get("file_name").and_then(|n| n.as_str()) == Some(file_name))
        })
        .unwrap_or_else(|| panic!("Expected artifact '{file_name}' in report"))
}

#[tokio::test]
async fn test_upload_returns_done_report() {
    let app = spawn_app();

    let response = app
        .server
        .post("/api/v0/videos")
        .multipart(video_form("clip.mp4", b"raw mp4 bytes"))
        .await;

    assert_eq!(response.status_code(), 200);
    let report: serde_json::Value = response.json();

    assert_eq!(report.get("state").and_then(|s| s.as_str()), Some("done"));
    assert_eq!(
        report.get("base_name").and_then(|s| s.as_str()),
        Some("clip")
    );
    assert_eq!(
        report.get("manifest").and_then(|s| s.as_str()),
        Some("clip.m3u8")
    );
    Uuid::parse_str(
        report
            .get("run_id")
            .and_then(|v| v.as_str())
            .expect("Expected 'run_id' in report"),
    )
    .expect("Invalid UUID in report");

    let manifest = artifact(&report, "clip.m3u8");
    assert_eq!(
        manifest.get("disposition").and_then(|d| d.as_str()),
        Some("uploaded")
    );
    assert_eq!(
        manifest.get("key").and_then(|k| k.as_str()),
        Some("media/clip.m3u8")
    );

    // The original upload stays in staging and never reaches the store.
    let raw = artifact(&report, "clip.mp4");
    assert_eq!(
        raw.get("disposition").and_then(|d| d.as_str()),
        Some("excluded")
    );
    assert!(raw.get("key").is_none());

    assert_eq!(
        app.storage.keys(),
        vec!["media/clip.m3u8", "media/clip_000.ts", "media/clip_001.ts"]
    );
}

#[tokio::test]
async fn test_upload_same_name_twice_is_conflict() {
    let app = spawn_app();

    let first = app
        .server
        .post("/api/v0/videos")
        .multipart(video_form("clip.mp4", b"first"))
        .await;
    assert_eq!(first.status_code(), 200);

    let second = app
        .server
        .post("/api/v0/videos")
        .multipart(video_form("clip.mp4", b"second"))
        .await;
    assert_eq!(second.status_code(), 409);

    let body: serde_json::Value = second.json();
    assert_eq!(
        body.get("code").and_then(|c| c.as_str()),
        Some("STAGING_CONFLICT")
    );
    let message = body.get("error").and_then(|e| e.as_str()).unwrap();
    assert!(message.contains("clip"));
    // Server-side staging paths must not leak to clients.
    assert!(!message.contains('/'));
}

#[tokio::test]
async fn test_upload_rejects_unknown_extension() {
    let app = spawn_app();

    let response = app
        .server
        .post("/api/v0/videos")
        .multipart(video_form("clip.wmv", b"not a supported container"))
        .await;

    assert_eq!(response.status_code(), 400);
    let body: serde_json::Value = response.json();
    assert_eq!(
        body.get("code").and_then(|c| c.as_str()),
        Some("INVALID_INPUT")
    );
    assert!(app.storage.is_empty());
}

#[tokio::test]
async fn test_upload_rejects_empty_file() {
    let app = spawn_app();

    let response = app
        .server
        .post("/api/v0/videos")
        .multipart(video_form("clip.mp4", b""))
        .await;

    assert_eq!(response.status_code(), 400);
    let body: serde_json::Value = response.json();
    assert_eq!(
        body.get("code").and_then(|c| c.as_str()),
        Some("INVALID_INPUT")
    );
}

#[tokio::test]
async fn test_upload_requires_file_field() {
    let app = spawn_app();

    let form = MultipartForm::new().add_text("name", "clip");
    let response = app.server.post("/api/v0/videos").multipart(form).await;

    assert_eq!(response.status_code(), 400);
    let body: serde_json::Value = response.json();
    assert_eq!(
        body.get("code").and_then(|c| c.as_str()),
        Some("INVALID_INPUT")
    );
}

#[tokio::test]
async fn test_upload_requires_filename() {
    let app = spawn_app();

    // A file part without a filename gives the pipeline nothing to derive
    // the staging directory from.
    let part = Part::bytes(bytes::Bytes::from_static(b"raw mp4 bytes")).mime_type("video/mp4");
    let form = MultipartForm::new().add_part("file", part);
    let response = app.server.post("/api/v0/videos").multipart(form).await;

    assert_eq!(response.status_code(), 400);
    let body: serde_json::Value = response.json();
    assert_eq!(
        body.get("code").and_then(|c| c.as_str()),
        Some("INVALID_INPUT")
    );
}

#[tokio::test]
async fn test_upload_larger_than_limit_is_413() {
    let app = spawn_app();

    let oversized = vec![0u8; MAX_TEST_FILE_SIZE + 1];
    let response = app
        .server
        .post("/api/v0/videos")
        .multipart(video_form("clip.mp4", &oversized))
        .await;

    assert_eq!(response.status_code(), 413);
    let body: serde_json::Value = response.json();
    assert_eq!(
        body.get("code").and_then(|c| c.as_str()),
        Some("PAYLOAD_TOO_LARGE")
    );
}

#[tokio::test]
async fn test_transcode_failure_maps_to_500() {
    let app = spawn_app_with(Arc::new(BrokenFfmpeg), Arc::new(MemoryStorage::new()));

    let response = app
        .server
        .post("/api/v0/videos")
        .multipart(video_form("clip.mp4", b"truncated"))
        .await;

    assert_eq!(response.status_code(), 500);
    let body: serde_json::Value = response.json();
    assert_eq!(
        body.get("code").and_then(|c| c.as_str()),
        Some("TRANSCODE_FAILED")
    );
    // Tool stderr is logged server-side, never returned to clients.
    assert!(!body.to_string().contains("moov atom"));
    assert!(app.storage.is_empty());
}

#[tokio::test]
async fn test_partial_upload_failure_is_still_done() {
    let storage = Arc::new(MemoryStorage::failing_on(&["media/clip_001.ts"]));
    let app = spawn_app_with(Arc::new(FakeFfmpeg { segments: 2 }), storage);

    let response = app
        .server
        .post("/api/v0/videos")
        .multipart(video_form("clip.mp4", b"raw mp4 bytes"))
        .await;

    // Per-artifact failures are reported in the body, not as an HTTP error.
    assert_eq!(response.status_code(), 200);
    let report: serde_json::Value = response.json();
    assert_eq!(report.get("state").and_then(|s| s.as_str()), Some("done"));

    let failed = artifact(&report, "clip_001.ts");
    assert_eq!(
        failed.get("disposition").and_then(|d| d.as_str()),
        Some("failed")
    );
    assert!(failed
        .get("error")
        .and_then(|e| e.as_str())
        .unwrap()
        .contains("injected failure"));

    assert_eq!(
        app.storage.keys(),
        vec!["media/clip.m3u8", "media/clip_000.ts"]
    );
}

#[tokio::test]
async fn test_health_endpoint_reports_storage() {
    let app = spawn_app();

    let response = app.server.get("/health").await;
    assert_eq!(response.status_code(), 200);

    let body: serde_json::Value = response.json();
    assert_eq!(
        body.get("status").and_then(|s| s.as_str()),
        Some("healthy")
    );
    assert_eq!(
        body.get("storage").and_then(|s| s.as_str()),
        Some("healthy")
    );
    assert_eq!(
        body.get("storage_backend").and_then(|s| s.as_str()),
        Some("local")
    );
}

#[tokio::test]
async fn test_liveness_endpoint() {
    let app = spawn_app();

    let response = app.server.get("/live").await;
    assert_eq!(response.status_code(), 200);

    let body: serde_json::Value = response.json();
    assert_eq!(body.get("status").and_then(|s| s.as_str()), Some("alive"));
}
