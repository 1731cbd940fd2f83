//! Application state shared across handlers.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use vodpack_pipeline::{IngestionPipeline, UploadValidator};
use vodpack_storage::Storage;

/// Everything a handler needs, assembled once at startup.
///
/// The pipeline holds no per-run state, so a single instance serves all
/// concurrent uploads. `shutdown` is the parent token for every ingestion
/// run; cancelling it terminates in-flight transcodes during shutdown.
pub struct AppState {
    pub pipeline: IngestionPipeline,
    pub storage: Arc<dyn Storage>,
    pub validator: UploadValidator,
    pub shutdown: CancellationToken,
}

fn _assert_app_state_send_sync() {
    fn assert_send<T: Send>() {}
    fn assert_sync<T: Sync>() {}
    assert_send::<AppState>();
    assert_sync::<AppState>();
}
