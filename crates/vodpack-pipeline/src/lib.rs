//! Video ingestion pipeline: staging, HLS packaging, artifact enumeration
//! and publishing.
//!
//! A single upload moves through four strictly ordered stages:
//!
//! 1. **Staging** — the raw bytes land verbatim in a run-exclusive directory
//!    under the staging root ([`staging::StagingArea`]).
//! 2. **Transcode** — an external tool repackages the staged file into an HLS
//!    manifest plus fixed-duration segments, written into the same directory
//!    ([`transcode::HlsTranscoder`]).
//! 3. **Enumerate** — the staging directory is listed and every entry is
//!    classified as uploadable or excluded ([`enumerate::enumerate_artifacts`]).
//! 4. **Publish** — uploadable artifacts are pushed to the object store one at
//!    a time; individual failures never abort the batch
//!    ([`publish::ArtifactPublisher`]).
//!
//! [`orchestrator::IngestionPipeline`] sequences the stages and produces an
//! [`IngestionReport`](vodpack_core::models::IngestionReport) with one outcome
//! per artifact.

pub mod enumerate;
pub mod error;
pub mod orchestrator;
pub mod publish;
pub mod staging;
pub mod tool;
pub mod transcode;
pub mod validator;

pub use enumerate::{enumerate_artifacts, Artifact, ArtifactKind};
pub use error::{PipelineError, StagingError, TranscodeError};
pub use orchestrator::IngestionPipeline;
pub use publish::ArtifactPublisher;
pub use staging::{StagedVideo, StagingArea};
pub use tool::{SystemToolRunner, ToolInvocation, ToolOutput, ToolRunner};
pub use transcode::{HlsTranscoder, MANIFEST_EXT, SEGMENT_EXT};
pub use validator::{UploadValidator, ValidationError};
