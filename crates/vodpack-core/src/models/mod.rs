pub mod ingestion;

pub use ingestion::{
    ArtifactDisposition, ArtifactOutcome, IngestionReport, IngestionRequest, IngestionState,
    PipelineStage,
};
