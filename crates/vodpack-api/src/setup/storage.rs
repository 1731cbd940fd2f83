//! Storage setup and initialization

use std::sync::Arc;

use anyhow::Result;
use vodpack_core::Config;
use vodpack_storage::{create_storage, Storage};

/// Setup the artifact storage backend from configuration.
pub async fn setup_storage(config: &Config) -> Result<Arc<dyn Storage>> {
    tracing::info!("Initializing storage abstraction...");
    let storage = create_storage(config).await?;
    tracing::info!(
        backend = %storage.backend_type(),
        key_prefix = %config.media_key_prefix(),
        "Storage abstraction initialized successfully"
    );
    Ok(storage)
}
