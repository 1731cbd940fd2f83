//! Vodpack API Library
//!
//! This crate provides the HTTP boundary for the ingestion pipeline: the
//! upload handler, health probes, and application setup.

mod telemetry;
mod utils;

// Public modules
pub mod constants;
pub mod error;
pub mod handlers;
pub mod setup;
pub mod state;

// Re-exports
pub use error::{ErrorResponse, HttpAppError};
pub use state::AppState;
