//! Vodpack Storage Library
//!
//! This crate provides the storage abstraction for published artifacts.
//! It includes the Storage trait and implementations for S3 and local filesystem.
//!
//! # Storage key format
//!
//! Published artifacts live under a single configured prefix:
//! `{prefix}/{artifact_file_name}` (default prefix: `media`).
//!
//! Keys must not contain `..` or a leading `/`. Key generation is centralized
//! in the `keys` module so all callers stay consistent.

pub mod factory;
pub mod keys;
#[cfg(feature = "storage-local")]
pub mod local;
#[cfg(feature = "storage-s3")]
pub mod s3;
pub mod traits;

// Re-export commonly used types
pub use factory::create_storage;
pub use keys::artifact_key;
#[cfg(feature = "storage-local")]
pub use local::LocalStorage;
#[cfg(feature = "storage-s3")]
pub use s3::S3Storage;
pub use traits::{Storage, StorageError, StorageResult};
pub use vodpack_core::StorageBackend;
