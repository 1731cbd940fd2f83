//! API constants
//!
//! This module defines constants used throughout the API, including versioning.

/// Versioned API path prefix.
pub const API_PREFIX: &str = "/api/v0";
