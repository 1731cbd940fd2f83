//! Shared key generation for published artifacts.
//!
//! Key format: `{prefix}/{artifact_file_name}`, e.g. `media/clip_000.ts`.

/// Build the destination key for one artifact under the configured prefix.
///
/// The prefix is stripped of surrounding slashes so configuration like
/// `media/` or `/media` produces the same layout. All callers must use this
/// format for consistency.
pub fn artifact_key(prefix: &str, file_name: &str) -> String {
    format!("{}/{}", prefix.trim_matches('/'), file_name)
}
