//! Error taxonomy for the cache layer.
//!
//! Everything here is non-fatal by design: a failed fetch or a broken
//! storage surface leaves the in-memory cache untouched and consumers keep
//! rendering whatever was last cached.

use thiserror::Error;

/// Errors produced at the cache and fetch boundaries.
#[derive(Debug, Error)]
pub enum CacheError {
  /// The network request failed (connect, timeout, non-2xx status).
  #[error("network request failed: {0}")]
  Network(String),

  /// The response arrived but did not have the expected shape
  /// (missing `data` envelope, or the payload failed typed deserialization).
  #[error("malformed response: {0}")]
  MalformedResponse(String),

  /// The persistent store could not be opened or written.
  #[error("storage error: {0}")]
  Storage(String),
}

impl From<reqwest::Error> for CacheError {
  fn from(err: reqwest::Error) -> Self {
    CacheError::Network(err.to_string())
  }
}

impl From<serde_json::Error> for CacheError {
  fn from(err: serde_json::Error) -> Self {
    CacheError::MalformedResponse(err.to_string())
  }
}
