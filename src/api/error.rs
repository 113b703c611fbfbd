use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;

/// Errors surfaced by the API client.
///
/// Responses served from the cache never produce an error.
#[derive(Debug, Error)]
pub enum ApiError {
  /// The server answered with a non-success status
  #[error("{method} {path} failed with status {status}")]
  Status {
    method: String,
    path: String,
    status: StatusCode,
    data: Value,
  },

  /// The request never produced a response
  #[error("{method} {path} failed: {source}")]
  Transport {
    method: String,
    path: String,
    #[source]
    source: reqwest::Error,
  },

  #[error("invalid request url: {0}")]
  InvalidUrl(#[from] url::ParseError),

  #[error("invalid header value: {0}")]
  InvalidHeader(#[from] reqwest::header::InvalidHeaderValue),

  #[error("failed to build HTTP client: {0}")]
  Build(#[source] reqwest::Error),
}

impl ApiError {
  /// HTTP status of the failed response, if there was one.
  pub fn status(&self) -> Option<StatusCode> {
    match self {
      Self::Status { status, .. } => Some(*status),
      _ => None,
    }
  }
}
