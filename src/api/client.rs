use serde_json::Value;
use std::future::Future;
use std::time::Duration;
use tracing::debug;
use url::Url;

use crate::config::ApiConfig;

use super::error::ApiError;
use super::types::{ApiRequest, ApiResponse};

/// The network side of the API client.
pub trait Transport: Send + Sync {
  /// Perform the request and return whatever the server answered,
  /// including non-success statuses.
  fn send(&self, request: &ApiRequest) -> impl Future<Output = Result<ApiResponse, ApiError>> + Send;
}

/// Fleet API transport over reqwest
#[derive(Clone)]
pub struct HttpClient {
  client: reqwest::Client,
  base_url: Url,
}

impl HttpClient {
  pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
    // A trailing slash keeps any path prefix of the base url when joining
    let mut base = config.url.clone();
    if !base.ends_with('/') {
      base.push('/');
    }
    let base_url = Url::parse(&base)?;

    let client = reqwest::Client::builder()
      .timeout(Duration::from_secs(config.timeout_secs))
      .build()
      .map_err(ApiError::Build)?;

    Ok(Self { client, base_url })
  }

  /// Resolve an API path against the base url.
  pub fn url_for(&self, path: &str) -> Result<Url, ApiError> {
    Ok(self.base_url.join(path.trim_start_matches('/'))?)
  }
}

impl Transport for HttpClient {
  async fn send(&self, request: &ApiRequest) -> Result<ApiResponse, ApiError> {
    let url = self.url_for(&request.path)?;
    let transport_error = |source: reqwest::Error| ApiError::Transport {
      method: request.method.to_string(),
      path: request.path.clone(),
      source,
    };

    let mut builder = self
      .client
      .request(request.method.clone(), url)
      .headers(request.headers.clone());

    let query = request.query_pairs();
    if !query.is_empty() {
      builder = builder.query(&query);
    }
    if let Some(body) = &request.body {
      builder = builder.json(body);
    }

    let response = builder.send().await.map_err(transport_error)?;
    let status = response.status();
    let bytes = response.bytes().await.map_err(transport_error)?;

    debug!(method = %request.method, path = %request.path, %status, len = bytes.len(), "response");

    Ok(ApiResponse::new(status, decode_body(&bytes)))
  }
}

/// Decode a response body, keeping non-JSON bodies as text.
fn decode_body(bytes: &[u8]) -> Value {
  if bytes.is_empty() {
    return Value::Null;
  }

  serde_json::from_slice(bytes)
    .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(bytes).into_owned()))
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  fn client(url: &str) -> HttpClient {
    HttpClient::new(&ApiConfig {
      url: url.to_string(),
      timeout_secs: 5,
      session_file: None,
    })
    .unwrap()
  }

  #[test]
  fn test_url_for_keeps_base_path() {
    let http = client("https://fleet.example.com/backend");
    assert_eq!(
      http.url_for("/api/vehicles").unwrap().as_str(),
      "https://fleet.example.com/backend/api/vehicles"
    );
  }

  #[test]
  fn test_url_for_plain_host() {
    let http = client("http://localhost:5000/");
    assert_eq!(
      http.url_for("api/drivers").unwrap().as_str(),
      "http://localhost:5000/api/drivers"
    );
  }

  #[test]
  fn test_decode_body() {
    assert_eq!(decode_body(b""), Value::Null);
    assert_eq!(decode_body(br#"{"ok":true}"#), json!({"ok": true}));
    assert_eq!(decode_body(b"Not Found"), json!("Not Found"));
  }
}
