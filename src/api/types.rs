//! Request and response types shared by the transport and the cached client.

use reqwest::header::HeaderMap;
use reqwest::{Method, StatusCode};
use serde_json::Value;

/// An outgoing API call.
#[derive(Debug, Clone)]
pub struct ApiRequest {
  pub method: Method,
  /// Path relative to the API base url, e.g. `/api/vehicles`
  pub path: String,
  /// Query parameters as a JSON object
  pub params: Option<Value>,
  /// JSON request body
  pub body: Option<Value>,
  pub headers: HeaderMap,
}

impl ApiRequest {
  pub fn new(method: Method, path: impl Into<String>) -> Self {
    Self {
      method,
      path: path.into(),
      params: None,
      body: None,
      headers: HeaderMap::new(),
    }
  }

  pub fn get(path: impl Into<String>) -> Self {
    Self::new(Method::GET, path)
  }

  pub fn post(path: impl Into<String>, body: Value) -> Self {
    Self::new(Method::POST, path).with_body(body)
  }

  pub fn put(path: impl Into<String>, body: Value) -> Self {
    Self::new(Method::PUT, path).with_body(body)
  }

  pub fn delete(path: impl Into<String>) -> Self {
    Self::new(Method::DELETE, path)
  }

  pub fn with_params(mut self, params: Value) -> Self {
    self.params = Some(params);
    self
  }

  pub fn with_body(mut self, body: Value) -> Self {
    self.body = Some(body);
    self
  }

  /// Query string pairs derived from `params`.
  pub fn query_pairs(&self) -> Vec<(String, String)> {
    self.params.as_ref().map(query_pairs).unwrap_or_default()
  }
}

/// A resolved API call.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
  pub status: StatusCode,
  pub data: Value,
  /// Set when the response was answered from the local cache
  pub from_cache: bool,
}

impl ApiResponse {
  /// A response that came from the network.
  pub fn new(status: StatusCode, data: Value) -> Self {
    Self {
      status,
      data,
      from_cache: false,
    }
  }

  /// A synthesized response carrying a cached payload.
  pub fn cached(data: Value) -> Self {
    Self {
      status: StatusCode::OK,
      data,
      from_cache: true,
    }
  }

  pub fn is_success(&self) -> bool {
    self.status.is_success()
  }
}

/// Flatten a JSON object into query string pairs.
///
/// Arrays repeat their key, nulls are dropped, strings are used as-is and
/// other scalars use their JSON text.
pub fn query_pairs(params: &Value) -> Vec<(String, String)> {
  let Value::Object(map) = params else {
    return Vec::new();
  };

  let mut pairs = Vec::new();
  for (key, value) in map {
    match value {
      Value::Null => {}
      Value::Array(items) => {
        pairs.extend(items.iter().map(|item| (key.clone(), query_value(item))));
      }
      other => pairs.push((key.clone(), query_value(other))),
    }
  }
  pairs
}

fn query_value(value: &Value) -> String {
  match value {
    Value::String(s) => s.clone(),
    other => other.to_string(),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  #[test]
  fn test_query_pairs_flatten_scalars_and_arrays() {
    let params = json!({"status": "active", "page": 2, "ids": [1, 2], "skip": null});
    let mut pairs = query_pairs(&params);
    pairs.sort();

    assert_eq!(
      pairs,
      vec![
        ("ids".to_string(), "1".to_string()),
        ("ids".to_string(), "2".to_string()),
        ("page".to_string(), "2".to_string()),
        ("status".to_string(), "active".to_string()),
      ]
    );
  }

  #[test]
  fn test_query_pairs_ignore_non_objects() {
    assert!(query_pairs(&json!([1, 2])).is_empty());
    assert!(ApiRequest::get("/api/vehicles").query_pairs().is_empty());
  }

  #[test]
  fn test_cached_response_is_marked() {
    let response = ApiResponse::cached(json!([]));
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.from_cache);
    assert!(!ApiResponse::new(StatusCode::OK, json!([])).from_cache);
  }
}
