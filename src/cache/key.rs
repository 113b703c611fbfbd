//! Cache key derivation.

use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

/// Build the cache key for a request path and its query parameters.
///
/// The path stays readable at the front of the key so entries can be
/// invalidated by path. Parameters are canonicalized (object keys sorted at
/// every depth) and hashed, so `{"a":1,"b":2}` and `{"b":2,"a":1}` share a
/// key. Absent parameters and an empty object produce different keys.
pub fn make_key(path: &str, params: Option<&Value>) -> String {
  match params {
    None => path.to_string(),
    Some(params) => {
      let canonical = canonicalize(params).to_string();

      // SHA256 hash for stable, fixed-length keys
      let mut hasher = Sha256::new();
      hasher.update(canonical.as_bytes());
      format!("{}#{}", path, hex::encode(hasher.finalize()))
    }
  }
}

/// Rebuild a JSON value with every object's keys in sorted order.
fn canonicalize(value: &Value) -> Value {
  match value {
    Value::Object(map) => {
      let mut keys: Vec<&String> = map.keys().collect();
      keys.sort();

      let mut sorted = Map::new();
      for key in keys {
        sorted.insert(key.clone(), canonicalize(&map[key]));
      }
      Value::Object(sorted)
    }
    Value::Array(items) => Value::Array(items.iter().map(canonicalize).collect()),
    other => other.clone(),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  #[test]
  fn test_same_request_same_key() {
    let params = json!({"status": "active", "page": 2});
    assert_eq!(
      make_key("/api/vehicles", Some(&params)),
      make_key("/api/vehicles", Some(&params.clone()))
    );
  }

  #[test]
  fn test_param_order_does_not_matter() {
    let a: Value = serde_json::from_str(r#"{"page": 2, "filter": {"y": 1, "x": 0}}"#).unwrap();
    let b: Value = serde_json::from_str(r#"{"filter": {"x": 0, "y": 1}, "page": 2}"#).unwrap();

    assert_eq!(make_key("/api/drivers", Some(&a)), make_key("/api/drivers", Some(&b)));
  }

  #[test]
  fn test_different_params_different_keys() {
    let page1 = json!({"page": 1});
    let page2 = json!({"page": 2});
    let page_str = json!({"page": "1"});

    let k1 = make_key("/api/contracts", Some(&page1));
    assert_ne!(k1, make_key("/api/contracts", Some(&page2)));
    assert_ne!(k1, make_key("/api/contracts", Some(&page_str)));
  }

  #[test]
  fn test_absent_and_empty_params_differ() {
    let empty = json!({});
    assert_ne!(
      make_key("/api/vehicles", None),
      make_key("/api/vehicles", Some(&empty))
    );
  }

  #[test]
  fn test_key_starts_with_path() {
    let params = json!({"q": "van"});
    assert_eq!(make_key("/api/vehicles", None), "/api/vehicles");
    assert!(make_key("/api/vehicles", Some(&params)).starts_with("/api/vehicles#"));
  }

  #[test]
  fn test_array_order_is_significant() {
    let a = json!({"ids": [1, 2]});
    let b = json!({"ids": [2, 1]});
    assert_ne!(make_key("/api/invoices", Some(&a)), make_key("/api/invoices", Some(&b)));
  }
}
