//! Cached API client that wraps a transport with transparent caching.

use reqwest::header::{HeaderValue, AUTHORIZATION};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::cache::{CacheLayer, Outbound};

use super::client::Transport;
use super::error::ApiError;
use super::session::CredentialStore;
use super::types::{ApiRequest, ApiResponse};

/// API client with transparent caching support.
///
/// This wraps the underlying transport and provides the same calls, but
/// answers repeated GETs of read-heavy resources from the cache. A cached
/// answer is only distinguishable by `ApiResponse::from_cache`.
///
/// Concurrent misses on the same key are not collapsed: each one goes to the
/// network and the last response stored wins.
pub struct CachedApiClient<T> {
  inner: T,
  cache: CacheLayer,
  credentials: Arc<dyn CredentialStore>,
}

impl<T: Transport> CachedApiClient<T> {
  /// Create a new cached client.
  pub fn new(inner: T, cache: CacheLayer, credentials: impl CredentialStore + 'static) -> Self {
    Self {
      inner,
      cache,
      credentials: Arc::new(credentials),
    }
  }

  /// The cache shared by this client.
  pub fn cache(&self) -> &CacheLayer {
    &self.cache
  }

  pub async fn get(&self, path: &str, params: Option<Value>) -> Result<ApiResponse, ApiError> {
    let mut request = ApiRequest::get(path);
    request.params = params;
    self.send(request).await
  }

  pub async fn post(&self, path: &str, body: Value) -> Result<ApiResponse, ApiError> {
    self.send(ApiRequest::post(path, body)).await
  }

  pub async fn put(&self, path: &str, body: Value) -> Result<ApiResponse, ApiError> {
    self.send(ApiRequest::put(path, body)).await
  }

  pub async fn delete(&self, path: &str) -> Result<ApiResponse, ApiError> {
    self.send(ApiRequest::delete(path)).await
  }

  /// Send a request through the cache.
  ///
  /// 1. Attach the session token, if any
  /// 2. Cacheable and cached - answer from the cache without touching the network
  /// 3. Otherwise call the transport
  /// 4. Store successful cacheable responses; error responses are returned as
  ///    errors and never stored
  pub async fn send(&self, mut request: ApiRequest) -> Result<ApiResponse, ApiError> {
    self.authorize(&mut request)?;

    let outbound = self
      .cache
      .outbound(&request.method, &request.path, request.params.as_ref());

    let cache_key = match outbound {
      Outbound::CacheHit(payload) => {
        debug!(method = %request.method, path = %request.path, "served from cache");
        return Ok(ApiResponse::cached(payload));
      }
      Outbound::Network { cache_key } => cache_key,
    };

    let response = self.inner.send(&request).await?;

    if !response.is_success() {
      warn!(
        method = %request.method,
        path = %request.path,
        status = %response.status,
        "request failed"
      );
      return Err(ApiError::Status {
        method: request.method.to_string(),
        path: request.path,
        status: response.status,
        data: response.data,
      });
    }

    if let Some(key) = cache_key {
      self.cache.store(&key, response.data.clone());
    }

    Ok(response)
  }

  /// Drop cached responses, all of them or those whose key contains `pattern`.
  ///
  /// Returns the number of entries removed.
  pub fn clear_api_cache(&self, pattern: Option<&str>) -> usize {
    self.cache.invalidate(pattern)
  }

  fn authorize(&self, request: &mut ApiRequest) -> Result<(), ApiError> {
    if let Some(token) = self.credentials.bearer_token() {
      let mut value = HeaderValue::from_str(&format!("Bearer {}", token))?;
      value.set_sensitive(true);
      request.headers.insert(AUTHORIZATION, value);
    }
    Ok(())
  }
}

impl<T: Clone> Clone for CachedApiClient<T> {
  fn clone(&self) -> Self {
    Self {
      inner: self.inner.clone(),
      cache: self.cache.clone(),
      credentials: Arc::clone(&self.credentials),
    }
  }
}
