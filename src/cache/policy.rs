//! Decides which requests are eligible for caching.

use reqwest::Method;

/// Read-heavy resources whose GET responses may be cached.
pub const ALLOWED_ROUTES: &[&str] = &[
  "/api/vehicles",
  "/api/contracts",
  "/api/drivers",
  "/api/dashboard",
  "/api/settings",
  "/api/invoices",
  "/api/expenses",
];

/// Mutating or sensitive routes that are never cached, even on GET.
pub const DENIED_ROUTES: &[&str] = &[
  "/upload",
  "/delete",
  "/auth",
  "/login",
  "/register",
  "/logout",
  "/whatsapp",
];

/// Route classifier built from substring allow- and deny-lists.
#[derive(Debug, Clone)]
pub struct RoutePolicy {
  allow: &'static [&'static str],
  deny: &'static [&'static str],
}

impl Default for RoutePolicy {
  fn default() -> Self {
    Self {
      allow: ALLOWED_ROUTES,
      deny: DENIED_ROUTES,
    }
  }
}

impl RoutePolicy {
  /// Whether a request may be served from or written to the cache.
  ///
  /// Only GET qualifies, the deny-list wins over the allow-list, and
  /// anything not allow-listed is not cached.
  pub fn is_cacheable(&self, url: &str, method: &Method) -> bool {
    if *method != Method::GET {
      return false;
    }

    if self.deny.iter().any(|pattern| url.contains(pattern)) {
      return false;
    }

    self.allow.iter().any(|pattern| url.contains(pattern))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_allow_listed_get_is_cacheable() {
    let policy = RoutePolicy::default();
    assert!(policy.is_cacheable("/api/vehicles", &Method::GET));
    assert!(policy.is_cacheable("/api/dashboard/stats", &Method::GET));
    assert!(policy.is_cacheable("/api/settings", &Method::GET));
  }

  #[test]
  fn test_non_get_is_never_cacheable() {
    let policy = RoutePolicy::default();
    for method in [
      Method::POST,
      Method::PUT,
      Method::PATCH,
      Method::DELETE,
      Method::HEAD,
      Method::OPTIONS,
    ] {
      assert!(!policy.is_cacheable("/api/vehicles", &method), "{}", method);
    }
  }

  #[test]
  fn test_deny_list_wins() {
    let policy = RoutePolicy::default();
    assert!(!policy.is_cacheable("/api/vehicles/login", &Method::GET));
    assert!(!policy.is_cacheable("/api/vehicles/7/upload", &Method::GET));
    assert!(!policy.is_cacheable("/api/auth/me", &Method::GET));
  }

  #[test]
  fn test_unknown_route_is_not_cacheable() {
    let policy = RoutePolicy::default();
    assert!(!policy.is_cacheable("/api/reports/export", &Method::GET));
    assert!(!policy.is_cacheable("/health", &Method::GET));
  }
}
