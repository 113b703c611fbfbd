//! Sources of the bearer token attached to outgoing requests.

use color_eyre::{eyre::eyre, Result};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Read-only access to the current session credential.
pub trait CredentialStore: Send + Sync {
  /// The bearer token to send, if a session exists.
  fn bearer_token(&self) -> Option<String>;
}

/// A token fixed at startup (e.g. from the environment).
#[derive(Debug, Clone, Default)]
pub struct StaticToken(Option<String>);

impl StaticToken {
  pub fn new(token: impl Into<String>) -> Self {
    Self(Some(token.into()))
  }

  /// No credential at all.
  pub fn none() -> Self {
    Self(None)
  }
}

impl CredentialStore for StaticToken {
  fn bearer_token(&self) -> Option<String> {
    self.0.clone()
  }
}

/// A session file holding the token, re-read on every request so a new
/// login is picked up without restarting.
#[derive(Debug, Clone)]
pub struct SessionFile {
  path: PathBuf,
}

impl SessionFile {
  pub fn new(path: impl Into<PathBuf>) -> Self {
    Self { path: path.into() }
  }

  /// Session file at the default location.
  pub fn open_default() -> Result<Self> {
    Ok(Self::new(Self::default_path()?))
  }

  /// Get the default session file path.
  fn default_path() -> Result<PathBuf> {
    let data_dir = dirs::data_dir()
      .or_else(|| dirs::home_dir().map(|p| p.join(".local/share")))
      .ok_or_else(|| eyre!("Could not determine data directory"))?;

    Ok(data_dir.join("fleetctl").join("session"))
  }

  pub fn path(&self) -> &Path {
    &self.path
  }
}

impl CredentialStore for SessionFile {
  fn bearer_token(&self) -> Option<String> {
    match std::fs::read_to_string(&self.path) {
      Ok(contents) => {
        let token = contents.trim();
        (!token.is_empty()).then(|| token.to_string())
      }
      Err(e) => {
        debug!(path = %self.path.display(), error = %e, "no session token");
        None
      }
    }
  }
}
