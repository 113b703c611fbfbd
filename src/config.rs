use color_eyre::{eyre::eyre, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
  pub api: ApiConfig,
  #[serde(default)]
  pub cache: CacheConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
  /// Base url of the fleet API, e.g. "https://fleet.example.com"
  pub url: String,
  /// Request timeout in seconds
  #[serde(default = "default_timeout_secs")]
  pub timeout_secs: u64,
  /// Session file holding the bearer token (defaults to the data directory)
  pub session_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
  /// Cache GET responses of read-heavy resources
  #[serde(default = "default_enabled")]
  pub enabled: bool,
}

impl Default for CacheConfig {
  fn default() -> Self {
    Self {
      enabled: default_enabled(),
    }
  }
}

fn default_timeout_secs() -> u64 {
  30
}

fn default_enabled() -> bool {
  true
}

impl Config {
  /// Load configuration from file.
  ///
  /// Search order:
  /// 1. Explicit path if provided
  /// 2. ./fleetctl.yaml (current directory)
  /// 3. $XDG_CONFIG_HOME/fleetctl/config.yaml
  pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
    let path = if let Some(p) = explicit_path {
      if p.exists() {
        Some(p.to_path_buf())
      } else {
        return Err(eyre!("Config file not found: {}", p.display()));
      }
    } else {
      Self::find_config_file()
    };

    match path {
      Some(p) => Self::load_from_path(&p),
      None => Err(eyre!(
        "No configuration file found. Create one at ~/.config/fleetctl/config.yaml\n\
                 with at least `api: {{ url: https://... }}`."
      )),
    }
  }

  fn find_config_file() -> Option<PathBuf> {
    // Check current directory
    let local = PathBuf::from("fleetctl.yaml");
    if local.exists() {
      return Some(local);
    }

    // Check XDG config directory
    if let Some(config_dir) = dirs::config_dir() {
      let xdg_path = config_dir.join("fleetctl").join("config.yaml");
      if xdg_path.exists() {
        return Some(xdg_path);
      }
    }

    None
  }

  fn load_from_path(path: &Path) -> Result<Self> {
    let contents = std::fs::read_to_string(path)
      .map_err(|e| eyre!("Failed to read config file {}: {}", path.display(), e))?;

    Self::parse(&contents).map_err(|e| eyre!("Failed to parse config file {}: {}", path.display(), e))
  }

  fn parse(contents: &str) -> Result<Self> {
    let config: Config = serde_yaml::from_str(contents)?;
    url::Url::parse(&config.api.url)
      .map_err(|e| eyre!("Invalid api.url '{}': {}", config.api.url, e))?;
    Ok(config)
  }

  /// Get the API token from environment variables, if set.
  ///
  /// Checks FLEETCTL_API_TOKEN first, then FLEET_API_TOKEN as fallback.
  pub fn get_api_token() -> Option<String> {
    std::env::var("FLEETCTL_API_TOKEN")
      .or_else(|_| std::env::var("FLEET_API_TOKEN"))
      .ok()
      .filter(|token| !token.trim().is_empty())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_parse_minimal_config_uses_defaults() {
    let config = Config::parse("api:\n  url: https://fleet.example.com\n").unwrap();

    assert_eq!(config.api.url, "https://fleet.example.com");
    assert_eq!(config.api.timeout_secs, 30);
    assert!(config.api.session_file.is_none());
    assert!(config.cache.enabled);
  }

  #[test]
  fn test_parse_full_config() {
    let yaml = r#"
api:
  url: http://localhost:5000
  timeout_secs: 5
  session_file: /tmp/fleet-session
cache:
  enabled: false
"#;
    let config = Config::parse(yaml).unwrap();

    assert_eq!(config.api.timeout_secs, 5);
    assert_eq!(
      config.api.session_file.as_deref(),
      Some(Path::new("/tmp/fleet-session"))
    );
    assert!(!config.cache.enabled);
  }

  #[test]
  fn test_parse_rejects_bad_url() {
    assert!(Config::parse("api:\n  url: not a url\n").is_err());
  }

  #[test]
  fn test_load_explicit_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("fleetctl.yaml");
    std::fs::write(&path, "api:\n  url: https://fleet.example.com\n").unwrap();

    let config = Config::load(Some(&path)).unwrap();
    assert_eq!(config.api.url, "https://fleet.example.com");
  }

  #[test]
  fn test_load_missing_explicit_path() {
    let err = Config::load(Some(Path::new("/definitely/not/here.yaml"))).unwrap_err();
    assert!(err.to_string().contains("Config file not found"));
  }
}
