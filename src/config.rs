use color_eyre::{eyre::eyre, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
  pub api: ApiConfig,
  pub search: SearchConfig,
  pub cache: CacheConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
  /// Base URL of the Unsplash API
  pub url: String,
  /// Photos requested per page
  pub page_size: u32,
  /// Ordering hint sent with every request
  pub order_by: String,
  /// Per-request timeout; a request that exceeds it fails like any other network error
  pub timeout_secs: u64,
}

impl Default for ApiConfig {
  fn default() -> Self {
    Self {
      url: "https://api.unsplash.com".to_string(),
      page_size: 20,
      order_by: "popular".to_string(),
      timeout_secs: 30,
    }
  }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
  /// Quiet period after the last keystroke before a search is dispatched
  pub debounce_ms: u64,
}

impl Default for SearchConfig {
  fn default() -> Self {
    Self { debounce_ms: 800 }
  }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
  pub enabled: bool,
  /// Entries older than this are refetched. Unset means entries never expire.
  pub max_age_secs: Option<u64>,
  /// Database location (defaults to the platform data directory)
  pub path: Option<PathBuf>,
}

impl Default for CacheConfig {
  fn default() -> Self {
    Self {
      enabled: true,
      max_age_secs: None,
      path: None,
    }
  }
}

impl Config {
  /// Load configuration from file.
  ///
  /// Search order:
  /// 1. Explicit path if provided
  /// 2. ./shutter.yaml (current directory)
  /// 3. $XDG_CONFIG_HOME/shutter/config.yaml
  ///
  /// Every setting has a default, so running without a file is fine.
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
      None => Ok(Self::default()),
    }
  }

  fn find_config_file() -> Option<PathBuf> {
    // Check current directory
    let local = PathBuf::from("shutter.yaml");
    if local.exists() {
      return Some(local);
    }

    // Check XDG config directory
    if let Some(config_dir) = dirs::config_dir() {
      let xdg_path = config_dir.join("shutter").join("config.yaml");
      if xdg_path.exists() {
        return Some(xdg_path);
      }
    }

    None
  }

  fn load_from_path(path: &Path) -> Result<Self> {
    let contents = std::fs::read_to_string(path)
      .map_err(|e| eyre!("Failed to read config file {}: {}", path.display(), e))?;

    Self::from_yaml(&contents)
      .map_err(|e| eyre!("Failed to parse config file {}: {}", path.display(), e))
  }

  fn from_yaml(contents: &str) -> Result<Self, serde_yaml::Error> {
    // An empty file deserializes to unit, not to a mapping
    if contents.trim().is_empty() {
      return Ok(Self::default());
    }
    serde_yaml::from_str(contents)
  }

  /// Get the Unsplash access key from environment variables.
  ///
  /// Checks SHUTTER_ACCESS_KEY first, then UNSPLASH_ACCESS_KEY as fallback.
  pub fn get_access_key() -> Result<String> {
    std::env::var("SHUTTER_ACCESS_KEY")
      .or_else(|_| std::env::var("UNSPLASH_ACCESS_KEY"))
      .map_err(|_| {
        eyre!(
          "Unsplash access key not found. Set SHUTTER_ACCESS_KEY or UNSPLASH_ACCESS_KEY environment variable."
        )
      })
  }

  pub fn debounce(&self) -> Duration {
    Duration::from_millis(self.search.debounce_ms)
  }

  pub fn request_timeout(&self) -> Duration {
    Duration::from_secs(self.api.timeout_secs)
  }

  pub fn cache_max_age(&self) -> Option<chrono::Duration> {
    self
      .cache
      .max_age_secs
      .and_then(|secs| i64::try_from(secs).ok())
      .and_then(chrono::Duration::try_seconds)
  }
}
