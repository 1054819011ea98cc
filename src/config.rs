use chrono::Duration;
use color_eyre::{eyre::eyre, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::cache::{ExpiryPolicy, SqliteStore};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
  #[serde(default)]
  pub api: ApiConfig,
  #[serde(default)]
  pub cache: CacheConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiConfig {
  /// Base URL of the portal content API (e.g. "https://play.example.com/").
  pub base_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
  /// Override for the cache database location.
  pub dir: Option<PathBuf>,
  /// Default time-to-live for cached content, in seconds.
  #[serde(default = "default_ttl_seconds")]
  pub ttl_seconds: u64,
  /// Per-kind TTL overrides, keyed by kind name (e.g. "navigation").
  #[serde(default)]
  pub ttl_overrides: BTreeMap<String, u64>,
  /// How often cross-process watchers poll the store, in seconds.
  #[serde(default = "default_sync_interval_seconds")]
  pub sync_interval_seconds: u64,
}

fn default_ttl_seconds() -> u64 {
  ExpiryPolicy::DEFAULT_TTL_SECONDS as u64
}

fn default_sync_interval_seconds() -> u64 {
  2
}

impl Default for CacheConfig {
  fn default() -> Self {
    Self {
      dir: None,
      ttl_seconds: default_ttl_seconds(),
      ttl_overrides: BTreeMap::new(),
      sync_interval_seconds: default_sync_interval_seconds(),
    }
  }
}

impl Config {
  /// Load configuration from file.
  ///
  /// Search order:
  /// 1. Explicit path if provided
  /// 2. ./langcache.yaml (current directory)
  /// 3. $XDG_CONFIG_HOME/langcache/config.yaml
  ///
  /// A missing file (without an explicit path) falls back to defaults -
  /// the cache works unconfigured, only fetching needs a base URL.
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
    let local = PathBuf::from("langcache.yaml");
    if local.exists() {
      return Some(local);
    }

    // Check XDG config directory
    if let Some(config_dir) = dirs::config_dir() {
      let xdg_path = config_dir.join("langcache").join("config.yaml");
      if xdg_path.exists() {
        return Some(xdg_path);
      }
    }

    None
  }

  fn load_from_path(path: &Path) -> Result<Self> {
    let contents = std::fs::read_to_string(path)
      .map_err(|e| eyre!("Failed to read config file {}: {}", path.display(), e))?;

    let config: Config = serde_yaml::from_str(&contents)
      .map_err(|e| eyre!("Failed to parse config file {}: {}", path.display(), e))?;

    Ok(config)
  }

  /// Time-to-live for one resource kind, honoring overrides.
  pub fn ttl(&self, kind: &str) -> Duration {
    let seconds = self
      .cache
      .ttl_overrides
      .get(kind)
      .copied()
      .unwrap_or(self.cache.ttl_seconds);
    Duration::seconds(seconds as i64)
  }

  /// Location of the cache database.
  pub fn db_path(&self) -> Result<PathBuf> {
    match &self.cache.dir {
      Some(dir) => Ok(dir.join("cache.db")),
      None => SqliteStore::default_path(),
    }
  }

  /// Cross-process watcher poll interval.
  pub fn sync_interval(&self) -> std::time::Duration {
    std::time::Duration::from_secs(self.cache.sync_interval_seconds)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_defaults() {
    let config = Config::default();
    assert_eq!(config.ttl("game-list"), Duration::seconds(300));
    assert_eq!(config.sync_interval(), std::time::Duration::from_secs(2));
    assert!(config.api.base_url.is_none());
  }

  #[test]
  fn test_ttl_overrides() {
    let config: Config =
      serde_yaml::from_str("cache:\n  ttl_seconds: 60\n  ttl_overrides:\n    navigation: 600\n")
        .unwrap();
    assert_eq!(config.ttl("navigation"), Duration::seconds(600));
    assert_eq!(config.ttl("blog"), Duration::seconds(60));
  }

  #[test]
  fn test_parse_full_config() {
    let config: Config = serde_yaml::from_str(
      "api:\n  base_url: https://play.example.com/\ncache:\n  sync_interval_seconds: 5\n",
    )
    .unwrap();
    assert_eq!(
      config.api.base_url.as_deref(),
      Some("https://play.example.com/")
    );
    assert_eq!(config.sync_interval(), std::time::Duration::from_secs(5));
  }
}
