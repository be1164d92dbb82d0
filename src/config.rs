use color_eyre::{eyre::eyre, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

pub const DEFAULT_BUCKET: &str = "files_bucket";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
  #[serde(default)]
  pub backend: BackendConfig,
  #[serde(default)]
  pub session: SessionConfig,
  #[serde(default)]
  pub storage: StorageConfig,
  #[serde(default)]
  pub cache: CacheConfig,
  /// Custom title for header (defaults to the backend host if not set)
  pub title: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BackendConfig {
  /// Project URL; may be left out when provided through the environment
  pub url: Option<String>,
  #[serde(default = "default_request_timeout")]
  pub request_timeout_secs: u64,
}

impl Default for BackendConfig {
  fn default() -> Self {
    Self {
      url: None,
      request_timeout_secs: default_request_timeout(),
    }
  }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SessionConfig {
  /// Signed-in user id
  pub user_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
  #[serde(default = "default_bucket")]
  pub bucket: String,
}

impl Default for StorageConfig {
  fn default() -> Self {
    Self {
      bucket: default_bucket(),
    }
  }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
  #[serde(default = "default_stale_time")]
  pub stale_time_secs: u64,
}

impl Default for CacheConfig {
  fn default() -> Self {
    Self {
      stale_time_secs: default_stale_time(),
    }
  }
}

fn default_request_timeout() -> u64 {
  30
}

fn default_bucket() -> String {
  DEFAULT_BUCKET.to_string()
}

fn default_stale_time() -> u64 {
  300
}

impl Config {
  /// Load configuration from file.
  ///
  /// Search order:
  /// 1. Explicit path if provided
  /// 2. ./deskbase.yaml (current directory)
  /// 3. $XDG_CONFIG_HOME/deskbase/config.yaml
  ///
  /// With no file anywhere the defaults are used and the backend comes from
  /// the environment.
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
      None => {
        tracing::info!("no config file found, using defaults");
        Ok(Self::default())
      }
    }
  }

  fn find_config_file() -> Option<PathBuf> {
    let local = PathBuf::from("deskbase.yaml");
    if local.exists() {
      return Some(local);
    }

    if let Some(config_dir) = dirs::config_dir() {
      let xdg_path = config_dir.join("deskbase").join("config.yaml");
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

    tracing::info!(path = %path.display(), "loaded config");
    Ok(config)
  }

  /// Project URL from the config file, else from the environment.
  pub fn project_url(&self) -> Result<Url> {
    resolve_project_url(self.backend.url.as_deref(), |name| std::env::var(name).ok())
  }

  /// Get the API key from environment variables.
  ///
  /// Checks DESKBASE_API_KEY first, then SUPABASE_API_KEY as fallback.
  pub fn get_api_key() -> Result<String> {
    resolve_api_key(|name| std::env::var(name).ok())
  }

  pub fn request_timeout(&self) -> Duration {
    Duration::from_secs(self.backend.request_timeout_secs)
  }

  pub fn stale_time(&self) -> Duration {
    Duration::from_secs(self.cache.stale_time_secs)
  }
}

fn first_set(lookup: impl Fn(&str) -> Option<String>, names: &[&str]) -> Option<String> {
  names
    .iter()
    .filter_map(|name| lookup(name))
    .find(|value| !value.trim().is_empty())
}

fn resolve_project_url(
  configured: Option<&str>,
  lookup: impl Fn(&str) -> Option<String>,
) -> Result<Url> {
  let raw = configured
    .map(str::to_string)
    .or_else(|| first_set(lookup, &["DESKBASE_PROJECT_URL", "SUPABASE_PROJECT_URL"]))
    .ok_or_else(|| {
      eyre!(
        "Project URL not found. Set backend.url in the config file or the \
         DESKBASE_PROJECT_URL environment variable."
      )
    })?;

  Url::parse(raw.trim()).map_err(|e| eyre!("Invalid project URL {}: {}", raw, e))
}

fn resolve_api_key(lookup: impl Fn(&str) -> Option<String>) -> Result<String> {
  first_set(lookup, &["DESKBASE_API_KEY", "SUPABASE_API_KEY"]).ok_or_else(|| {
    eyre!("API key not found. Set DESKBASE_API_KEY or SUPABASE_API_KEY environment variable.")
  })
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::collections::HashMap;
  use std::io::Write;

  fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let vars: HashMap<String, String> = pairs
      .iter()
      .map(|(k, v)| (k.to_string(), v.to_string()))
      .collect();
    move |name| vars.get(name).cloned()
  }

  #[test]
  fn test_load_full_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
      file,
      "backend:\n  url: https://xyz.supabase.co\n  request_timeout_secs: 5\n\
       session:\n  user_id: u1\nstorage:\n  bucket: avatars\ncache:\n  stale_time_secs: 60\n\
       title: Team board"
    )
    .unwrap();

    let config = Config::load(Some(file.path())).unwrap();
    assert_eq!(
      config.backend.url.as_deref(),
      Some("https://xyz.supabase.co")
    );
    assert_eq!(config.request_timeout(), Duration::from_secs(5));
    assert_eq!(config.session.user_id.as_deref(), Some("u1"));
    assert_eq!(config.storage.bucket, "avatars");
    assert_eq!(config.stale_time(), Duration::from_secs(60));
    assert_eq!(config.title.as_deref(), Some("Team board"));
  }

  #[test]
  fn test_defaults_for_missing_sections() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "backend:\n  url: https://xyz.supabase.co").unwrap();

    let config = Config::load(Some(file.path())).unwrap();
    assert_eq!(config.request_timeout(), Duration::from_secs(30));
    assert_eq!(config.storage.bucket, DEFAULT_BUCKET);
    assert_eq!(config.stale_time(), Duration::from_secs(300));
    assert!(config.session.user_id.is_none());
  }

  #[test]
  fn test_explicit_path_must_exist() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope.yaml");
    let err = Config::load(Some(&missing)).unwrap_err();
    assert!(err.to_string().starts_with("Config file not found"));
  }

  #[test]
  fn test_invalid_yaml_is_reported() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "backend: [unclosed").unwrap();
    let err = Config::load(Some(file.path())).unwrap_err();
    assert!(err.to_string().starts_with("Failed to parse config file"));
  }

  #[test]
  fn test_project_url_prefers_config() {
    let lookup = env(&[("DESKBASE_PROJECT_URL", "https://env.supabase.co")]);
    let url = resolve_project_url(Some("https://file.supabase.co"), lookup).unwrap();
    assert_eq!(url.host_str(), Some("file.supabase.co"));
  }

  #[test]
  fn test_project_url_env_fallbacks() {
    let url = resolve_project_url(
      None,
      env(&[("SUPABASE_PROJECT_URL", "https://legacy.supabase.co")]),
    )
    .unwrap();
    assert_eq!(url.host_str(), Some("legacy.supabase.co"));

    let url = resolve_project_url(
      None,
      env(&[
        ("DESKBASE_PROJECT_URL", "https://new.supabase.co"),
        ("SUPABASE_PROJECT_URL", "https://legacy.supabase.co"),
      ]),
    )
    .unwrap();
    assert_eq!(url.host_str(), Some("new.supabase.co"));

    assert!(resolve_project_url(None, env(&[])).is_err());
  }

  #[test]
  fn test_invalid_project_url() {
    let err = resolve_project_url(Some("not a url"), env(&[])).unwrap_err();
    assert!(err.to_string().starts_with("Invalid project URL"));
  }

  #[test]
  fn test_api_key_fallbacks() {
    assert_eq!(
      resolve_api_key(env(&[("SUPABASE_API_KEY", "anon")])).unwrap(),
      "anon"
    );
    let both = env(&[("DESKBASE_API_KEY", "k1"), ("SUPABASE_API_KEY", "k2")]);
    assert_eq!(resolve_api_key(both).unwrap(), "k1");
    // Blank values count as unset
    let blank = env(&[("DESKBASE_API_KEY", " "), ("SUPABASE_API_KEY", "k2")]);
    assert_eq!(resolve_api_key(blank).unwrap(), "k2");
    assert!(resolve_api_key(env(&[])).is_err());
  }
}
