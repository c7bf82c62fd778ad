use color_eyre::{eyre::eyre, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use url::Url;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
  pub tracker: TrackerConfig,
  pub default_product: Option<String>,
  /// Custom title for header (defaults to tracker domain if not set)
  pub title: Option<String>,
  #[serde(default)]
  pub cache: CacheConfig,
  #[serde(default)]
  pub rate_limit: RateLimitConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TrackerConfig {
  /// Base URL of the tracker API, including any path prefix
  /// (e.g. `https://tracker.example.com/api/v1`)
  pub url: String,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct CacheConfig {
  /// Freshness window for cached API reads, in seconds. Zero disables caching.
  #[serde(default = "default_ttl_seconds")]
  pub ttl_seconds: u64,
}

impl Default for CacheConfig {
  fn default() -> Self {
    Self {
      ttl_seconds: default_ttl_seconds(),
    }
  }
}

fn default_ttl_seconds() -> u64 {
  300
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct RateLimitConfig {
  /// Maximum burst of concurrent API calls
  #[serde(default = "default_burst")]
  pub burst: u32,
  /// Steady-state API calls per second once the burst is spent
  #[serde(default = "default_per_second")]
  pub per_second: f64,
}

impl Default for RateLimitConfig {
  fn default() -> Self {
    Self {
      burst: default_burst(),
      per_second: default_per_second(),
    }
  }
}

fn default_burst() -> u32 {
  20
}

fn default_per_second() -> f64 {
  10.0
}

impl Config {
  /// Load configuration from file.
  ///
  /// Search order:
  /// 1. Explicit path if provided
  /// 2. ./sm9s.yaml (current directory)
  /// 3. $XDG_CONFIG_HOME/sm9s/config.yaml
  /// 4. ~/.config/sm9s/config.yaml
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
        "No configuration file found. Create one at ~/.config/sm9s/config.yaml\n\
                 See config.example.yaml for the format."
      )),
    }
  }

  fn find_config_file() -> Option<PathBuf> {
    // Check current directory
    let local = PathBuf::from("sm9s.yaml");
    if local.exists() {
      return Some(local);
    }

    // Check XDG config directory
    if let Some(config_dir) = dirs::config_dir() {
      let xdg_path = config_dir.join("sm9s").join("config.yaml");
      if xdg_path.exists() {
        return Some(xdg_path);
      }
    }

    None
  }

  fn load_from_path(path: &Path) -> Result<Self> {
    let contents = std::fs::read_to_string(path)
      .map_err(|e| eyre!("Failed to read config file {}: {}", path.display(), e))?;

    Self::from_yaml_str(&contents)
      .map_err(|e| eyre!("Invalid config file {}: {}", path.display(), e))
  }

  /// Parse and validate a YAML config document.
  pub fn from_yaml_str(contents: &str) -> Result<Self> {
    let config: Config =
      serde_yaml::from_str(contents).map_err(|e| eyre!("Failed to parse config: {}", e))?;
    config.validate()?;
    Ok(config)
  }

  /// Reject settings the rest of the app assumes are sane.
  ///
  /// The rate limiter and cache take these values as given, so bad ones
  /// must die here at startup rather than misbehave later.
  fn validate(&self) -> Result<()> {
    let url = Url::parse(&self.tracker.url)
      .map_err(|e| eyre!("Invalid tracker.url '{}': {}", self.tracker.url, e))?;
    if !matches!(url.scheme(), "http" | "https") {
      return Err(eyre!(
        "tracker.url must be an http(s) URL, got scheme '{}'",
        url.scheme()
      ));
    }

    if self.rate_limit.burst < 1 {
      return Err(eyre!("rate_limit.burst must be at least 1"));
    }
    if !(self.rate_limit.per_second > 0.0) || !self.rate_limit.per_second.is_finite() {
      return Err(eyre!(
        "rate_limit.per_second must be a positive number, got {}",
        self.rate_limit.per_second
      ));
    }

    Ok(())
  }

  /// Get the tracker API token from environment variables.
  ///
  /// Checks SM9S_TRACKER_TOKEN first, then TRACKER_API_TOKEN as fallback.
  pub fn get_api_token() -> Result<String> {
    std::env::var("SM9S_TRACKER_TOKEN")
      .or_else(|_| std::env::var("TRACKER_API_TOKEN"))
      .map_err(|_| {
        eyre!(
          "Tracker API token not found. Set SM9S_TRACKER_TOKEN or TRACKER_API_TOKEN environment variable."
        )
      })
  }

  /// Host shown in the header when no custom title is configured.
  pub fn tracker_domain(&self) -> Option<String> {
    Url::parse(&self.tracker.url)
      .ok()
      .and_then(|u| u.host_str().map(String::from))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_minimal_config_gets_defaults() {
    let config = Config::from_yaml_str("tracker:\n  url: https://x/api/v1\n").unwrap();
    assert_eq!(config.cache.ttl_seconds, 300);
    assert_eq!(config.rate_limit.burst, 20);
    assert_eq!(config.rate_limit.per_second, 10.0);
    assert!(config.default_product.is_none());
  }

  #[test]
  fn test_zero_ttl_is_allowed() {
    let yaml = "tracker:\n  url: https://x/api/v1\ncache:\n  ttl_seconds: 0\n";
    let config = Config::from_yaml_str(yaml).unwrap();
    assert_eq!(config.cache.ttl_seconds, 0);
  }

  #[test]
  fn test_non_positive_refill_rate_is_rejected() {
    let yaml = "tracker:\n  url: https://x/api/v1\nrate_limit:\n  per_second: 0\n";
    assert!(Config::from_yaml_str(yaml).is_err());

    let yaml = "tracker:\n  url: https://x/api/v1\nrate_limit:\n  per_second: -2.5\n";
    assert!(Config::from_yaml_str(yaml).is_err());
  }

  #[test]
  fn test_zero_burst_is_rejected() {
    let yaml = "tracker:\n  url: https://x/api/v1\nrate_limit:\n  burst: 0\n";
    assert!(Config::from_yaml_str(yaml).is_err());
  }

  #[test]
  fn test_malformed_url_is_rejected() {
    assert!(Config::from_yaml_str("tracker:\n  url: not a url\n").is_err());
  }

  #[test]
  fn test_non_http_scheme_is_rejected() {
    assert!(Config::from_yaml_str("tracker:\n  url: ftp://x/api/v1\n").is_err());
    // A typo'd scheme still parses as a valid URL
    assert!(Config::from_yaml_str("tracker:\n  url: htps://x/api/v1\n").is_err());
  }

  #[test]
  fn test_tracker_domain_extraction() {
    let config =
      Config::from_yaml_str("tracker:\n  url: https://tracker.example.com/api/v1\n").unwrap();
    assert_eq!(config.tracker_domain().as_deref(), Some("tracker.example.com"));
  }
}
