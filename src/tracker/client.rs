use std::time::Duration;

use color_eyre::{eyre::eyre, Result};
use serde_json::Value;

use crate::config::Config;

/// Raw tracker API transport. Auth and JSON handling live here;
/// caching and throttling live in [`super::CachedTrackerClient`].
#[derive(Clone)]
pub struct TrackerClient {
  http: reqwest::Client,
  base_url: String,
  token: String,
}

impl TrackerClient {
  pub fn new(config: &Config) -> Result<Self> {
    let token = Config::get_api_token()?;

    let http = reqwest::Client::builder()
      .timeout(Duration::from_secs(30))
      .build()
      .map_err(|e| eyre!("Failed to create HTTP client: {}", e))?;

    Ok(Self {
      http,
      base_url: config.tracker.url.trim_end_matches('/').to_string(),
      token,
    })
  }

  /// Full URL for an API path like `/releases/123/features`.
  ///
  /// Plain concatenation, not `Url::join`: the base URL usually carries a
  /// path prefix (`/api/v1`) that join would discard.
  pub fn endpoint(&self, path: &str) -> String {
    format!("{}{}", self.base_url, path)
  }

  /// GET a tracker endpoint and return the raw JSON body.
  pub async fn get_json(&self, path: &str, params: &[(&str, &str)]) -> Result<Value> {
    let response = self
      .http
      .get(self.endpoint(path))
      .query(params)
      .header("Authorization", format!("Bearer {}", self.token))
      .send()
      .await
      .map_err(|e| eyre!("Failed to call tracker API {}: {}", path, e))?;

    Self::read_json(path, response).await
  }

  /// PUT a JSON body to a tracker endpoint and return the raw JSON response.
  pub async fn put_json(&self, path: &str, body: Value) -> Result<Value> {
    let response = self
      .http
      .put(self.endpoint(path))
      .json(&body)
      .header("Authorization", format!("Bearer {}", self.token))
      .send()
      .await
      .map_err(|e| eyre!("Failed to call tracker API {}: {}", path, e))?;

    Self::read_json(path, response).await
  }

  async fn read_json(path: &str, response: reqwest::Response) -> Result<Value> {
    if !response.status().is_success() {
      let status = response.status();
      let error_text = response.text().await.unwrap_or_default();
      return Err(eyre!("Tracker API {} returned {}: {}", path, status, error_text));
    }

    response
      .json()
      .await
      .map_err(|e| eyre!("Failed to parse tracker API {} response: {}", path, e))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn test_config(url: &str) -> Config {
    Config::from_yaml_str(&format!("tracker:\n  url: {}\n", url)).unwrap()
  }

  #[test]
  fn test_endpoint_preserves_base_path_prefix() {
    std::env::set_var("SM9S_TRACKER_TOKEN", "t");
    let client = TrackerClient::new(&test_config("https://x/api/v1")).unwrap();
    assert_eq!(
      client.endpoint("/releases/123/features"),
      "https://x/api/v1/releases/123/features"
    );
  }

  #[test]
  fn test_endpoint_tolerates_trailing_slash_in_config() {
    std::env::set_var("SM9S_TRACKER_TOKEN", "t");
    let client = TrackerClient::new(&test_config("https://x/api/v1/")).unwrap();
    assert_eq!(client.endpoint("/releases"), "https://x/api/v1/releases");
  }
}
