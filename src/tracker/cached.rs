//! Tracker client with transparent response caching and rate limiting.
//!
//! Every read follows the same path: derive the cache key, try the cache,
//! and on a miss take a rate-limit token, fetch, store, decode. A cache hit
//! bypasses both the limiter and the network. Writes skip the cache and
//! invalidate every cached read under the mutated resource subtree.

use std::sync::Arc;
use std::time::Duration;

use color_eyre::Result;
use serde_json::{json, Value};
use tracing::debug;

use crate::accel::{cache_key, RateLimiter, ResponseCache};
use crate::config::Config;

use super::api_types::{
  decode, ApiFeatureResponse, ApiFeaturesResponse, ApiIterationsResponse, ApiReleasesResponse,
  ApiVotesResponse,
};
use super::client::TrackerClient;
use super::types::{Feature, FeatureSummary, Iteration, Release, Vote};

/// List endpoints ask for everything in one page.
const PER_PAGE: &str = "200";

// Field projections for list reads. The tracker returns only the named
// fields, so each projection must cover every key its decoder reads.
const RELEASE_FIELDS: &str = "id,name,release_date,released,progress";
const FEATURE_LIST_FIELDS: &str = "id,name,score,workflow_status,assignee,votes_count";
const ITERATION_FIELDS: &str = "id,name,start_date,end_date,state";

/// Tracker client the rest of the app talks to.
///
/// Wraps the raw [`TrackerClient`] and exposes a typed API; all reads are
/// served through the shared response cache.
#[derive(Clone)]
pub struct CachedTrackerClient {
  inner: TrackerClient,
  cache: Arc<ResponseCache>,
  limiter: RateLimiter,
  default_ttl: Duration,
}

impl CachedTrackerClient {
  pub fn new(config: &Config) -> Result<Self> {
    let inner = TrackerClient::new(config)?;

    Ok(Self {
      inner,
      cache: Arc::new(ResponseCache::new()),
      limiter: RateLimiter::new(config.rate_limit.burst, config.rate_limit.per_second),
      default_ttl: Duration::from_secs(config.cache.ttl_seconds),
    })
  }

  /// Cache-through GET: key from URL + params, hit bypasses limiter and
  /// network, miss acquires a token, fetches, and stores under the TTL.
  async fn get_cached(&self, path: &str, params: &[(&str, &str)]) -> Result<Value> {
    let key = cache_key(&self.inner.endpoint(path), params);

    if let Some(value) = self.cache.get(&key) {
      debug!(%key, "cache hit");
      return Ok(value);
    }

    debug!(%key, "cache miss");
    self.limiter.acquire().await;
    let value = self.inner.get_json(path, params).await?;
    self.cache.set(key, value.clone(), self.default_ttl);

    Ok(value)
  }

  /// List releases for a product.
  pub async fn releases(&self, product: &str) -> Result<Vec<Release>> {
    let path = format!("/products/{}/releases", product);
    let params = [("fields", RELEASE_FIELDS), ("per_page", PER_PAGE)];

    let body = self.get_cached(&path, &params).await?;
    let resp: ApiReleasesResponse = decode(body)?;
    Ok(resp.releases.into_iter().map(Release::from).collect())
  }

  /// List features scheduled in a release.
  pub async fn release_features(&self, release_id: u64) -> Result<Vec<FeatureSummary>> {
    let path = format!("/releases/{}/features", release_id);
    let params = [("fields", FEATURE_LIST_FIELDS), ("per_page", PER_PAGE)];

    let body = self.get_cached(&path, &params).await?;
    let resp: ApiFeaturesResponse = decode(body)?;
    Ok(resp.features.into_iter().map(|f| f.into_summary()).collect())
  }

  /// List iterations for a product.
  pub async fn iterations(&self, product: &str) -> Result<Vec<Iteration>> {
    let path = format!("/products/{}/iterations", product);
    let params = [("fields", ITERATION_FIELDS), ("per_page", PER_PAGE)];

    let body = self.get_cached(&path, &params).await?;
    let resp: ApiIterationsResponse = decode(body)?;
    Ok(resp.iterations.into_iter().map(Iteration::from).collect())
  }

  /// List features committed to an iteration.
  pub async fn iteration_features(&self, iteration_id: u64) -> Result<Vec<FeatureSummary>> {
    let path = format!("/iterations/{}/features", iteration_id);
    let params = [("fields", FEATURE_LIST_FIELDS), ("per_page", PER_PAGE)];

    let body = self.get_cached(&path, &params).await?;
    let resp: ApiFeaturesResponse = decode(body)?;
    Ok(resp.features.into_iter().map(|f| f.into_summary()).collect())
  }

  /// Get full details for a single feature.
  pub async fn feature(&self, id: u64) -> Result<Feature> {
    let path = format!("/features/{}", id);

    let body = self.get_cached(&path, &[]).await?;
    let resp: ApiFeatureResponse = decode(body)?;
    Ok(resp.feature.into_full())
  }

  /// List votes cast on a feature.
  pub async fn feature_votes(&self, feature_id: u64) -> Result<Vec<Vote>> {
    let path = format!("/features/{}/votes", feature_id);

    let body = self.get_cached(&path, &[]).await?;
    let resp: ApiVotesResponse = decode(body)?;
    Ok(resp.votes.into_iter().map(Vote::from).collect())
  }

  /// Update a feature's score, then evict every cached feature read.
  ///
  /// The score shows up in release lists, iteration lists, and the feature
  /// detail; all their keys contain `/features`, so one coarse sweep covers
  /// them without tracking per-key dependencies.
  pub async fn update_feature_score(&self, id: u64, score: i64) -> Result<Feature> {
    let path = format!("/features/{}", id);
    let body = json!({ "feature": { "score": score } });

    self.limiter.acquire().await;
    let response = self.inner.put_json(&path, body).await?;
    let resp: ApiFeatureResponse = decode(response)?;

    let removed = self.cache.invalidate("/features");
    debug!(feature = id, score, removed, "updated score, evicted cached feature reads");

    Ok(resp.feature.into_full())
  }

  /// Drop every cached response. Backs the `:refresh` command.
  pub fn clear_cache(&self) {
    self.cache.clear();
    debug!("response cache cleared");
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::tracker::api_types::{ApiIteration, ApiRelease};
  use crate::tracker::types::IterationState;
  use serde_json::json;
  use std::collections::BTreeSet;

  fn keys(value: &Value) -> BTreeSet<&str> {
    value
      .as_object()
      .unwrap()
      .keys()
      .map(String::as_str)
      .collect()
  }

  #[test]
  fn test_iteration_projection_covers_the_decoder() {
    let sample = json!({
      "id": 12,
      "name": "Sprint 12",
      "start_date": "2026-08-10",
      "end_date": "2026-08-24",
      "state": "active"
    });

    let projected: BTreeSet<&str> = ITERATION_FIELDS.split(',').collect();
    assert_eq!(projected, keys(&sample));

    let iteration = Iteration::from(serde_json::from_value::<ApiIteration>(sample).unwrap());
    assert_eq!(iteration.name, "Sprint 12");
    assert_eq!(iteration.start_date.as_deref(), Some("2026-08-10"));
    assert_eq!(iteration.state, IterationState::Active);
  }

  #[test]
  fn test_release_projection_covers_the_decoder() {
    let sample = json!({
      "id": 3,
      "name": "1.0",
      "release_date": "2026-09-01",
      "released": false,
      "progress": 0.4
    });

    let projected: BTreeSet<&str> = RELEASE_FIELDS.split(',').collect();
    assert_eq!(projected, keys(&sample));

    let release = Release::from(serde_json::from_value::<ApiRelease>(sample).unwrap());
    assert_eq!(release.name, "1.0");
    assert_eq!(release.progress, Some(0.4));
  }
}
