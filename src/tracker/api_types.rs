//! Serde-deserializable types matching tracker API responses.
//!
//! These types are separate from domain types to allow clean deserialization
//! while keeping domain types focused on application needs. The tracker wraps
//! every response in a named envelope (`{"releases": [...]}`), so each
//! endpoint gets its own envelope struct here.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use color_eyre::{eyre::eyre, Result};

/// Decode a cached or freshly fetched response body into a typed envelope.
pub fn decode<T: DeserializeOwned>(value: Value) -> Result<T> {
  serde_json::from_value(value).map_err(|e| eyre!("Failed to decode tracker response: {}", e))
}

// ============================================================================
// Common nested field types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ApiWorkflowStatus {
  pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct ApiUser {
  pub name: String,
}

// ============================================================================
// Releases endpoint
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ApiRelease {
  pub id: u64,
  pub name: String,
  pub release_date: Option<String>,
  #[serde(default)]
  pub released: bool,
  pub progress: Option<f64>,
}

// Envelopes ignore the tracker's pagination block: list reads ask for one
// oversized page, so there is never a second one to walk.
#[derive(Debug, Deserialize)]
pub struct ApiReleasesResponse {
  #[serde(default)]
  pub releases: Vec<ApiRelease>,
}

// ============================================================================
// Features endpoints - used by release and iteration feature lists
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ApiFeature {
  pub id: u64,
  pub name: String,
  #[serde(default)]
  pub score: i64,
  pub workflow_status: Option<ApiWorkflowStatus>,
  pub assignee: Option<ApiUser>,
  #[serde(default)]
  pub votes_count: u64,
  pub description: Option<String>,
  #[serde(default)]
  pub tags: Vec<String>,
  #[serde(default)]
  pub created_at: String,
  #[serde(default)]
  pub updated_at: String,
}

#[derive(Debug, Deserialize)]
pub struct ApiFeaturesResponse {
  #[serde(default)]
  pub features: Vec<ApiFeature>,
}

#[derive(Debug, Deserialize)]
pub struct ApiFeatureResponse {
  pub feature: ApiFeature,
}

// ============================================================================
// Iterations endpoint
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ApiIteration {
  pub id: u64,
  pub name: String,
  pub start_date: Option<String>,
  pub end_date: Option<String>,
  #[serde(default)]
  pub state: String,
}

#[derive(Debug, Deserialize)]
pub struct ApiIterationsResponse {
  #[serde(default)]
  pub iterations: Vec<ApiIteration>,
}

// ============================================================================
// Votes endpoint
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ApiVote {
  pub voter: Option<ApiUser>,
  #[serde(default)]
  pub created_at: String,
}

#[derive(Debug, Deserialize)]
pub struct ApiVotesResponse {
  #[serde(default)]
  pub votes: Vec<ApiVote>,
}

// ============================================================================
// Conversions to domain types
// ============================================================================

use super::types::{Feature, FeatureSummary, Iteration, IterationState, Release, Vote};

impl From<ApiRelease> for Release {
  fn from(r: ApiRelease) -> Self {
    Release {
      id: r.id,
      name: r.name,
      release_date: r.release_date,
      released: r.released,
      progress: r.progress,
    }
  }
}

impl ApiFeature {
  pub fn into_summary(self) -> FeatureSummary {
    FeatureSummary {
      id: self.id,
      name: self.name,
      status: self.workflow_status.map(|s| s.name).unwrap_or_default(),
      score: self.score,
      assignee: self.assignee.map(|u| u.name),
      votes_count: self.votes_count,
    }
  }

  pub fn into_full(self) -> Feature {
    Feature {
      id: self.id,
      name: self.name,
      description: self.description,
      status: self.workflow_status.map(|s| s.name).unwrap_or_default(),
      score: self.score,
      assignee: self.assignee.map(|u| u.name),
      votes_count: self.votes_count,
      tags: self.tags,
      created_at: self.created_at,
      updated_at: self.updated_at,
    }
  }
}

impl From<ApiIteration> for Iteration {
  fn from(i: ApiIteration) -> Self {
    let state = match i.state.as_str() {
      "active" | "started" => IterationState::Active,
      "closed" | "done" => IterationState::Closed,
      _ => IterationState::Planning,
    };
    Iteration {
      id: i.id,
      name: i.name,
      start_date: i.start_date,
      end_date: i.end_date,
      state,
    }
  }
}

impl From<ApiVote> for Vote {
  fn from(v: ApiVote) -> Self {
    Vote {
      voter: v.voter.map(|u| u.name),
      cast_at: v.created_at,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  #[test]
  fn test_decode_features_envelope() {
    let body = json!({
      "features": [
        {
          "id": 42,
          "name": "Dark mode",
          "score": 8,
          "workflow_status": {"name": "In development"},
          "assignee": {"name": "Rena"},
          "votes_count": 3
        },
        {
          "id": 43,
          "name": "Export to CSV"
        }
      ],
      "pagination": {"total_records": 2, "current_page": 1, "total_pages": 1}
    });

    let resp: ApiFeaturesResponse = decode(body).unwrap();
    assert_eq!(resp.features.len(), 2);

    let first = resp.features.into_iter().next().unwrap().into_summary();
    assert_eq!(first.id, 42);
    assert_eq!(first.status, "In development");
    assert_eq!(first.assignee.as_deref(), Some("Rena"));
    assert_eq!(first.votes_count, 3);
  }

  #[test]
  fn test_decode_feature_with_missing_optional_fields() {
    let body = json!({"feature": {"id": 7, "name": "Bare"}});
    let resp: ApiFeatureResponse = decode(body).unwrap();
    let feature = resp.feature.into_full();
    assert_eq!(feature.name, "Bare");
    assert_eq!(feature.score, 0);
    assert_eq!(feature.status, "");
    assert!(feature.assignee.is_none());
    assert!(feature.tags.is_empty());
  }

  #[test]
  fn test_iteration_state_mapping() {
    let body = json!({
      "iterations": [
        {"id": 1, "name": "Sprint 1", "state": "closed"},
        {"id": 2, "name": "Sprint 2", "state": "started"},
        {"id": 3, "name": "Sprint 3", "state": ""}
      ]
    });
    let resp: ApiIterationsResponse = decode(body).unwrap();
    let states: Vec<IterationState> = resp
      .iterations
      .into_iter()
      .map(|i| Iteration::from(i).state)
      .collect();
    assert_eq!(
      states,
      vec![
        IterationState::Closed,
        IterationState::Active,
        IterationState::Planning
      ]
    );
  }
}
