/// Release summary for list views
#[derive(Debug, Clone)]
pub struct Release {
  pub id: u64,
  pub name: String,
  pub release_date: Option<String>,
  pub released: bool,
  /// Fraction of features shipped, 0.0..=1.0, when the tracker reports it
  pub progress: Option<f64>,
}

/// Feature summary for list views
#[derive(Debug, Clone)]
pub struct FeatureSummary {
  pub id: u64,
  pub name: String,
  pub status: String,
  pub score: i64,
  pub assignee: Option<String>,
  pub votes_count: u64,
}

impl FeatureSummary {
  /// Whether this feature counts as finished when computing remaining work.
  /// Status names are team-defined, so this matches on keywords.
  pub fn is_done(&self) -> bool {
    // "shipped", not "ship": "Ready to ship" is still open work
    let status = self.status.to_lowercase();
    status.contains("shipped")
      || status.contains("done")
      || status.contains("complete")
      || status.contains("closed")
  }
}

/// Full feature details
#[derive(Debug, Clone)]
pub struct Feature {
  pub id: u64,
  pub name: String,
  pub description: Option<String>,
  pub status: String,
  pub score: i64,
  pub assignee: Option<String>,
  pub votes_count: u64,
  pub tags: Vec<String>,
  pub created_at: String,
  pub updated_at: String,
}

/// Iteration (sprint) summary
#[derive(Debug, Clone)]
pub struct Iteration {
  pub id: u64,
  pub name: String,
  pub start_date: Option<String>,
  pub end_date: Option<String>,
  pub state: IterationState,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IterationState {
  Planning,
  Active,
  Closed,
}

impl IterationState {
  pub fn label(&self) -> &'static str {
    match self {
      Self::Planning => "planning",
      Self::Active => "active",
      Self::Closed => "closed",
    }
  }
}

/// A single endorsement on a feature
#[derive(Debug, Clone)]
pub struct Vote {
  pub voter: Option<String>,
  pub cast_at: String,
}

#[cfg(test)]
mod tests {
  use super::*;

  fn feature_with_status(status: &str) -> FeatureSummary {
    FeatureSummary {
      id: 1,
      name: "Feature".to_string(),
      status: status.to_string(),
      score: 3,
      assignee: None,
      votes_count: 0,
    }
  }

  #[test]
  fn test_is_done_matches_team_specific_names() {
    assert!(feature_with_status("Shipped").is_done());
    assert!(feature_with_status("Done done").is_done());
    assert!(feature_with_status("Completed").is_done());
    assert!(!feature_with_status("In development").is_done());
    assert!(!feature_with_status("Ready to ship").is_done());
  }
}
