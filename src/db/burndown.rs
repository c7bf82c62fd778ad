use color_eyre::{eyre::eyre, Result};
use rusqlite::params;

use super::Database;

/// Remaining work captured for one iteration on one day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BurndownSnapshot {
  pub iteration_id: u64,
  pub day: String,
  pub remaining_points: i64,
  pub total_points: i64,
}

impl Database {
  /// Record today's remaining work for an iteration. Re-capturing the same
  /// day overwrites the earlier snapshot.
  pub fn record_burndown(&self, snapshot: &BurndownSnapshot) -> Result<()> {
    let conn = self.lock()?;
    conn
      .execute(
        "INSERT OR REPLACE INTO burndown_snapshots (iteration_id, day, remaining_points, total_points)
         VALUES (?, ?, ?, ?)",
        params![
          snapshot.iteration_id,
          snapshot.day,
          snapshot.remaining_points,
          snapshot.total_points
        ],
      )
      .map_err(|e| eyre!("Failed to record burndown snapshot: {}", e))?;
    Ok(())
  }

  /// All snapshots for an iteration, oldest day first.
  pub fn burndown_for_iteration(&self, iteration_id: u64) -> Result<Vec<BurndownSnapshot>> {
    let conn = self.lock()?;
    let mut stmt = conn
      .prepare(
        "SELECT iteration_id, day, remaining_points, total_points
         FROM burndown_snapshots WHERE iteration_id = ? ORDER BY day",
      )
      .map_err(|e| eyre!("Failed to prepare query: {}", e))?;

    let snapshots = stmt
      .query_map(params![iteration_id], |row| {
        Ok(BurndownSnapshot {
          iteration_id: row.get(0)?,
          day: row.get(1)?,
          remaining_points: row.get(2)?,
          total_points: row.get(3)?,
        })
      })
      .map_err(|e| eyre!("Failed to query burndown snapshots: {}", e))?
      .collect::<rusqlite::Result<Vec<_>>>()
      .map_err(|e| eyre!("Failed to read burndown row: {}", e))?;

    Ok(snapshots)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn snapshot(iteration_id: u64, day: &str, remaining: i64) -> BurndownSnapshot {
    BurndownSnapshot {
      iteration_id,
      day: day.to_string(),
      remaining_points: remaining,
      total_points: 40,
    }
  }

  #[test]
  fn test_snapshots_come_back_in_day_order() {
    let db = Database::open_in_memory().unwrap();
    db.record_burndown(&snapshot(7, "2025-03-12", 30)).unwrap();
    db.record_burndown(&snapshot(7, "2025-03-10", 40)).unwrap();
    db.record_burndown(&snapshot(7, "2025-03-11", 34)).unwrap();

    let days: Vec<String> = db
      .burndown_for_iteration(7)
      .unwrap()
      .into_iter()
      .map(|s| s.day)
      .collect();
    assert_eq!(days, vec!["2025-03-10", "2025-03-11", "2025-03-12"]);
  }

  #[test]
  fn test_recapture_same_day_overwrites() {
    let db = Database::open_in_memory().unwrap();
    db.record_burndown(&snapshot(7, "2025-03-10", 40)).unwrap();
    db.record_burndown(&snapshot(7, "2025-03-10", 36)).unwrap();

    let snapshots = db.burndown_for_iteration(7).unwrap();
    assert_eq!(snapshots.len(), 1);
    assert_eq!(snapshots[0].remaining_points, 36);
  }

  #[test]
  fn test_iterations_are_isolated() {
    let db = Database::open_in_memory().unwrap();
    db.record_burndown(&snapshot(7, "2025-03-10", 40)).unwrap();
    db.record_burndown(&snapshot(8, "2025-03-10", 25)).unwrap();

    assert_eq!(db.burndown_for_iteration(7).unwrap().len(), 1);
    assert_eq!(db.burndown_for_iteration(8).unwrap()[0].remaining_points, 25);
  }
}
