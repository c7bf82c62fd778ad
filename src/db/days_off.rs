use color_eyre::{eyre::eyre, Result};
use rusqlite::params;

use super::Database;

/// One member's scheduled day off.
#[derive(Debug, Clone)]
pub struct DayOff {
  pub id: i64,
  pub member: String,
  pub day: String,
  pub reason: String,
}

impl Database {
  /// Schedule a day off, replacing any prior entry for the same member/day.
  pub fn add_day_off(&self, member: &str, day: &str, reason: &str) -> Result<()> {
    let conn = self.lock()?;
    conn
      .execute(
        "INSERT OR REPLACE INTO days_off (member, day, reason) VALUES (?, ?, ?)",
        params![member, day, reason],
      )
      .map_err(|e| eyre!("Failed to add day off: {}", e))?;
    Ok(())
  }

  /// Days off on or after `from_day`, soonest first.
  pub fn upcoming_days_off(&self, from_day: &str) -> Result<Vec<DayOff>> {
    let conn = self.lock()?;
    let mut stmt = conn
      .prepare(
        "SELECT id, member, day, reason FROM days_off
         WHERE day >= ? ORDER BY day, member",
      )
      .map_err(|e| eyre!("Failed to prepare query: {}", e))?;

    let entries = stmt
      .query_map(params![from_day], |row| {
        Ok(DayOff {
          id: row.get(0)?,
          member: row.get(1)?,
          day: row.get(2)?,
          reason: row.get(3)?,
        })
      })
      .map_err(|e| eyre!("Failed to query days off: {}", e))?
      .collect::<rusqlite::Result<Vec<_>>>()
      .map_err(|e| eyre!("Failed to read day off row: {}", e))?;

    Ok(entries)
  }

  pub fn remove_day_off(&self, id: i64) -> Result<()> {
    let conn = self.lock()?;
    conn
      .execute("DELETE FROM days_off WHERE id = ?", params![id])
      .map_err(|e| eyre!("Failed to remove day off: {}", e))?;
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_upcoming_excludes_past_days() {
    let db = Database::open_in_memory().unwrap();
    db.add_day_off("rena", "2025-03-01", "dentist").unwrap();
    db.add_day_off("avi", "2025-03-20", "vacation").unwrap();
    db.add_day_off("rena", "2025-03-15", "").unwrap();

    let upcoming = db.upcoming_days_off("2025-03-10").unwrap();
    let days: Vec<&str> = upcoming.iter().map(|d| d.day.as_str()).collect();
    assert_eq!(days, vec!["2025-03-15", "2025-03-20"]);
  }

  #[test]
  fn test_same_member_and_day_is_replaced() {
    let db = Database::open_in_memory().unwrap();
    db.add_day_off("rena", "2025-03-15", "dentist").unwrap();
    db.add_day_off("rena", "2025-03-15", "moved to PTO").unwrap();

    let upcoming = db.upcoming_days_off("2025-01-01").unwrap();
    assert_eq!(upcoming.len(), 1);
    assert_eq!(upcoming[0].reason, "moved to PTO");
  }

  #[test]
  fn test_remove_day_off() {
    let db = Database::open_in_memory().unwrap();
    db.add_day_off("rena", "2025-03-15", "").unwrap();
    let id = db.upcoming_days_off("2025-01-01").unwrap()[0].id;

    db.remove_day_off(id).unwrap();
    assert!(db.upcoming_days_off("2025-01-01").unwrap().is_empty());
  }
}
