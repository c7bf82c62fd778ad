use color_eyre::{eyre::eyre, Result};
use rusqlite::params;

use super::Database;

/// A standup entry for one member on one day.
#[derive(Debug, Clone)]
pub struct StandupNote {
  pub id: i64,
  pub day: String,
  pub member: String,
  pub yesterday: String,
  pub today: String,
  pub blockers: String,
}

impl Database {
  /// Save a standup note, replacing any prior note for the same member/day.
  pub fn save_standup_note(
    &self,
    day: &str,
    member: &str,
    yesterday: &str,
    today: &str,
    blockers: &str,
  ) -> Result<()> {
    let conn = self.lock()?;
    conn
      .execute(
        "INSERT OR REPLACE INTO standup_notes (day, member, yesterday, today, blockers)
         VALUES (?, ?, ?, ?, ?)",
        params![day, member, yesterday, today, blockers],
      )
      .map_err(|e| eyre!("Failed to save standup note: {}", e))?;
    Ok(())
  }

  /// All notes for a day, ordered by member.
  pub fn standup_notes_for_day(&self, day: &str) -> Result<Vec<StandupNote>> {
    let conn = self.lock()?;
    let mut stmt = conn
      .prepare(
        "SELECT id, day, member, yesterday, today, blockers
         FROM standup_notes WHERE day = ? ORDER BY member",
      )
      .map_err(|e| eyre!("Failed to prepare query: {}", e))?;

    let notes = stmt
      .query_map(params![day], |row| {
        Ok(StandupNote {
          id: row.get(0)?,
          day: row.get(1)?,
          member: row.get(2)?,
          yesterday: row.get(3)?,
          today: row.get(4)?,
          blockers: row.get(5)?,
        })
      })
      .map_err(|e| eyre!("Failed to query standup notes: {}", e))?
      .collect::<rusqlite::Result<Vec<_>>>()
      .map_err(|e| eyre!("Failed to read standup note row: {}", e))?;

    Ok(notes)
  }

  /// Most recent days that have at least one note, newest first.
  pub fn recent_standup_days(&self, limit: u32) -> Result<Vec<String>> {
    let conn = self.lock()?;
    let mut stmt = conn
      .prepare("SELECT DISTINCT day FROM standup_notes ORDER BY day DESC LIMIT ?")
      .map_err(|e| eyre!("Failed to prepare query: {}", e))?;

    let days = stmt
      .query_map(params![limit], |row| row.get(0))
      .map_err(|e| eyre!("Failed to query standup days: {}", e))?
      .collect::<rusqlite::Result<Vec<String>>>()
      .map_err(|e| eyre!("Failed to read standup day row: {}", e))?;

    Ok(days)
  }

  pub fn delete_standup_note(&self, id: i64) -> Result<()> {
    let conn = self.lock()?;
    conn
      .execute("DELETE FROM standup_notes WHERE id = ?", params![id])
      .map_err(|e| eyre!("Failed to delete standup note: {}", e))?;
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_save_and_list_notes_for_day() {
    let db = Database::open_in_memory().unwrap();
    db.save_standup_note("2025-03-10", "rena", "API work", "tests", "")
      .unwrap();
    db.save_standup_note("2025-03-10", "avi", "review", "deploy", "CI is red")
      .unwrap();
    db.save_standup_note("2025-03-11", "rena", "tests", "docs", "")
      .unwrap();

    let notes = db.standup_notes_for_day("2025-03-10").unwrap();
    assert_eq!(notes.len(), 2);
    // Ordered by member
    assert_eq!(notes[0].member, "avi");
    assert_eq!(notes[0].blockers, "CI is red");
    assert_eq!(notes[1].member, "rena");
  }

  #[test]
  fn test_second_save_replaces_same_member_and_day() {
    let db = Database::open_in_memory().unwrap();
    db.save_standup_note("2025-03-10", "rena", "a", "b", "")
      .unwrap();
    db.save_standup_note("2025-03-10", "rena", "a", "b2", "blocked")
      .unwrap();

    let notes = db.standup_notes_for_day("2025-03-10").unwrap();
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].today, "b2");
    assert_eq!(notes[0].blockers, "blocked");
  }

  #[test]
  fn test_recent_days_newest_first() {
    let db = Database::open_in_memory().unwrap();
    for day in ["2025-03-08", "2025-03-10", "2025-03-09"] {
      db.save_standup_note(day, "rena", "", "", "").unwrap();
    }

    let days = db.recent_standup_days(2).unwrap();
    assert_eq!(days, vec!["2025-03-10", "2025-03-09"]);
  }

  #[test]
  fn test_delete_note() {
    let db = Database::open_in_memory().unwrap();
    db.save_standup_note("2025-03-10", "rena", "", "", "")
      .unwrap();
    let id = db.standup_notes_for_day("2025-03-10").unwrap()[0].id;

    db.delete_standup_note(id).unwrap();
    assert!(db.standup_notes_for_day("2025-03-10").unwrap().is_empty());
  }
}
