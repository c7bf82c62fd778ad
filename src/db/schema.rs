/// Schema for local tables. All dates are ISO `YYYY-MM-DD` strings so that
/// string ordering matches date ordering.
pub const SCHEMA: &str = r#"
-- Standup notes, one row per member per day
CREATE TABLE IF NOT EXISTS standup_notes (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    day TEXT NOT NULL,
    member TEXT NOT NULL,
    yesterday TEXT NOT NULL DEFAULT '',
    today TEXT NOT NULL DEFAULT '',
    blockers TEXT NOT NULL DEFAULT '',
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    UNIQUE (day, member)
);

CREATE INDEX IF NOT EXISTS idx_standup_notes_day ON standup_notes(day);

-- Burndown snapshots, one row per iteration per day (last capture wins)
CREATE TABLE IF NOT EXISTS burndown_snapshots (
    iteration_id INTEGER NOT NULL,
    day TEXT NOT NULL,
    remaining_points INTEGER NOT NULL,
    total_points INTEGER NOT NULL,
    captured_at TEXT NOT NULL DEFAULT (datetime('now')),
    PRIMARY KEY (iteration_id, day)
);

-- Scheduled days off per member
CREATE TABLE IF NOT EXISTS days_off (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    member TEXT NOT NULL,
    day TEXT NOT NULL,
    reason TEXT NOT NULL DEFAULT '',
    UNIQUE (member, day)
);

CREATE INDEX IF NOT EXISTS idx_days_off_day ON days_off(day);
"#;
