use ratatui::prelude::Color;

/// Truncate a string to a maximum number of chars, adding "..." if truncated
pub fn truncate(s: &str, max_len: usize) -> String {
  if s.chars().count() <= max_len {
    s.to_string()
  } else {
    let keep: String = s.chars().take(max_len.saturating_sub(3)).collect();
    format!("{}...", keep)
  }
}

/// Get the display color for a workflow status.
///
/// Trackers let teams name statuses freely, so this matches on keywords
/// rather than exact names.
pub fn status_color(status: &str) -> Color {
  let status = status.to_lowercase();
  if status.contains("block") || status.contains("will not") {
    Color::Red
  } else if status.contains("shipped")
    || status.contains("done")
    || status.contains("complete")
    || status.contains("closed")
  {
    Color::Green
  } else if status.contains("progress") || status.contains("develop") || status.contains("review") {
    Color::Yellow
  } else {
    Color::White
  }
}
