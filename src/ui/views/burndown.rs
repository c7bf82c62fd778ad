use crate::db::{BurndownSnapshot, Database};
use crate::tracker::types::Iteration;
use crate::ui::view::{Shortcut, View, ViewAction};
use chrono::NaiveDate;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::symbols::Marker;
use ratatui::widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, Paragraph};

/// Chart series derived from recorded snapshots
struct BurndownSeries {
  actual: Vec<(f64, f64)>,
  ideal: [(f64, f64); 2],
  x_max: f64,
  y_max: f64,
  x_labels: Vec<String>,
}

fn parse_day(day: &str) -> Option<NaiveDate> {
  NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}

/// Turn snapshots into chart data.
///
/// When the iteration has a usable date window, snapshots are placed at
/// their day offset within it; otherwise they are spaced by capture order.
/// The ideal line runs from the first snapshot's total down to zero.
fn build_series(
  snapshots: &[BurndownSnapshot],
  start_date: Option<&str>,
  end_date: Option<&str>,
) -> BurndownSeries {
  let window = start_date
    .and_then(parse_day)
    .zip(end_date.and_then(parse_day))
    .filter(|(start, end)| end > start);

  let total = snapshots.first().map(|s| s.total_points).unwrap_or(0) as f64;

  let (actual, x_max, x_labels) = match window {
    Some((start, end)) => {
      let span = (end - start).num_days() as f64;
      let actual: Vec<(f64, f64)> = snapshots
        .iter()
        .filter_map(|s| {
          parse_day(&s.day).map(|d| {
            let x = (d - start).num_days() as f64;
            (x.max(0.0), s.remaining_points as f64)
          })
        })
        .collect();
      // A snapshot past the planned end still belongs on the chart
      let x_max = actual.iter().map(|(x, _)| *x).fold(span, f64::max);
      (actual, x_max, vec![start.to_string(), end.to_string()])
    }
    None => {
      let actual: Vec<(f64, f64)> = snapshots
        .iter()
        .enumerate()
        .map(|(i, s)| (i as f64, s.remaining_points as f64))
        .collect();
      let x_max = snapshots.len().saturating_sub(1).max(1) as f64;
      let labels = vec!["first".to_string(), "latest".to_string()];
      (actual, x_max, labels)
    }
  };

  let y_max = actual.iter().map(|(_, y)| *y).fold(total, f64::max).max(1.0);

  BurndownSeries {
    ideal: [(0.0, total), (x_max, 0.0)],
    actual,
    x_max,
    y_max,
    x_labels,
  }
}

/// Burndown chart for an iteration, drawn from locally recorded snapshots
pub struct BurndownView {
  iteration: Iteration,
  db: Database,
  snapshots: Vec<BurndownSnapshot>,
  error: Option<String>,
}

impl BurndownView {
  pub fn new(iteration: Iteration, db: Database) -> Self {
    let mut view = Self {
      iteration,
      db,
      snapshots: Vec::new(),
      error: None,
    };
    view.reload();
    view
  }

  fn reload(&mut self) {
    match self.db.burndown_for_iteration(self.iteration.id) {
      Ok(snapshots) => {
        self.snapshots = snapshots;
        self.error = None;
      }
      Err(e) => self.error = Some(e.to_string()),
    }
  }

  fn render_chart(&self, frame: &mut Frame, area: Rect) {
    let title = match &self.error {
      Some(e) => format!(" {} burndown (error: {}) ", self.iteration.name, e),
      None => format!(
        " {} burndown ({} snapshots) ",
        self.iteration.name,
        self.snapshots.len()
      ),
    };

    let block = Block::default()
      .title(title)
      .title_alignment(Alignment::Center)
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Blue));

    if self.snapshots.is_empty() {
      let paragraph =
        Paragraph::new("No snapshots recorded yet. Press 's' on the iteration to record one.")
          .block(block)
          .style(Style::default().fg(Color::DarkGray));
      frame.render_widget(paragraph, area);
      return;
    }

    let series = build_series(
      &self.snapshots,
      self.iteration.start_date.as_deref(),
      self.iteration.end_date.as_deref(),
    );

    let datasets = vec![
      Dataset::default()
        .name("ideal")
        .marker(Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(Color::DarkGray))
        .data(&series.ideal),
      Dataset::default()
        .name("remaining")
        .marker(Marker::Dot)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(Color::Cyan))
        .data(&series.actual),
    ];

    let chart = Chart::new(datasets)
      .block(block)
      .x_axis(
        Axis::default()
          .style(Style::default().fg(Color::DarkGray))
          .bounds([0.0, series.x_max])
          .labels(series.x_labels),
      )
      .y_axis(
        Axis::default()
          .title("points")
          .style(Style::default().fg(Color::DarkGray))
          .bounds([0.0, series.y_max])
          .labels(vec!["0".to_string(), format!("{:.0}", series.y_max)]),
      );

    frame.render_widget(chart, area);
  }
}

impl View for BurndownView {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    match key.code {
      KeyCode::Char('r') => {
        self.reload();
        ViewAction::None
      }
      KeyCode::Char('q') | KeyCode::Esc => ViewAction::Pop,
      _ => ViewAction::None,
    }
  }

  fn render(&mut self, frame: &mut Frame, area: Rect) {
    self.render_chart(frame, area);
  }

  fn breadcrumb_label(&self) -> String {
    "Burndown".to_string()
  }

  fn refresh(&mut self) {
    self.reload();
  }

  fn shortcuts(&self) -> Vec<Shortcut> {
    vec![
      Shortcut::new(":", "command"),
      Shortcut::new("r", "refresh"),
      Shortcut::new("q", "back"),
    ]
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn snapshot(day: &str, remaining: i64, total: i64) -> BurndownSnapshot {
    BurndownSnapshot {
      iteration_id: 7,
      day: day.to_string(),
      remaining_points: remaining,
      total_points: total,
    }
  }

  #[test]
  fn test_series_uses_iteration_window() {
    let snapshots = vec![
      snapshot("2026-08-18", 10, 10),
      snapshot("2026-08-20", 6, 10),
    ];
    let series = build_series(&snapshots, Some("2026-08-17"), Some("2026-08-27"));

    assert_eq!(series.actual, vec![(1.0, 10.0), (3.0, 6.0)]);
    assert_eq!(series.x_max, 10.0);
    assert_eq!(series.ideal, [(0.0, 10.0), (10.0, 0.0)]);
    assert_eq!(series.y_max, 10.0);
    assert_eq!(series.x_labels, vec!["2026-08-17", "2026-08-27"]);
  }

  #[test]
  fn test_series_falls_back_to_capture_order() {
    let snapshots = vec![
      snapshot("2026-08-18", 8, 8),
      snapshot("2026-08-19", 5, 8),
      snapshot("2026-08-21", 2, 8),
    ];
    let series = build_series(&snapshots, None, Some("not-a-date"));

    assert_eq!(series.actual, vec![(0.0, 8.0), (1.0, 5.0), (2.0, 2.0)]);
    assert_eq!(series.x_max, 2.0);
  }

  #[test]
  fn test_snapshot_after_planned_end_extends_axis() {
    let snapshots = vec![
      snapshot("2026-08-18", 4, 4),
      snapshot("2026-08-30", 1, 4),
    ];
    let series = build_series(&snapshots, Some("2026-08-17"), Some("2026-08-27"));

    assert_eq!(series.x_max, 13.0);
  }

  #[test]
  fn test_empty_snapshots_keep_sane_bounds() {
    let series = build_series(&[], None, None);

    assert!(series.actual.is_empty());
    assert_eq!(series.x_max, 1.0);
    assert_eq!(series.y_max, 1.0);
  }
}
