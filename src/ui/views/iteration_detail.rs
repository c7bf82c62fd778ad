use crate::db::{BurndownSnapshot, Database};
use crate::query::{Query, QueryState};
use crate::tracker::types::{FeatureSummary, Iteration};
use crate::tracker::CachedTrackerClient;
use crate::ui::ensure_valid_selection;
use crate::ui::renderfns::{status_color, truncate};
use crate::ui::view::{Shortcut, View, ViewAction};
use crate::ui::views::{BurndownView, FeatureDetailView};
use chrono::Local;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph};
use tracing::info;

/// View for an iteration's features, with burndown snapshotting
pub struct IterationDetailView {
  iteration: Iteration,
  tracker: CachedTrackerClient,
  db: Database,
  query: Query<Vec<FeatureSummary>>,
  list_state: ListState,
  /// One-line status shown in the title after a snapshot attempt
  status: Option<String>,
}

impl IterationDetailView {
  pub fn new(iteration: Iteration, tracker: CachedTrackerClient, db: Database) -> Self {
    let iteration_id = iteration.id;
    let tracker_for_query = tracker.clone();
    let mut query = Query::new(move || {
      let tracker = tracker_for_query.clone();
      async move {
        tracker
          .iteration_features(iteration_id)
          .await
          .map_err(|e| e.to_string())
      }
    });

    // Start fetching immediately
    query.fetch();

    Self {
      iteration,
      tracker,
      db,
      query,
      list_state: ListState::default(),
      status: None,
    }
  }

  fn features(&self) -> &[FeatureSummary] {
    self.query.data().map(|v| v.as_slice()).unwrap_or(&[])
  }

  fn is_loading(&self) -> bool {
    self.query.is_loading()
  }

  fn remaining_points(&self) -> i64 {
    self
      .features()
      .iter()
      .filter(|f| !f.is_done())
      .map(|f| f.score)
      .sum()
  }

  fn total_points(&self) -> i64 {
    self.features().iter().map(|f| f.score).sum()
  }

  /// Store today's remaining work so the burndown chart gets a data point
  fn record_snapshot(&mut self) {
    if self.query.data().is_none() {
      self.status = Some("features not loaded yet".to_string());
      return;
    }

    let snapshot = BurndownSnapshot {
      iteration_id: self.iteration.id,
      day: Local::now().date_naive().to_string(),
      remaining_points: self.remaining_points(),
      total_points: self.total_points(),
    };

    match self.db.record_burndown(&snapshot) {
      Ok(()) => {
        info!(
          iteration = snapshot.iteration_id,
          day = %snapshot.day,
          remaining = snapshot.remaining_points,
          total = snapshot.total_points,
          "Recorded burndown snapshot"
        );
        self.status = Some(format!(
          "snapshot saved, {}/{} pts remaining",
          snapshot.remaining_points, snapshot.total_points
        ));
      }
      Err(e) => self.status = Some(format!("snapshot failed: {}", e)),
    }
  }

  fn title(&self) -> String {
    if let Some(status) = &self.status {
      return format!(" {} ({}) ", self.iteration.name, status);
    }
    match self.query.state() {
      QueryState::Loading => format!(" {} (loading...) ", self.iteration.name),
      QueryState::Error(e) => format!(" {} (error: {}) ", self.iteration.name, e),
      _ => format!(
        " {} ({} features, {} pts open) ",
        self.iteration.name,
        self.features().len(),
        self.remaining_points()
      ),
    }
  }

  fn render_list(&mut self, frame: &mut Frame, area: Rect) {
    let len = self.features().len();
    ensure_valid_selection(&mut self.list_state, len);

    let block = Block::default()
      .title(self.title())
      .title_alignment(Alignment::Center)
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Blue));

    if self.features().is_empty() && !self.is_loading() {
      let content = if self.query.is_error() {
        "Failed to load features. Press 'r' to retry."
      } else {
        "No features planned in this iteration."
      };
      let paragraph = Paragraph::new(content)
        .block(block)
        .style(Style::default().fg(Color::DarkGray));
      frame.render_widget(paragraph, area);
      return;
    }

    // Collect items first to avoid borrow conflicts with list_state
    let items: Vec<ListItem> = self
      .features()
      .iter()
      .map(|feature| {
        let color = status_color(&feature.status);
        let assignee = feature.assignee.as_deref().unwrap_or("-");

        let line = Line::from(vec![
          Span::styled(
            format!("{:<14}", truncate(&feature.status, 14)),
            Style::default().fg(color),
          ),
          Span::raw(" "),
          Span::styled(
            format!("{:>4}", feature.score),
            Style::default().fg(Color::Magenta),
          ),
          Span::raw(" "),
          Span::styled(
            format!("{:<12}", truncate(assignee, 12)),
            Style::default().fg(Color::Blue),
          ),
          Span::raw(" "),
          Span::raw(truncate(&feature.name, 52)),
        ]);
        ListItem::new(line)
      })
      .collect();

    let list = List::new(items)
      .block(block)
      .highlight_style(
        Style::default()
          .bg(Color::DarkGray)
          .add_modifier(Modifier::BOLD),
      )
      .highlight_symbol("> ");

    frame.render_stateful_widget(list, area, &mut self.list_state);
  }
}

impl View for IterationDetailView {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    match key.code {
      KeyCode::Char('j') | KeyCode::Down => {
        self.list_state.select_next();
        ViewAction::None
      }
      KeyCode::Char('k') | KeyCode::Up => {
        self.list_state.select_previous();
        ViewAction::None
      }
      KeyCode::Char('s') => {
        self.record_snapshot();
        ViewAction::None
      }
      KeyCode::Char('b') => ViewAction::Push(Box::new(BurndownView::new(
        self.iteration.clone(),
        self.db.clone(),
      ))),
      KeyCode::Char('r') => {
        self.status = None;
        self.query.refetch();
        ViewAction::None
      }
      KeyCode::Enter => {
        if let Some(idx) = self.list_state.selected() {
          if let Some(feature) = self.features().get(idx) {
            return ViewAction::Push(Box::new(FeatureDetailView::new(
              feature.id,
              feature.name.clone(),
              self.tracker.clone(),
            )));
          }
        }
        ViewAction::None
      }
      KeyCode::Char('q') | KeyCode::Esc => ViewAction::Pop,
      _ => ViewAction::None,
    }
  }

  fn render(&mut self, frame: &mut Frame, area: Rect) {
    self.render_list(frame, area);
  }

  fn breadcrumb_label(&self) -> String {
    self.iteration.name.clone()
  }

  fn tick(&mut self) {
    self.query.poll();
  }

  fn refresh(&mut self) {
    self.query.refetch();
  }

  fn shortcuts(&self) -> Vec<Shortcut> {
    vec![
      Shortcut::new(":", "command"),
      Shortcut::new("s", "snapshot"),
      Shortcut::new("b", "burndown"),
      Shortcut::new("r", "refresh"),
      Shortcut::new("q", "back"),
    ]
  }
}
