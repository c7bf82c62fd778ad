use crate::query::{Query, QueryState};
use crate::tracker::types::{Feature, FeatureSummary};
use crate::tracker::CachedTrackerClient;
use crate::ui::ensure_valid_selection;
use crate::ui::renderfns::{status_color, truncate};
use crate::ui::view::{Shortcut, View, ViewAction};
use crate::ui::views::FeatureDetailView;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph};
use tracing::info;

/// View for displaying and prioritizing the features of a release
pub struct ReleaseFeaturesView {
  tracker: CachedTrackerClient,
  release_name: String,
  query: Query<Vec<FeatureSummary>>,
  /// In-flight score update, one at a time
  mutation: Option<Query<Feature>>,
  mutation_error: Option<String>,
  list_state: ListState,
}

impl ReleaseFeaturesView {
  pub fn new(release_id: u64, release_name: String, tracker: CachedTrackerClient) -> Self {
    let tracker_for_query = tracker.clone();
    let mut query = Query::new(move || {
      let tracker = tracker_for_query.clone();
      async move {
        tracker
          .release_features(release_id)
          .await
          .map_err(|e| e.to_string())
      }
    });

    // Start fetching immediately
    query.fetch();

    Self {
      tracker,
      release_name,
      query,
      mutation: None,
      mutation_error: None,
      list_state: ListState::default(),
    }
  }

  fn features(&self) -> &[FeatureSummary] {
    self.query.data().map(|v| v.as_slice()).unwrap_or(&[])
  }

  fn is_loading(&self) -> bool {
    self.query.is_loading()
  }

  fn selected_feature(&self) -> Option<&FeatureSummary> {
    self
      .list_state
      .selected()
      .and_then(|idx| self.features().get(idx))
  }

  /// Start a score update for the selected feature
  fn bump_score(&mut self, delta: i64) {
    if self.mutation.is_some() {
      // Previous update still in flight
      return;
    }
    let Some(feature) = self.selected_feature() else {
      return;
    };

    let id = feature.id;
    let score = feature.score + delta;
    info!(feature = id, score, "Updating feature score");

    let tracker = self.tracker.clone();
    let mut mutation = Query::new(move || {
      let tracker = tracker.clone();
      async move {
        tracker
          .update_feature_score(id, score)
          .await
          .map_err(|e| e.to_string())
      }
    });
    mutation.fetch();

    self.mutation = Some(mutation);
    self.mutation_error = None;
  }

  fn poll_mutation(&mut self) {
    let Some(mutation) = &mut self.mutation else {
      return;
    };
    mutation.poll();

    if mutation.is_success() {
      self.mutation = None;
      // The update invalidated the cached feature lists, so this refetch
      // goes back to the tracker for fresh scores
      self.query.refetch();
    } else if let Some(error) = mutation.error() {
      self.mutation_error = Some(error.to_string());
      self.mutation = None;
    }
  }

  fn title(&self) -> String {
    if self.mutation.is_some() {
      return format!(" {} (saving...) ", self.release_name);
    }
    if let Some(error) = &self.mutation_error {
      return format!(" {} (save failed: {}) ", self.release_name, error);
    }
    match self.query.state() {
      QueryState::Loading => format!(" {} (loading...) ", self.release_name),
      QueryState::Error(e) => format!(" {} (error: {}) ", self.release_name, e),
      _ => format!(" {} ({} features) ", self.release_name, self.features().len()),
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
        "No features in this release."
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
            format!("{:>3}▲", feature.votes_count),
            Style::default().fg(Color::Cyan),
          ),
          Span::raw(" "),
          Span::styled(
            format!("{:<12}", truncate(assignee, 12)),
            Style::default().fg(Color::Blue),
          ),
          Span::raw(" "),
          Span::raw(truncate(&feature.name, 48)),
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

impl View for ReleaseFeaturesView {
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
      KeyCode::Char('+') => {
        self.bump_score(1);
        ViewAction::None
      }
      KeyCode::Char('-') => {
        self.bump_score(-1);
        ViewAction::None
      }
      KeyCode::Char('r') => {
        self.mutation_error = None;
        self.query.refetch();
        ViewAction::None
      }
      KeyCode::Enter => {
        if let Some(feature) = self.selected_feature() {
          return ViewAction::Push(Box::new(FeatureDetailView::new(
            feature.id,
            feature.name.clone(),
            self.tracker.clone(),
          )));
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
    self.release_name.clone()
  }

  fn tick(&mut self) {
    self.query.poll();
    self.poll_mutation();
  }

  fn refresh(&mut self) {
    self.query.refetch();
  }

  fn shortcuts(&self) -> Vec<Shortcut> {
    vec![
      Shortcut::new(":", "command"),
      Shortcut::new("+/-", "score"),
      Shortcut::new("enter", "detail"),
      Shortcut::new("r", "refresh"),
      Shortcut::new("q", "back"),
    ]
  }
}
