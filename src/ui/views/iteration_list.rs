use crate::db::Database;
use crate::query::{Query, QueryState};
use crate::tracker::types::{Iteration, IterationState};
use crate::tracker::CachedTrackerClient;
use crate::ui::ensure_valid_selection;
use crate::ui::renderfns::truncate;
use crate::ui::view::{Shortcut, View, ViewAction};
use crate::ui::views::IterationDetailView;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph};

fn state_color(state: IterationState) -> Color {
  match state {
    IterationState::Active => Color::Green,
    IterationState::Planning => Color::White,
    IterationState::Closed => Color::DarkGray,
  }
}

/// View for displaying the iterations of a product
pub struct IterationListView {
  tracker: CachedTrackerClient,
  db: Database,
  query: Query<Vec<Iteration>>,
  list_state: ListState,
}

impl IterationListView {
  pub fn new(product: String, tracker: CachedTrackerClient, db: Database) -> Self {
    let tracker_for_query = tracker.clone();
    let mut query = Query::new(move || {
      let tracker = tracker_for_query.clone();
      let product = product.clone();
      async move { tracker.iterations(&product).await.map_err(|e| e.to_string()) }
    });

    // Start fetching immediately
    query.fetch();

    Self {
      tracker,
      db,
      query,
      list_state: ListState::default(),
    }
  }

  fn iterations(&self) -> &[Iteration] {
    self.query.data().map(|v| v.as_slice()).unwrap_or(&[])
  }

  fn is_loading(&self) -> bool {
    self.query.is_loading()
  }

  fn render_list(&mut self, frame: &mut Frame, area: Rect) {
    let len = self.iterations().len();
    ensure_valid_selection(&mut self.list_state, len);

    let title = match self.query.state() {
      QueryState::Loading => " Iterations (loading...) ".to_string(),
      QueryState::Error(e) => format!(" Iterations (error: {}) ", e),
      _ => format!(" Iterations ({}) ", len),
    };

    let block = Block::default()
      .title(title)
      .title_alignment(Alignment::Center)
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Blue));

    if self.iterations().is_empty() && !self.is_loading() {
      let content = if self.query.is_error() {
        "Failed to load iterations. Press 'r' to retry."
      } else {
        "No iterations found for this product."
      };
      let paragraph = Paragraph::new(content)
        .block(block)
        .style(Style::default().fg(Color::DarkGray));
      frame.render_widget(paragraph, area);
      return;
    }

    // Collect items first to avoid borrow conflicts with list_state
    let items: Vec<ListItem> = self
      .iterations()
      .iter()
      .map(|iteration| {
        let start = iteration.start_date.as_deref().unwrap_or("-");
        let end = iteration.end_date.as_deref().unwrap_or("-");

        let line = Line::from(vec![
          Span::styled(
            format!("{:<9}", iteration.state.label()),
            Style::default().fg(state_color(iteration.state)),
          ),
          Span::raw(" "),
          Span::styled(
            format!("{:<12}{:<12}", start, end),
            Style::default().fg(Color::Cyan),
          ),
          Span::raw(" "),
          Span::raw(truncate(&iteration.name, 50)),
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

impl View for IterationListView {
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
      KeyCode::Char('r') => {
        self.query.refetch();
        ViewAction::None
      }
      KeyCode::Enter => {
        if let Some(idx) = self.list_state.selected() {
          if let Some(iteration) = self.iterations().get(idx) {
            return ViewAction::Push(Box::new(IterationDetailView::new(
              iteration.clone(),
              self.tracker.clone(),
              self.db.clone(),
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
    "Iterations".to_string()
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
      Shortcut::new("enter", "features"),
      Shortcut::new("r", "refresh"),
      Shortcut::new("q", "back"),
    ]
  }
}
