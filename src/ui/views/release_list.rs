use crate::query::{Query, QueryState};
use crate::tracker::types::Release;
use crate::tracker::CachedTrackerClient;
use crate::ui::ensure_valid_selection;
use crate::ui::renderfns::truncate;
use crate::ui::view::{Shortcut, View, ViewAction};
use crate::ui::views::ReleaseFeaturesView;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph};

/// View for displaying the releases of a product
pub struct ReleaseListView {
  tracker: CachedTrackerClient,
  query: Query<Vec<Release>>,
  list_state: ListState,
}

impl ReleaseListView {
  pub fn new(product: String, tracker: CachedTrackerClient) -> Self {
    let tracker_for_query = tracker.clone();
    let mut query = Query::new(move || {
      let tracker = tracker_for_query.clone();
      let product = product.clone();
      async move { tracker.releases(&product).await.map_err(|e| e.to_string()) }
    });

    // Start fetching immediately
    query.fetch();

    Self {
      tracker,
      query,
      list_state: ListState::default(),
    }
  }

  fn releases(&self) -> &[Release] {
    self.query.data().map(|v| v.as_slice()).unwrap_or(&[])
  }

  fn is_loading(&self) -> bool {
    self.query.is_loading()
  }

  fn render_list(&mut self, frame: &mut Frame, area: Rect) {
    let len = self.releases().len();
    ensure_valid_selection(&mut self.list_state, len);

    let title = match self.query.state() {
      QueryState::Loading => " Releases (loading...) ".to_string(),
      QueryState::Error(e) => format!(" Releases (error: {}) ", e),
      _ => format!(" Releases ({}) ", len),
    };

    let block = Block::default()
      .title(title)
      .title_alignment(Alignment::Center)
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Blue));

    if self.releases().is_empty() && !self.is_loading() {
      let content = if self.query.is_error() {
        "Failed to load releases. Press 'r' to retry."
      } else {
        "No releases found for this product."
      };
      let paragraph = Paragraph::new(content)
        .block(block)
        .style(Style::default().fg(Color::DarkGray));
      frame.render_widget(paragraph, area);
      return;
    }

    // Collect items first to avoid borrow conflicts with list_state
    let items: Vec<ListItem> = self
      .releases()
      .iter()
      .map(|release| {
        let (phase, color) = if release.released {
          ("shipped", Color::Green)
        } else {
          ("open", Color::Yellow)
        };
        let date = release.release_date.as_deref().unwrap_or("-");
        let progress = release
          .progress
          .map(|p| format!("{:>3.0}%", p * 100.0))
          .unwrap_or_else(|| "   -".to_string());

        let line = Line::from(vec![
          Span::styled(format!("{:<8}", phase), Style::default().fg(color)),
          Span::raw(" "),
          Span::styled(format!("{:<12}", date), Style::default().fg(Color::Cyan)),
          Span::raw(" "),
          Span::styled(progress, Style::default().fg(Color::Magenta)),
          Span::raw("  "),
          Span::raw(truncate(&release.name, 60)),
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

impl View for ReleaseListView {
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
          if let Some(release) = self.releases().get(idx) {
            return ViewAction::Push(Box::new(ReleaseFeaturesView::new(
              release.id,
              release.name.clone(),
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
    "Releases".to_string()
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
      Shortcut::new("q", "quit"),
    ]
  }
}
