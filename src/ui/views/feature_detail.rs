use crate::query::{Query, QueryState};
use crate::tracker::types::{Feature, Vote};
use crate::tracker::CachedTrackerClient;
use crate::ui::renderfns::{status_color, truncate};
use crate::ui::view::{Shortcut, View, ViewAction};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, List, ListItem, Paragraph, Wrap};

/// View for displaying feature details and its votes
pub struct FeatureDetailView {
  tracker: CachedTrackerClient,
  feature_id: u64,
  feature_name: String,
  query: Query<Feature>,
  /// Votes are only fetched once the panel is opened
  votes: Option<Query<Vec<Vote>>>,
  show_votes: bool,
}

impl FeatureDetailView {
  pub fn new(feature_id: u64, feature_name: String, tracker: CachedTrackerClient) -> Self {
    let tracker_for_query = tracker.clone();
    let mut query = Query::new(move || {
      let tracker = tracker_for_query.clone();
      async move { tracker.feature(feature_id).await.map_err(|e| e.to_string()) }
    });

    // Start fetching immediately
    query.fetch();

    Self {
      tracker,
      feature_id,
      feature_name,
      query,
      votes: None,
      show_votes: false,
    }
  }

  fn toggle_votes(&mut self) {
    self.show_votes = !self.show_votes;
    if self.show_votes && self.votes.is_none() {
      let tracker = self.tracker.clone();
      let feature_id = self.feature_id;
      let mut votes = Query::new(move || {
        let tracker = tracker.clone();
        async move {
          tracker
            .feature_votes(feature_id)
            .await
            .map_err(|e| e.to_string())
        }
      });
      votes.fetch();
      self.votes = Some(votes);
    }
  }

  fn render_detail(&self, frame: &mut Frame, area: Rect) {
    let width = area.width.saturating_sub(12) as usize;
    let name = truncate(&self.feature_name, width);
    let title = match self.query.state() {
      QueryState::Loading => format!(" {} (loading...) ", name),
      QueryState::Error(e) => format!(" {} (error: {}) ", name, e),
      // Once loaded, the fetched name replaces the list row's copy
      QueryState::Success(feature) => {
        format!(" #{} {} ", feature.id, truncate(&feature.name, width))
      }
      QueryState::Idle => format!(" {} ", name),
    };

    let block = Block::default()
      .title(title)
      .title_alignment(Alignment::Center)
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Blue));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    // Show loading or error state
    if self.query.is_loading() {
      let paragraph =
        Paragraph::new("Loading feature details...").style(Style::default().fg(Color::DarkGray));
      frame.render_widget(paragraph, inner);
      return;
    }

    if let Some(error) = self.query.error() {
      let paragraph = Paragraph::new(format!("Error: {}\n\nPress 'r' to retry.", error))
        .style(Style::default().fg(Color::Red));
      frame.render_widget(paragraph, inner);
      return;
    }

    let Some(feature) = self.query.data() else {
      return;
    };

    let chunks = Layout::default()
      .direction(Direction::Vertical)
      .constraints([
        Constraint::Length(3), // Status, score, assignee, tags
        Constraint::Length(1), // Separator
        Constraint::Min(1),    // Description
      ])
      .split(inner);

    let tags = if feature.tags.is_empty() {
      "-".to_string()
    } else {
      feature.tags.join(", ")
    };
    let header = vec![
      Line::from(vec![
        Span::styled("Status: ", Style::default().fg(Color::DarkGray)),
        Span::styled(
          &feature.status,
          Style::default().fg(status_color(&feature.status)),
        ),
        Span::raw("  "),
        Span::styled("Score: ", Style::default().fg(Color::DarkGray)),
        Span::styled(feature.score.to_string(), Style::default().fg(Color::Magenta)),
        Span::raw("  "),
        Span::styled("Votes: ", Style::default().fg(Color::DarkGray)),
        Span::styled(
          feature.votes_count.to_string(),
          Style::default().fg(Color::Cyan),
        ),
      ]),
      Line::from(vec![
        Span::styled("Assignee: ", Style::default().fg(Color::DarkGray)),
        Span::raw(feature.assignee.as_deref().unwrap_or("Unassigned")),
        Span::raw("  "),
        Span::styled("Created: ", Style::default().fg(Color::DarkGray)),
        Span::raw(feature.created_at.as_str()),
        Span::raw("  "),
        Span::styled("Updated: ", Style::default().fg(Color::DarkGray)),
        Span::raw(feature.updated_at.as_str()),
      ]),
      Line::from(vec![
        Span::styled("Tags: ", Style::default().fg(Color::DarkGray)),
        Span::raw(tags),
      ]),
    ];
    frame.render_widget(Paragraph::new(header), chunks[0]);

    let sep = Paragraph::new("─".repeat(chunks[1].width as usize))
      .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(sep, chunks[1]);

    let desc = feature.description.as_deref().unwrap_or("No description");
    let desc_para = Paragraph::new(desc).wrap(Wrap { trim: true });
    frame.render_widget(desc_para, chunks[2]);
  }

  fn render_votes(&self, frame: &mut Frame, area: Rect) {
    let Some(votes) = &self.votes else {
      return;
    };

    let title = match votes.state() {
      QueryState::Loading => " Votes (loading...) ".to_string(),
      QueryState::Error(e) => format!(" Votes (error: {}) ", e),
      _ => format!(" Votes ({}) ", votes.data().map(Vec::len).unwrap_or(0)),
    };

    let block = Block::default()
      .title(title)
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Blue));

    let entries = votes.data().map(|v| v.as_slice()).unwrap_or(&[]);
    if entries.is_empty() {
      let paragraph = Paragraph::new("No votes yet.")
        .block(block)
        .style(Style::default().fg(Color::DarkGray));
      frame.render_widget(paragraph, area);
      return;
    }

    let items: Vec<ListItem> = entries
      .iter()
      .map(|vote| {
        let voter = vote.voter.as_deref().unwrap_or("anonymous");
        let line = Line::from(vec![
          Span::styled(
            format!("{:<16}", truncate(voter, 16)),
            Style::default().fg(Color::Cyan),
          ),
          Span::styled(
            vote.cast_at.clone(),
            Style::default().fg(Color::DarkGray),
          ),
        ]);
        ListItem::new(line)
      })
      .collect();

    frame.render_widget(List::new(items).block(block), area);
  }
}

impl View for FeatureDetailView {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    match key.code {
      KeyCode::Char('v') => {
        self.toggle_votes();
        ViewAction::None
      }
      KeyCode::Char('r') => {
        self.query.refetch();
        if let Some(votes) = &mut self.votes {
          votes.refetch();
        }
        ViewAction::None
      }
      KeyCode::Char('q') | KeyCode::Esc => ViewAction::Pop,
      _ => ViewAction::None,
    }
  }

  fn render(&mut self, frame: &mut Frame, area: Rect) {
    if self.show_votes {
      let chunks =
        Layout::horizontal([Constraint::Min(0), Constraint::Length(34)]).split(area);
      self.render_detail(frame, chunks[0]);
      self.render_votes(frame, chunks[1]);
    } else {
      self.render_detail(frame, area);
    }
  }

  fn breadcrumb_label(&self) -> String {
    truncate(&self.feature_name, 24)
  }

  fn tick(&mut self) {
    self.query.poll();
    if let Some(votes) = &mut self.votes {
      votes.poll();
    }
  }

  fn refresh(&mut self) {
    self.query.refetch();
    if let Some(votes) = &mut self.votes {
      votes.refetch();
    }
  }

  fn shortcuts(&self) -> Vec<Shortcut> {
    vec![
      Shortcut::new(":", "command"),
      Shortcut::new("v", "votes"),
      Shortcut::new("r", "refresh"),
      Shortcut::new("q", "back"),
    ]
  }
}
