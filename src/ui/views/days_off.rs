use crate::db::{Database, DayOff};
use crate::ui::components::{FormEvent, FormInput, KeyResult};
use crate::ui::ensure_valid_selection;
use crate::ui::renderfns::truncate;
use crate::ui::view::{Shortcut, View, ViewAction};
use chrono::{Local, NaiveDate};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph};
use tracing::info;

const DAY_OFF_FIELDS: &[&str] = &["member", "day", "reason"];

/// Upcoming days off for the team, kept in the local database
pub struct DaysOffView {
  db: Database,
  entries: Vec<DayOff>,
  list_state: ListState,
  form: FormInput,
  /// One-line status shown in the title after a failed action
  status: Option<String>,
}

impl DaysOffView {
  pub fn new(db: Database) -> Self {
    let mut view = Self {
      db,
      entries: Vec::new(),
      list_state: ListState::default(),
      form: FormInput::new(DAY_OFF_FIELDS),
      status: None,
    };
    view.reload();
    view
  }

  fn today() -> String {
    Local::now().date_naive().to_string()
  }

  fn reload(&mut self) {
    match self.db.upcoming_days_off(&Self::today()) {
      Ok(entries) => {
        self.entries = entries;
        ensure_valid_selection(&mut self.list_state, self.entries.len());
      }
      Err(e) => self.status = Some(e.to_string()),
    }
  }

  fn selected_entry(&self) -> Option<&DayOff> {
    self
      .list_state
      .selected()
      .and_then(|idx| self.entries.get(idx))
  }

  fn open_blank_form(&mut self) {
    // Prefill the day so the format is obvious
    let values = vec![String::new(), Self::today(), String::new()];
    self.form.open_with("Day off", &values);
  }

  fn open_edit_form(&mut self) {
    let Some(entry) = self.selected_entry() else {
      return;
    };
    let values = vec![entry.member.clone(), entry.day.clone(), entry.reason.clone()];
    self.form.open_with("Day off", &values);
  }

  fn save_entry(&mut self, values: Vec<String>) {
    let member = values.first().map(String::as_str).unwrap_or("").trim();
    let day = values.get(1).map(String::as_str).unwrap_or("").trim();
    let reason = values.get(2).map(String::as_str).unwrap_or("").trim();

    if member.is_empty() {
      self.status = Some("member is required".to_string());
      self.form.open_with("Day off", &values);
      return;
    }
    if NaiveDate::parse_from_str(day, "%Y-%m-%d").is_err() {
      self.status = Some("day must be YYYY-MM-DD".to_string());
      self.form.open_with("Day off", &values);
      return;
    }

    match self.db.add_day_off(member, day, reason) {
      Ok(()) => {
        info!(member = %member, day = %day, "Scheduled day off");
        self.status = None;
        self.reload();
      }
      Err(e) => self.status = Some(e.to_string()),
    }
  }

  fn delete_selected_entry(&mut self) {
    let Some(entry) = self.selected_entry() else {
      return;
    };
    let id = entry.id;
    match self.db.remove_day_off(id) {
      Ok(()) => {
        self.status = None;
        self.reload();
      }
      Err(e) => self.status = Some(e.to_string()),
    }
  }

  fn handle_form(&mut self, key: KeyEvent) -> Option<ViewAction> {
    match self.form.handle_key(key) {
      KeyResult::Handled => Some(ViewAction::None),
      KeyResult::Event(FormEvent::Submitted(values)) => {
        self.save_entry(values);
        Some(ViewAction::None)
      }
      KeyResult::Event(FormEvent::Cancelled) => Some(ViewAction::None),
      KeyResult::NotHandled => None,
    }
  }

  fn render_list(&mut self, frame: &mut Frame, area: Rect) {
    ensure_valid_selection(&mut self.list_state, self.entries.len());

    let title = match &self.status {
      Some(status) => format!(" Days Off ({}) ", status),
      None => format!(" Days Off ({}) ", self.entries.len()),
    };

    let block = Block::default()
      .title(title)
      .title_alignment(Alignment::Center)
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Blue));

    if self.entries.is_empty() {
      let paragraph = Paragraph::new("No upcoming days off. Press 'a' to schedule one.")
        .block(block)
        .style(Style::default().fg(Color::DarkGray));
      frame.render_widget(paragraph, area);
      return;
    }

    let items: Vec<ListItem> = self
      .entries
      .iter()
      .map(|entry| {
        let weekday = NaiveDate::parse_from_str(&entry.day, "%Y-%m-%d")
          .map(|d| d.format("%a").to_string())
          .unwrap_or_default();

        let line = Line::from(vec![
          Span::styled(
            format!("{:<11}", entry.day),
            Style::default().fg(Color::Cyan),
          ),
          Span::styled(format!("{:<4}", weekday), Style::default().fg(Color::DarkGray)),
          Span::raw(" "),
          Span::raw(format!("{:<16}", truncate(&entry.member, 16))),
          Span::styled(
            truncate(&entry.reason, 40),
            Style::default().fg(Color::DarkGray),
          ),
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

impl View for DaysOffView {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    if let Some(action) = self.handle_form(key) {
      return action;
    }

    match key.code {
      KeyCode::Char('j') | KeyCode::Down => {
        self.list_state.select_next();
        ViewAction::None
      }
      KeyCode::Char('k') | KeyCode::Up => {
        self.list_state.select_previous();
        ViewAction::None
      }
      KeyCode::Char('a') => {
        self.open_blank_form();
        ViewAction::None
      }
      KeyCode::Char('e') | KeyCode::Enter => {
        self.open_edit_form();
        ViewAction::None
      }
      KeyCode::Char('d') => {
        self.delete_selected_entry();
        ViewAction::None
      }
      KeyCode::Char('r') => {
        self.status = None;
        self.reload();
        ViewAction::None
      }
      KeyCode::Char('q') | KeyCode::Esc => ViewAction::Pop,
      _ => ViewAction::None,
    }
  }

  fn render(&mut self, frame: &mut Frame, area: Rect) {
    self.render_list(frame, area);
    // Let the form render its overlay on top
    self.form.render_overlay(frame, area);
  }

  fn breadcrumb_label(&self) -> String {
    "Days Off".to_string()
  }

  fn refresh(&mut self) {
    self.reload();
  }

  fn shortcuts(&self) -> Vec<Shortcut> {
    vec![
      Shortcut::new(":", "command"),
      Shortcut::new("a", "add"),
      Shortcut::new("e", "edit"),
      Shortcut::new("d", "delete"),
      Shortcut::new("q", "back"),
    ]
  }
}
