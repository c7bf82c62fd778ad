use crate::db::{Database, StandupNote};
use crate::ui::components::{FormEvent, FormInput, KeyResult};
use crate::ui::ensure_valid_selection;
use crate::ui::view::{Shortcut, View, ViewAction};
use chrono::Local;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph};
use tracing::info;

const NOTE_FIELDS: &[&str] = &["member", "yesterday", "today", "blockers"];

#[derive(PartialEq, Eq, Clone, Copy)]
enum Focus {
  Days,
  Notes,
}

/// Standup notes, one day per column entry, kept in the local database
pub struct StandupView {
  db: Database,
  days: Vec<String>,
  days_state: ListState,
  notes: Vec<StandupNote>,
  notes_state: ListState,
  focus: Focus,
  form: FormInput,
  /// One-line status shown in the notes title after a failed action
  status: Option<String>,
}

impl StandupView {
  pub fn new(db: Database) -> Self {
    let mut view = Self {
      db,
      days: Vec::new(),
      days_state: ListState::default(),
      notes: Vec::new(),
      notes_state: ListState::default(),
      focus: Focus::Days,
      form: FormInput::new(NOTE_FIELDS),
      status: None,
    };
    view.reload();
    view
  }

  fn today() -> String {
    Local::now().date_naive().to_string()
  }

  fn reload(&mut self) {
    match self.db.recent_standup_days(60) {
      Ok(mut days) => {
        // Today is always offered, even before its first note
        let today = Self::today();
        if !days.contains(&today) {
          days.insert(0, today);
        }
        self.days = days;
      }
      Err(e) => {
        self.status = Some(e.to_string());
        return;
      }
    }
    self.reload_notes();
  }

  fn reload_notes(&mut self) {
    ensure_valid_selection(&mut self.days_state, self.days.len());
    let Some(day) = self.selected_day() else {
      self.notes.clear();
      return;
    };
    match self.db.standup_notes_for_day(&day) {
      Ok(notes) => self.notes = notes,
      Err(e) => self.status = Some(e.to_string()),
    }
    ensure_valid_selection(&mut self.notes_state, self.notes.len());
  }

  fn selected_day(&self) -> Option<String> {
    self
      .days_state
      .selected()
      .and_then(|idx| self.days.get(idx))
      .cloned()
  }

  fn selected_note(&self) -> Option<&StandupNote> {
    self
      .notes_state
      .selected()
      .and_then(|idx| self.notes.get(idx))
  }

  fn open_blank_form(&mut self) {
    let day = self.selected_day().unwrap_or_else(Self::today);
    self.form.open(format!("Standup note ({})", day));
  }

  fn open_edit_form(&mut self) {
    let Some(note) = self.selected_note() else {
      return;
    };
    let day = note.day.clone();
    let values = vec![
      note.member.clone(),
      note.yesterday.clone(),
      note.today.clone(),
      note.blockers.clone(),
    ];
    self
      .form
      .open_with(format!("Standup note ({})", day), &values);
  }

  fn save_note(&mut self, values: Vec<String>) {
    let day = self.selected_day().unwrap_or_else(Self::today);

    let member = values.first().map(String::as_str).unwrap_or("").trim();
    if member.is_empty() {
      // Bring the form back with what was typed so nothing is lost
      self.status = Some("member is required".to_string());
      let title = format!("Standup note ({})", day);
      self.form.open_with(title, &values);
      return;
    }
    let member = member.to_string();
    let yesterday = values.get(1).map(String::as_str).unwrap_or("");
    let today = values.get(2).map(String::as_str).unwrap_or("");
    let blockers = values.get(3).map(String::as_str).unwrap_or("");

    match self
      .db
      .save_standup_note(&day, &member, yesterday, today, blockers)
    {
      Ok(()) => {
        info!(day = %day, member = %member, "Saved standup note");
        self.status = None;
        self.reload();
      }
      Err(e) => self.status = Some(e.to_string()),
    }
  }

  fn delete_selected_note(&mut self) {
    let Some(note) = self.selected_note() else {
      return;
    };
    let id = note.id;
    match self.db.delete_standup_note(id) {
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
        self.save_note(values);
        Some(ViewAction::None)
      }
      KeyResult::Event(FormEvent::Cancelled) => Some(ViewAction::None),
      KeyResult::NotHandled => None,
    }
  }

  fn handle_navigation(&mut self, key: KeyEvent) -> Option<ViewAction> {
    match key.code {
      KeyCode::Tab => {
        self.focus = match self.focus {
          Focus::Days => Focus::Notes,
          Focus::Notes => Focus::Days,
        };
        Some(ViewAction::None)
      }
      KeyCode::Char('j') | KeyCode::Down => {
        match self.focus {
          Focus::Days => {
            self.days_state.select_next();
            self.reload_notes();
          }
          Focus::Notes => self.notes_state.select_next(),
        }
        Some(ViewAction::None)
      }
      KeyCode::Char('k') | KeyCode::Up => {
        match self.focus {
          Focus::Days => {
            self.days_state.select_previous();
            self.reload_notes();
          }
          Focus::Notes => self.notes_state.select_previous(),
        }
        Some(ViewAction::None)
      }
      _ => None,
    }
  }

  fn handle_actions(&mut self, key: KeyEvent) -> Option<ViewAction> {
    match key.code {
      KeyCode::Char('a') => {
        self.open_blank_form();
        Some(ViewAction::None)
      }
      KeyCode::Char('e') | KeyCode::Enter => {
        if self.focus == Focus::Notes {
          self.open_edit_form();
        }
        Some(ViewAction::None)
      }
      KeyCode::Char('d') => {
        if self.focus == Focus::Notes {
          self.delete_selected_note();
        }
        Some(ViewAction::None)
      }
      KeyCode::Char('r') => {
        self.status = None;
        self.reload();
        Some(ViewAction::None)
      }
      KeyCode::Char('q') | KeyCode::Esc => Some(ViewAction::Pop),
      _ => None,
    }
  }

  fn render_days(&mut self, frame: &mut Frame, area: Rect) {
    ensure_valid_selection(&mut self.days_state, self.days.len());

    let border_color = if self.focus == Focus::Days {
      Color::Yellow
    } else {
      Color::Blue
    };
    let block = Block::default()
      .title(" Days ")
      .borders(Borders::ALL)
      .border_style(Style::default().fg(border_color));

    let today = Self::today();
    let items: Vec<ListItem> = self
      .days
      .iter()
      .map(|day| {
        let style = if *day == today {
          Style::default().fg(Color::Cyan)
        } else {
          Style::default()
        };
        ListItem::new(Span::styled(day.clone(), style))
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

    frame.render_stateful_widget(list, area, &mut self.days_state);
  }

  fn render_notes(&mut self, frame: &mut Frame, area: Rect) {
    ensure_valid_selection(&mut self.notes_state, self.notes.len());

    let day = self.selected_day().unwrap_or_else(Self::today);
    let title = match &self.status {
      Some(status) => format!(" Standup {} ({}) ", day, status),
      None => format!(" Standup {} ({} notes) ", day, self.notes.len()),
    };

    let border_color = if self.focus == Focus::Notes {
      Color::Yellow
    } else {
      Color::Blue
    };
    let block = Block::default()
      .title(title)
      .title_alignment(Alignment::Center)
      .borders(Borders::ALL)
      .border_style(Style::default().fg(border_color));

    if self.notes.is_empty() {
      let paragraph = Paragraph::new("No notes for this day. Press 'a' to add one.")
        .block(block)
        .style(Style::default().fg(Color::DarkGray));
      frame.render_widget(paragraph, area);
      return;
    }

    let items: Vec<ListItem> = self
      .notes
      .iter()
      .map(|note| {
        let blockers_style = if note.blockers.is_empty() {
          Style::default().fg(Color::DarkGray)
        } else {
          Style::default().fg(Color::Red)
        };
        let blockers = if note.blockers.is_empty() {
          "-"
        } else {
          note.blockers.as_str()
        };
        let lines = vec![
          Line::from(Span::styled(
            note.member.clone(),
            Style::default().fg(Color::Cyan).bold(),
          )),
          Line::from(vec![
            Span::styled("  yesterday  ", Style::default().fg(Color::DarkGray)),
            Span::raw(note.yesterday.clone()),
          ]),
          Line::from(vec![
            Span::styled("  today      ", Style::default().fg(Color::DarkGray)),
            Span::raw(note.today.clone()),
          ]),
          Line::from(vec![
            Span::styled("  blockers   ", Style::default().fg(Color::DarkGray)),
            Span::styled(blockers.to_string(), blockers_style),
          ]),
          Line::raw(""),
        ];
        ListItem::new(lines)
      })
      .collect();

    let list = List::new(items)
      .block(block)
      .highlight_style(Style::default().add_modifier(Modifier::BOLD))
      .highlight_symbol("> ");

    frame.render_stateful_widget(list, area, &mut self.notes_state);
  }
}

impl View for StandupView {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    self
      .handle_form(key)
      .or_else(|| self.handle_navigation(key))
      .or_else(|| self.handle_actions(key))
      .unwrap_or(ViewAction::None)
  }

  fn render(&mut self, frame: &mut Frame, area: Rect) {
    let chunks = Layout::horizontal([Constraint::Length(14), Constraint::Min(0)]).split(area);
    self.render_days(frame, chunks[0]);
    self.render_notes(frame, chunks[1]);
    // Let the form render its overlay on top
    self.form.render_overlay(frame, area);
  }

  fn breadcrumb_label(&self) -> String {
    "Standup".to_string()
  }

  fn refresh(&mut self) {
    self.reload();
  }

  fn shortcuts(&self) -> Vec<Shortcut> {
    vec![
      Shortcut::new(":", "command"),
      Shortcut::new("tab", "panel"),
      Shortcut::new("a", "add"),
      Shortcut::new("e", "edit"),
      Shortcut::new("d", "delete"),
      Shortcut::new("q", "back"),
    ]
  }
}
