use super::input::TextInput;
use super::KeyResult;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

/// Events emitted by a form that parent needs to handle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormEvent {
  /// Enter pressed, field values in declaration order
  Submitted(Vec<String>),
  /// Escape pressed, form dismissed
  Cancelled,
}

/// Modal form with one text input per field.
///
/// Views open the form, feed keys to it first, and react to the Submitted
/// event. Validation stays in the view; on bad input it can call
/// [`FormInput::open_with`] to bring the form back with the same values.
#[derive(Debug, Clone)]
pub struct FormInput {
  title: String,
  labels: &'static [&'static str],
  fields: Vec<TextInput>,
  focused: usize,
  active: bool,
}

impl FormInput {
  /// Create a closed form; call [`FormInput::open`] to show it
  pub fn new(labels: &'static [&'static str]) -> Self {
    Self {
      title: String::new(),
      labels,
      fields: labels.iter().map(|_| TextInput::new()).collect(),
      focused: 0,
      active: false,
    }
  }

  /// Open the form with all fields empty
  pub fn open(&mut self, title: impl Into<String>) {
    self.title = title.into();
    for field in &mut self.fields {
      field.clear();
    }
    self.focused = 0;
    self.active = true;
  }

  /// Open the form with fields prefilled, e.g. to edit an existing entry
  pub fn open_with(&mut self, title: impl Into<String>, values: &[String]) {
    self.open(title);
    for (field, value) in self.fields.iter_mut().zip(values) {
      field.set_value(value.clone());
    }
  }

  /// Check if the form is currently shown
  pub fn is_active(&self) -> bool {
    self.active
  }

  fn values(&self) -> Vec<String> {
    self.fields.iter().map(|f| f.value().to_string()).collect()
  }

  /// Handle a key event
  pub fn handle_key(&mut self, key: KeyEvent) -> KeyResult<FormEvent> {
    if !self.active {
      return KeyResult::NotHandled;
    }

    match key.code {
      KeyCode::Esc => {
        self.active = false;
        return KeyResult::Event(FormEvent::Cancelled);
      }
      KeyCode::Enter => {
        self.active = false;
        return KeyResult::Event(FormEvent::Submitted(self.values()));
      }
      KeyCode::Tab | KeyCode::Down => {
        if !self.fields.is_empty() {
          self.focused = (self.focused + 1) % self.fields.len();
        }
        return KeyResult::Handled;
      }
      KeyCode::BackTab | KeyCode::Up => {
        if !self.fields.is_empty() {
          self.focused = self.focused.checked_sub(1).unwrap_or(self.fields.len() - 1);
        }
        return KeyResult::Handled;
      }
      _ => {}
    }

    if let Some(field) = self.fields.get_mut(self.focused) {
      field.handle_key(key);
    }
    // Modal: keys never fall through to the view while the form is open
    KeyResult::Handled
  }

  /// Render the form overlay if active
  pub fn render_overlay(&self, frame: &mut Frame, area: Rect) {
    if !self.active {
      return;
    }

    let width = (area.width * 2 / 3).clamp(40, 70);
    let height = self.fields.len() as u16 + 3;
    let x = area.x + area.width.saturating_sub(width) / 2;
    let y = area.y + area.height.saturating_sub(height) / 2;
    let overlay_area = Rect::new(x, y, width, height).intersection(area);

    frame.render_widget(Clear, overlay_area);

    let block = Block::default()
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Yellow))
      .title(format!(" {} ", self.title));

    let inner = block.inner(overlay_area);
    frame.render_widget(block, overlay_area);

    let mut lines: Vec<Line> = Vec::new();
    for (i, label) in self.labels.iter().enumerate() {
      let is_focused = i == self.focused && self.fields.len() > i;
      let marker = if is_focused { "> " } else { "  " };
      let mut spans = vec![
        Span::styled(marker, Style::default().fg(Color::Yellow)),
        Span::styled(
          format!("{:<10} ", label),
          Style::default().fg(Color::DarkGray),
        ),
        Span::raw(self.fields[i].value().to_string()),
      ];
      if is_focused {
        spans.push(Span::styled("_", Style::default().fg(Color::Yellow)));
      }
      lines.push(Line::from(spans));
    }
    lines.push(Line::from(Span::styled(
      "  Tab next field   Enter save   Esc cancel",
      Style::default().fg(Color::DarkGray),
    )));

    frame.render_widget(Paragraph::new(lines), inner);
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crossterm::event::KeyModifiers;

  const LABELS: &[&str] = &["member", "reason"];

  fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
  }

  #[test]
  fn test_new_form_starts_closed() {
    let mut form = FormInput::new(LABELS);
    assert!(!form.is_active());
    assert_eq!(form.handle_key(key(KeyCode::Char('j'))), KeyResult::NotHandled);
  }

  #[test]
  fn test_submit_collects_values_in_field_order() {
    let mut form = FormInput::new(LABELS);
    form.open("Day off");
    form.handle_key(key(KeyCode::Char('a')));
    form.handle_key(key(KeyCode::Tab));
    form.handle_key(key(KeyCode::Char('b')));

    let result = form.handle_key(key(KeyCode::Enter));
    assert_eq!(
      result,
      KeyResult::Event(FormEvent::Submitted(vec!["a".to_string(), "b".to_string()]))
    );
    assert!(!form.is_active());
  }

  #[test]
  fn test_backtab_wraps_to_last_field() {
    let mut form = FormInput::new(LABELS);
    form.open("Day off");
    form.handle_key(key(KeyCode::BackTab));
    form.handle_key(key(KeyCode::Char('z')));

    let result = form.handle_key(key(KeyCode::Enter));
    assert_eq!(
      result,
      KeyResult::Event(FormEvent::Submitted(vec![String::new(), "z".to_string()]))
    );
  }

  #[test]
  fn test_escape_cancels() {
    let mut form = FormInput::new(LABELS);
    form.open("Day off");
    form.handle_key(key(KeyCode::Char('x')));

    let result = form.handle_key(key(KeyCode::Esc));
    assert_eq!(result, KeyResult::Event(FormEvent::Cancelled));
    assert!(!form.is_active());
  }

  #[test]
  fn test_open_with_prefills_and_edits() {
    let mut form = FormInput::new(LABELS);
    form.open_with("Edit", &["av".to_string(), "pto".to_string()]);
    form.handle_key(key(KeyCode::Char('i')));

    let result = form.handle_key(key(KeyCode::Enter));
    assert_eq!(
      result,
      KeyResult::Event(FormEvent::Submitted(vec![
        "avi".to_string(),
        "pto".to_string()
      ]))
    );
  }

  #[test]
  fn test_active_form_swallows_unbound_keys() {
    let mut form = FormInput::new(LABELS);
    form.open("Day off");
    assert_eq!(form.handle_key(key(KeyCode::F(5))), KeyResult::Handled);
  }
}
