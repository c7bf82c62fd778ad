use crate::ui::view::Shortcut;
use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

/// Draw the footer bar: view breadcrumb on the left, the active view's
/// shortcuts on the right
pub fn draw_footer(frame: &mut Frame, area: Rect, breadcrumb: &[String], shortcuts: &[Shortcut]) {
  let mut crumb_spans = Vec::new();

  crumb_spans.push(Span::raw(" "));

  for (i, part) in breadcrumb.iter().enumerate() {
    if i > 0 {
      crumb_spans.push(Span::styled(" > ", Style::default().fg(Color::DarkGray)));
    }

    let style = if i == breadcrumb.len() - 1 {
      // Current view - highlighted
      Style::default().fg(Color::Cyan).bold()
    } else {
      Style::default().fg(Color::White)
    };

    crumb_spans.push(Span::styled(part.clone(), style));
  }

  let mut hint_spans = Vec::new();
  for shortcut in shortcuts {
    hint_spans.push(Span::styled(
      format!("<{}>", shortcut.key),
      Style::default().fg(Color::Cyan),
    ));
    hint_spans.push(Span::styled(
      format!(" {}  ", shortcut.label),
      Style::default().fg(Color::DarkGray),
    ));
  }

  let hint_width: usize = hint_spans.iter().map(|s| s.width()).sum();
  let chunks = Layout::horizontal([
    Constraint::Min(0),
    Constraint::Length(hint_width.min(area.width as usize) as u16),
  ])
  .split(area);

  frame.render_widget(
    Paragraph::new(Line::from(crumb_spans)).style(Style::default().bg(Color::Black)),
    chunks[0],
  );
  frame.render_widget(
    Paragraph::new(Line::from(hint_spans)).style(Style::default().bg(Color::Black)),
    chunks[1],
  );
}
