use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

/// Draw the header bar with logo, tracker domain, and product
pub fn draw_header(
  frame: &mut Frame,
  area: Rect,
  domain: &str,
  product: &str,
  title: Option<&str>,
) {
  let mut spans = vec![
    Span::styled(" sm9s ", Style::default().fg(Color::Cyan).bold()),
    Span::styled("│", Style::default().fg(Color::DarkGray)),
    Span::styled(format!(" {} ", domain), Style::default().fg(Color::White)),
    Span::styled("│", Style::default().fg(Color::DarkGray)),
    Span::styled(
      format!(" {} ", product),
      Style::default().fg(Color::Yellow).bold(),
    ),
  ];

  // Optional team title from the config
  if let Some(title) = title {
    spans.push(Span::styled("│", Style::default().fg(Color::DarkGray)));
    spans.push(Span::styled(
      format!(" {} ", title),
      Style::default().fg(Color::Magenta),
    ));
  }

  let paragraph = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::Black));

  frame.render_widget(paragraph, area);
}
