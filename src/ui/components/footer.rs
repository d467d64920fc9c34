use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

use crate::engine::EngineState;

/// Draw the footer bar with view breadcrumb and fetch status
pub fn draw_footer(frame: &mut Frame, area: Rect, breadcrumb: &[String], state: &EngineState) {
  let mut spans = Vec::new();

  spans.push(Span::raw(" "));

  for (i, part) in breadcrumb.iter().enumerate() {
    if i > 0 {
      spans.push(Span::styled(" > ", Style::default().fg(Color::DarkGray)));
    }

    let style = if i == breadcrumb.len() - 1 {
      // Current view - highlighted
      Style::default().fg(Color::Cyan).bold()
    } else {
      Style::default().fg(Color::White)
    };

    spans.push(Span::styled(part.clone(), style));
  }

  if let Some((text, color)) = status(state) {
    spans.push(Span::styled("  │  ", Style::default().fg(Color::DarkGray)));
    spans.push(Span::styled(text, Style::default().fg(color)));
  }

  let line = Line::from(spans);
  let paragraph = Paragraph::new(line).style(Style::default().bg(Color::Black));

  frame.render_widget(paragraph, area);
}

/// Status text for the footer; the most severe condition wins
fn status(state: &EngineState) -> Option<(String, Color)> {
  if state.rate_limited {
    let message = state.error.clone().unwrap_or_default();
    return Some((message, Color::Red));
  }
  if state.loading {
    return Some(("Loading...".to_string(), Color::Yellow));
  }
  if let Some(error) = &state.error {
    return Some((format!("{} (r to retry)", error), Color::Red));
  }
  if state.exhausted && !state.items.is_empty() {
    return Some(("No more photos".to_string(), Color::DarkGray));
  }
  None
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_idle_has_no_status() {
    assert_eq!(status(&EngineState::default()), None);
  }

  #[test]
  fn test_rate_limit_beats_loading() {
    let state = EngineState {
      loading: true,
      rate_limited: true,
      error: Some("API Limit Reached".to_string()),
      ..Default::default()
    };
    assert_eq!(
      status(&state),
      Some(("API Limit Reached".to_string(), Color::Red))
    );
  }

  #[test]
  fn test_retry_in_flight_shows_loading() {
    let state = EngineState {
      loading: true,
      error: Some("Failed to fetch images".to_string()),
      ..Default::default()
    };
    assert_eq!(
      status(&state),
      Some(("Loading...".to_string(), Color::Yellow))
    );
  }

  #[test]
  fn test_error_offers_retry() {
    let state = EngineState {
      error: Some("Failed to fetch images".to_string()),
      ..Default::default()
    };
    let (text, _) = status(&state).unwrap();
    assert!(text.contains("r to retry"));
  }
}
