use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

/// What the parent view should do after a key reached the search input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchResult {
  /// Search is not active and the key is not '/'
  NotHandled,
  /// Key consumed, nothing changed that the parent cares about
  Active,
  /// Query text changed (emitted on each edit)
  Changed(String),
  /// Enter pressed, overlay closed
  Submitted(String),
  /// Escape pressed, overlay closed, query discarded
  Cancelled,
}

/// Single-line search overlay, opened with '/'
#[derive(Debug, Clone, Default)]
pub struct SearchInput {
  buffer: String,
  active: bool,
}

impl SearchInput {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn is_active(&self) -> bool {
    self.active
  }

  pub fn query(&self) -> &str {
    &self.buffer
  }

  /// Open the overlay, keeping the previous query for editing
  pub fn activate(&mut self) {
    self.active = true;
  }

  /// Handle a key event
  /// Call this regardless of active state - it handles activation too
  pub fn handle_key(&mut self, key: KeyEvent) -> SearchResult {
    if !self.active {
      if key.code == KeyCode::Char('/') {
        self.activate();
        return SearchResult::Active;
      }
      return SearchResult::NotHandled;
    }

    match key.code {
      KeyCode::Esc => {
        self.active = false;
        self.buffer.clear();
        SearchResult::Cancelled
      }
      KeyCode::Enter => {
        self.active = false;
        SearchResult::Submitted(self.buffer.clone())
      }
      KeyCode::Backspace => {
        if self.buffer.pop().is_some() {
          SearchResult::Changed(self.buffer.clone())
        } else {
          SearchResult::Active
        }
      }
      KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
        self.buffer.clear();
        SearchResult::Changed(String::new())
      }
      KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
        self.buffer.push(c);
        SearchResult::Changed(self.buffer.clone())
      }
      _ => SearchResult::Active,
    }
  }

  /// Render the search overlay if active
  pub fn render_overlay(&self, frame: &mut Frame, area: Rect) {
    if !self.active {
      return;
    }

    let width = (area.width * 60 / 100).clamp(30, 60).min(area.width);
    let height = 3u16.min(area.height);
    let overlay_area = Rect::new(area.x + 1, area.y + 1, width.saturating_sub(1), height);

    frame.render_widget(Clear, overlay_area);

    let block = Block::default()
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Yellow))
      .title(" Search photos ");

    let inner = block.inner(overlay_area);
    frame.render_widget(block, overlay_area);

    if inner.height == 0 {
      return;
    }

    let input_line = Line::from(vec![
      Span::styled("/", Style::default().fg(Color::Yellow)),
      Span::raw(self.buffer.as_str()),
      Span::styled("_", Style::default().fg(Color::Yellow)), // Cursor
    ]);
    frame.render_widget(Paragraph::new(input_line), inner);
  }
}
