use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};

use crate::engine::Engine;
use crate::ui::view::{View, ViewAction};
use crate::unsplash::Image;

/// Detail view for a single photo
pub struct PhotoView {
  image: Image,
}

impl PhotoView {
  pub fn new(image: Image) -> Self {
    Self { image }
  }

  fn field<'a>(label: &'a str, value: String, color: Color) -> Line<'a> {
    Line::from(vec![
      Span::styled(format!("{:<12}", label), Style::default().fg(Color::DarkGray)),
      Span::styled(value, Style::default().fg(color)),
    ])
  }
}

impl View for PhotoView {
  fn handle_key(&mut self, key: KeyEvent, _engine: &mut Engine) -> ViewAction {
    match key.code {
      KeyCode::Char('q') | KeyCode::Esc | KeyCode::Enter => ViewAction::Pop,
      _ => ViewAction::None,
    }
  }

  fn render(&mut self, frame: &mut Frame, area: Rect, _engine: &Engine) {
    let block = Block::default()
      .title(format!(" {} ", self.image.id))
      .title_alignment(Alignment::Center)
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Blue));

    let lines = vec![
      Line::from(Span::styled(
        self.image.description.clone(),
        Style::default().fg(Color::White).bold(),
      )),
      Line::raw(""),
      Self::field("Likes", self.image.likes.to_string(), Color::Magenta),
      Self::field("Thumbnail", self.image.thumb_url.clone(), Color::Cyan),
      Self::field("Full size", self.image.full_url.clone(), Color::Cyan),
    ];

    let paragraph = Paragraph::new(lines)
      .block(block)
      .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
  }

  fn breadcrumb_label(&self) -> String {
    self.image.id.clone()
  }
}
