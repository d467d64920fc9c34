use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph};

use crate::engine::Engine;
use crate::ui::ensure_valid_selection;
use crate::ui::view::{ShortcutInfo, View, ViewAction};

/// Past search terms, most recent first. Enter re-runs the selected one.
#[derive(Default)]
pub struct HistoryView {
  list_state: ListState,
}

impl HistoryView {
  pub fn new() -> Self {
    Self::default()
  }

  fn rerun_selected(&self, engine: &mut Engine) -> ViewAction {
    let Some(term) = self
      .list_state
      .selected()
      .and_then(|idx| engine.history().get(idx))
      .cloned()
    else {
      return ViewAction::None;
    };

    engine.reset_images();
    engine.fetch_page(Some(&term), 1);
    ViewAction::Pop
  }
}

impl View for HistoryView {
  fn handle_key(&mut self, key: KeyEvent, engine: &mut Engine) -> ViewAction {
    match key.code {
      KeyCode::Char('j') | KeyCode::Down => {
        self.list_state.select_next();
        ViewAction::None
      }
      KeyCode::Char('k') | KeyCode::Up => {
        self.list_state.select_previous();
        ViewAction::None
      }
      KeyCode::Enter => self.rerun_selected(engine),
      KeyCode::Char('q') | KeyCode::Esc => ViewAction::Pop,
      _ => ViewAction::None,
    }
  }

  fn scroll(&mut self, delta: i32) {
    if delta > 0 {
      self.list_state.select_next();
    } else if delta < 0 {
      self.list_state.select_previous();
    }
  }

  fn render(&mut self, frame: &mut Frame, area: Rect, engine: &Engine) {
    let history = engine.history();
    ensure_valid_selection(&mut self.list_state, history.len());

    let block = Block::default()
      .title(format!(" Search history ({}) ", history.len()))
      .title_alignment(Alignment::Center)
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Blue));

    if history.is_empty() {
      let paragraph = Paragraph::new("No searches yet. Press '/' in the gallery to search.")
        .block(block)
        .style(Style::default().fg(Color::DarkGray));
      frame.render_widget(paragraph, area);
      return;
    }

    let items: Vec<ListItem> = history
      .iter()
      .map(|term| ListItem::new(Line::from(term.as_str())))
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

  fn breadcrumb_label(&self) -> String {
    "History".to_string()
  }

  fn shortcuts(&self) -> Vec<ShortcutInfo> {
    vec![
      ShortcutInfo::new("enter", "search again").with_priority(10),
      ShortcutInfo::new("q", "back").with_priority(90),
    ]
  }
}
