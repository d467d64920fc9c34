use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph};

use crate::debounce::Debouncer;
use crate::engine::Engine;
use crate::scroll::ScrollTrigger;
use crate::ui::components::{SearchInput, SearchResult};
use crate::ui::ensure_valid_selection;
use crate::ui::renderfns::{format_likes, truncate};
use crate::ui::view::{ShortcutInfo, View, ViewAction};
use crate::ui::views::{HistoryView, PhotoView};

/// Root view: the accumulated photo list with search and infinite scroll
pub struct GalleryView {
  list_state: ListState,
  search: SearchInput,
  debouncer: Debouncer<String>,
  /// Watches the last row; keyed by its position and photo id
  trigger: ScrollTrigger<(usize, String)>,
  /// List rows that fit in the viewport at the last render
  viewport_rows: usize,
  /// Engine reset count this view last synced with
  seen_resets: u64,
}

impl GalleryView {
  pub fn new(debounce: Duration) -> Self {
    Self {
      list_state: ListState::default(),
      search: SearchInput::new(),
      debouncer: Debouncer::new(debounce),
      trigger: ScrollTrigger::new(),
      viewport_rows: 0,
      seen_resets: 0,
    }
  }

  fn start_search(&mut self, term: &str, engine: &mut Engine) {
    engine.reset_images();
    engine.fetch_page(Some(term), 1);
  }

  /// A reset from any view starts a new result set: old sentinels and the
  /// scroll position no longer apply
  fn sync_resets(&mut self, engine: &Engine) {
    if engine.resets() != self.seen_resets {
      self.seen_resets = engine.resets();
      self.trigger.reset();
      self.list_state = ListState::default();
    }
  }

  /// Whether the last row is inside the viewport
  fn sentinel_visible(&self, len: usize) -> bool {
    if len == 0 || self.viewport_rows == 0 {
      return false;
    }
    len - 1 < self.list_state.offset() + self.viewport_rows
  }

  fn render_list(&mut self, frame: &mut Frame, area: Rect, engine: &Engine) {
    let state = engine.state();
    ensure_valid_selection(&mut self.list_state, state.items.len());

    let title = if state.loading && state.items.is_empty() {
      format!(" Photos [{}] (loading...) ", state.label())
    } else {
      format!(" Photos [{}] ({}) ", state.label(), state.items.len())
    };

    let block = Block::default()
      .title(title)
      .title_alignment(Alignment::Center)
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Blue));

    self.viewport_rows = block.inner(area).height as usize;

    if state.items.is_empty() {
      let content = if state.loading {
        "Loading photos..."
      } else if state.rate_limited {
        "API limit reached. Start a new search with '/' once the quota resets."
      } else if state.error.is_some() {
        "Failed to load photos. Press 'r' to retry."
      } else {
        "No photos found."
      };
      let paragraph = Paragraph::new(content)
        .block(block)
        .style(Style::default().fg(Color::DarkGray));
      frame.render_widget(paragraph, area);
      return;
    }

    let desc_width = (area.width as usize).saturating_sub(24);
    let items: Vec<ListItem> = state
      .items
      .iter()
      .map(|image| {
        let line = Line::from(vec![
          Span::styled(
            format!("{:>7} ", format_likes(image.likes)),
            Style::default().fg(Color::Magenta),
          ),
          Span::styled("♥ ", Style::default().fg(Color::Red)),
          Span::raw(truncate(&image.description, desc_width)),
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

  // Key handling helpers for or_else chain pattern
  fn handle_search(&mut self, key: KeyEvent, engine: &mut Engine) -> Option<ViewAction> {
    match self.search.handle_key(key) {
      SearchResult::NotHandled => None,
      SearchResult::Active => Some(ViewAction::None),
      SearchResult::Changed(query) => {
        self.debouncer.push(query);
        Some(ViewAction::None)
      }
      SearchResult::Submitted(_) => {
        if let Some(term) = self.debouncer.flush() {
          self.start_search(&term, engine);
        }
        Some(ViewAction::None)
      }
      SearchResult::Cancelled => {
        self.debouncer.cancel();
        Some(ViewAction::None)
      }
    }
  }

  fn handle_navigation(&mut self, key: KeyEvent) -> Option<ViewAction> {
    match key.code {
      KeyCode::Char('j') | KeyCode::Down => {
        self.list_state.select_next();
        Some(ViewAction::None)
      }
      KeyCode::Char('k') | KeyCode::Up => {
        self.list_state.select_previous();
        Some(ViewAction::None)
      }
      KeyCode::Char('g') | KeyCode::Home => {
        self.list_state.select_first();
        Some(ViewAction::None)
      }
      KeyCode::Char('G') | KeyCode::End => {
        self.list_state.select_last();
        Some(ViewAction::None)
      }
      _ => None,
    }
  }

  fn handle_actions(&mut self, key: KeyEvent, engine: &mut Engine) -> Option<ViewAction> {
    match key.code {
      KeyCode::Char('r') => {
        engine.retry();
        Some(ViewAction::None)
      }
      KeyCode::Char('b') => {
        self.search = SearchInput::new();
        self.debouncer.cancel();
        self.start_search("", engine);
        Some(ViewAction::None)
      }
      KeyCode::Char('h') => Some(ViewAction::Push(Box::new(HistoryView::new()))),
      KeyCode::Enter => {
        let idx = self.list_state.selected()?;
        let image = engine.state().items.get(idx)?;
        Some(ViewAction::Push(Box::new(PhotoView::new(image.clone()))))
      }
      KeyCode::Char('q') | KeyCode::Esc => Some(ViewAction::Quit),
      _ => None,
    }
  }
}

impl View for GalleryView {
  fn handle_key(&mut self, key: KeyEvent, engine: &mut Engine) -> ViewAction {
    self
      .handle_search(key, engine)
      .or_else(|| self.handle_navigation(key))
      .or_else(|| self.handle_actions(key, engine))
      .unwrap_or(ViewAction::None)
  }

  fn scroll(&mut self, delta: i32) {
    for _ in 0..delta.unsigned_abs() {
      if delta > 0 {
        self.list_state.select_next();
      } else {
        self.list_state.select_previous();
      }
    }
  }

  fn render(&mut self, frame: &mut Frame, area: Rect, engine: &Engine) {
    self.sync_resets(engine);
    self.render_list(frame, area, engine);
    // Let search component render its overlay
    self.search.render_overlay(frame, area);
  }

  fn breadcrumb_label(&self) -> String {
    "Gallery".to_string()
  }

  fn tick(&mut self, engine: &mut Engine) {
    if let Some(term) = self.debouncer.poll() {
      self.start_search(&term, engine);
    }
    self.sync_resets(engine);

    let state = engine.state();
    let sentinel = state.last_row();
    let visible = self.sentinel_visible(state.items.len());
    self.trigger.observe(sentinel.as_ref(), state.can_fetch_more());

    if let Some(sentinel) = sentinel {
      self.trigger.visibility_changed(&sentinel, visible, || {
        engine.fetch_more();
      });
    }
  }

  fn shortcuts(&self) -> Vec<ShortcutInfo> {
    vec![
      ShortcutInfo::new("/", "search").with_priority(10),
      ShortcutInfo::new("b", "browse").with_priority(20),
      ShortcutInfo::new("h", "history").with_priority(30),
      ShortcutInfo::new("r", "retry").with_priority(40),
      ShortcutInfo::new("enter", "details").with_priority(50),
      ShortcutInfo::new("q", "quit").with_priority(90),
    ]
  }
}
