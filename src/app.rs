use crate::config::Config;
use crate::engine::Engine;
use crate::event::{Event, EventHandler};
use crate::ui;
use crate::ui::view::{View, ViewAction};
use crate::ui::views::GalleryView;
use color_eyre::Result;
use crossterm::event::{DisableMouseCapture, EnableMouseCapture, KeyCode, KeyModifiers};
use crossterm::terminal::{
  disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::ExecutableCommand;
use ratatui::prelude::*;
use std::io::stdout;
use std::time::Duration;
use tracing::info;

/// Main application state
pub struct App {
  /// Navigation stack - root is always the gallery at index 0
  view_stack: Vec<Box<dyn View>>,

  /// The single owner of fetched photos and search history
  engine: Engine,

  /// Application configuration
  config: Config,

  /// Whether to quit
  should_quit: bool,
}

impl App {
  pub fn new(config: Config, engine: Engine) -> Self {
    let gallery = GalleryView::new(config.debounce());
    Self {
      view_stack: vec![Box::new(gallery)],
      engine,
      config,
      should_quit: false,
    }
  }

  pub async fn run(&mut self, initial_search: Option<String>) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    stdout().execute(EnableMouseCapture)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    let result = self.main_loop(&mut terminal, initial_search).await;

    // Cleanup terminal even if the loop failed
    disable_raw_mode()?;
    stdout().execute(DisableMouseCapture)?;
    stdout().execute(LeaveAlternateScreen)?;

    result
  }

  async fn main_loop(
    &mut self,
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    initial_search: Option<String>,
  ) -> Result<()> {
    let mut events = EventHandler::new(Duration::from_millis(100));

    // Initial data load: browse, or the search given on the command line
    self.engine.fetch_page(initial_search.as_deref(), 1);

    while !self.should_quit {
      self.tick();

      // Draw UI
      terminal.draw(|frame| ui::draw(frame, self))?;

      // Handle events
      match events.next().await {
        Some(event) => self.handle_event(event),
        None => break,
      }
    }

    info!("shutting down");
    Ok(())
  }

  /// Commit finished fetches, then let the visible view react to them
  fn tick(&mut self) {
    self.engine.poll();
    if let Some(view) = self.view_stack.last_mut() {
      view.tick(&mut self.engine);
    }
  }

  fn handle_event(&mut self, event: Event) {
    match event {
      Event::Key(key) => {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
          self.should_quit = true;
          return;
        }
        let action = match self.view_stack.last_mut() {
          Some(view) => view.handle_key(key, &mut self.engine),
          None => ViewAction::Quit,
        };
        self.apply(action);
      }
      Event::Scroll(delta) => {
        if let Some(view) = self.view_stack.last_mut() {
          view.scroll(delta);
        }
      }
      // Redraw happens on the next loop iteration
      Event::Resize | Event::Tick => {}
    }
  }

  fn apply(&mut self, action: ViewAction) {
    match action {
      ViewAction::None => {}
      ViewAction::Push(view) => self.view_stack.push(view),
      ViewAction::Pop => {
        if self.view_stack.len() > 1 {
          self.view_stack.pop();
        } else {
          self.should_quit = true;
        }
      }
      ViewAction::Quit => self.should_quit = true,
    }
  }

  // Accessors for UI rendering
  pub fn current_view(&self) -> Option<&dyn View> {
    self.view_stack.last().map(|view| view.as_ref())
  }

  /// The top view together with the engine it renders from
  pub fn view_and_engine(&mut self) -> (Option<&mut Box<dyn View>>, &Engine) {
    (self.view_stack.last_mut(), &self.engine)
  }

  pub fn engine(&self) -> &Engine {
    &self.engine
  }

  pub fn api_url(&self) -> &str {
    &self.config.api.url
  }

  pub fn view_breadcrumb(&self) -> Vec<String> {
    self
      .view_stack
      .iter()
      .map(|v| v.breadcrumb_label())
      .collect()
  }
}
