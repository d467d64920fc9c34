pub mod components;
pub mod renderfns;
pub mod view;
pub mod views;

use crate::app::App;
use components::draw_footer;
use ratatui::prelude::*;
use ratatui::widgets::ListState;
use renderfns::draw_header;

/// Main draw function
pub fn draw(frame: &mut Frame, app: &mut App) {
  let chunks = Layout::default()
    .direction(Direction::Vertical)
    .constraints([
      Constraint::Length(1), // Header
      Constraint::Min(1),    // Main content
      Constraint::Length(1), // Footer
    ])
    .split(frame.area());

  let shortcuts = app
    .current_view()
    .map(|view| view.shortcuts())
    .unwrap_or_default();
  draw_header(frame, chunks[0], app.api_url(), &shortcuts);

  let breadcrumb = app.view_breadcrumb();
  let (view, engine) = app.view_and_engine();
  if let Some(view) = view {
    view.render(frame, chunks[1], engine);
  }

  draw_footer(frame, chunks[2], &breadcrumb, app.engine().state());
}

/// Keep the selection inside `0..len`, selecting the first row when nothing is
pub fn ensure_valid_selection(state: &mut ListState, len: usize) {
  if len == 0 {
    state.select(None);
    return;
  }
  match state.selected() {
    None => state.select(Some(0)),
    Some(idx) if idx >= len => state.select(Some(len - 1)),
    Some(_) => {}
  }
}
