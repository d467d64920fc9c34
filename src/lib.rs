//! Terminal photo browser for the Unsplash API.
//!
//! The engine half (`cache`, `history`, `unsplash`, `engine`, `scroll`,
//! `debounce`) has no terminal dependency; `app`, `event` and `ui` drive it
//! from a ratatui front end.

pub mod app;
pub mod cache;
pub mod config;
pub mod db;
pub mod debounce;
pub mod engine;
pub mod event;
pub mod history;
pub mod scroll;
pub mod ui;
pub mod unsplash;
