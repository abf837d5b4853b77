//! Terminal front end: the key-driven [`App`] and the crossterm event loop.

mod app;
mod forms;
mod helpers;
mod terminal;

pub use app::App;
pub use terminal::run_app;
