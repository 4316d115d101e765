//! Ratatui front-end: a sidebar with the four views (library list, add-book
//! form, search, statistics) over the session's [`Library`](crate::Library).

mod app;
mod forms;
mod helpers;
mod screens;
mod terminal;

pub use app::App;
pub use terminal::run_app;
