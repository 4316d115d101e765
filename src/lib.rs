//! Core library surface for the Personal Library Manager.
//!
//! The catalog, store and statistics modules hold all of the logic and can be
//! used without the terminal front-end; `ui` is a thin shell over them.
pub mod catalog;
pub mod config;
pub mod logging;
pub mod models;
pub mod stats;
pub mod store;
pub mod ui;

pub use catalog::{Change, Library, SearchField, WritePolicy};
pub use config::Config;
pub use models::{Book, BookId, Genre, NewBook, PublicationYear};
pub use stats::{compute_statistics, Stats};
pub use store::{JsonStore, StoreError};

/// The interactive application entry point and state container.
pub use ui::{run_app, App};
