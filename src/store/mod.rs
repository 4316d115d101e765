//! Persistence module split across logical submodules.

mod error;
mod json;
mod paths;

pub use error::StoreError;
pub use json::JsonStore;
pub use paths::{default_data_dir, default_library_path, default_log_dir};
