use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failures while reading or writing the library file. None of them are
/// fatal: the catalog keeps its in-memory state and the UI reports them.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("could not access library file `{}`: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("library file `{}` is malformed: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("could not serialize library: {source}")]
    Serialize {
        #[source]
        source: serde_json::Error,
    },
}

impl StoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        StoreError::Io {
            path: path.into(),
            source,
        }
    }
}
