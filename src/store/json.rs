use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::ser::PrettyFormatter;

use crate::models::Book;

use super::StoreError;

/// Suffix of the scratch file written next to the library before it is
/// renamed into place.
const TEMP_SUFFIX: &str = ".tmp";

/// Flat-file store holding the whole library as one pretty-printed JSON array.
#[derive(Debug, Clone)]
pub struct JsonStore {
    path: PathBuf,
}

impl JsonStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read every book from disk. A missing file is a fresh library, not an
    /// error.
    pub fn load(&self) -> Result<Vec<Book>, StoreError> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "no library file yet");
                return Ok(Vec::new());
            }
            Err(err) => return Err(StoreError::io(&self.path, err)),
        };

        let books: Vec<Book> =
            serde_json::from_reader(BufReader::new(file)).map_err(|source| {
                if source.is_io() {
                    StoreError::io(&self.path, io::Error::from(source))
                } else {
                    StoreError::Parse {
                        path: self.path.clone(),
                        source,
                    }
                }
            })?;

        tracing::debug!(path = %self.path.display(), count = books.len(), "library loaded");
        Ok(books)
    }

    /// Overwrite the library file with `books`. The data lands in a sibling
    /// scratch file first and is renamed over the target, so a reader sees
    /// either the old or the new contents.
    pub fn save(&self, books: &[Book]) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|err| StoreError::io(parent, err))?;
            }
        }

        let temp_path = self.temp_path()?;
        let result = write_books(&temp_path, books).and_then(|()| {
            fs::rename(&temp_path, &self.path).map_err(|err| StoreError::io(&self.path, err))
        });

        if result.is_err() {
            // Leftover scratch file is harmless but untidy.
            let _ = fs::remove_file(&temp_path);
        } else {
            tracing::debug!(path = %self.path.display(), count = books.len(), "library saved");
        }
        result
    }

    fn temp_path(&self) -> Result<PathBuf, StoreError> {
        let Some(file_name) = self.path.file_name() else {
            return Err(StoreError::io(
                &self.path,
                io::Error::new(io::ErrorKind::InvalidInput, "library path has no file name"),
            ));
        };
        let mut temp_name = OsString::from(file_name);
        temp_name.push(TEMP_SUFFIX);
        Ok(self.path.with_file_name(temp_name))
    }
}

fn write_books(path: &Path, books: &[Book]) -> Result<(), StoreError> {
    let file = File::create(path).map_err(|err| StoreError::io(path, err))?;
    let mut writer = BufWriter::new(file);

    let mut serializer =
        serde_json::Serializer::with_formatter(&mut writer, PrettyFormatter::with_indent(b"    "));
    books
        .serialize(&mut serializer)
        .map_err(|source| StoreError::Serialize { source })?;
    writer
        .write_all(b"\n")
        .map_err(|err| StoreError::io(path, err))?;

    let file = writer
        .into_inner()
        .map_err(|err| StoreError::io(path, err.into_error()))?;
    file.sync_all().map_err(|err| StoreError::io(path, err))
}
