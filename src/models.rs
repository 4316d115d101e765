//! Domain models persisted to the library file and passed throughout the TUI.
//! The types stay light-weight data holders so the catalog can focus on
//! ordering and persistence while the UI focuses on presentation.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Format used for `added_date`, e.g. `2024-03-01 18:04:55`.
pub const ADDED_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Stable identifier assigned to a book when it enters the library. Unlike the
/// position in the list it never changes when other books are removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BookId(pub u64);

impl BookId {
    /// Ids start at one; zero marks a record written without an id.
    pub fn is_unassigned(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for BookId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Publication year as stored on disk. The form only ever produces numbers,
/// but a hand-edited file may contain text, floats or `null`; whatever was
/// written survives a save unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PublicationYear {
    Year(i64),
    Text(String),
    Other(Value),
}

impl PublicationYear {
    /// Interpret the value as an integer year, if possible. Floats count only
    /// when they have no fractional part.
    pub fn as_year(&self) -> Option<i64> {
        match self {
            PublicationYear::Year(year) => Some(*year),
            PublicationYear::Text(text) => text.trim().parse().ok(),
            PublicationYear::Other(Value::Number(number)) => number
                .as_f64()
                .filter(|f| f.fract() == 0.0 && *f >= i64::MIN as f64 && *f < i64::MAX as f64)
                .map(|f| f as i64),
            PublicationYear::Other(_) => None,
        }
    }
}

impl From<i64> for PublicationYear {
    fn from(year: i64) -> Self {
        PublicationYear::Year(year)
    }
}

impl From<i32> for PublicationYear {
    fn from(year: i32) -> Self {
        PublicationYear::Year(i64::from(year))
    }
}

impl fmt::Display for PublicationYear {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PublicationYear::Year(year) => write!(f, "{year}"),
            PublicationYear::Text(text) => write!(f, "{text}"),
            PublicationYear::Other(Value::Null) => f.write_str("unknown"),
            PublicationYear::Other(value) => write!(f, "{value}"),
        }
    }
}

/// Genres offered by the add-book form. Books store the genre as text so a
/// hand-edited value outside this list is still accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Genre {
    #[default]
    Fiction,
    NonFiction,
    Science,
    Technology,
    Fantasy,
    Romance,
    History,
    Thriller,
    Psychology,
    Philosophy,
    Biographies,
}

impl Genre {
    pub const ALL: [Genre; 11] = [
        Genre::Fiction,
        Genre::NonFiction,
        Genre::Science,
        Genre::Technology,
        Genre::Fantasy,
        Genre::Romance,
        Genre::History,
        Genre::Thriller,
        Genre::Psychology,
        Genre::Philosophy,
        Genre::Biographies,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Genre::Fiction => "Fiction",
            Genre::NonFiction => "Non-Fiction",
            Genre::Science => "Science",
            Genre::Technology => "Technology",
            Genre::Fantasy => "Fantasy",
            Genre::Romance => "Romance",
            Genre::History => "History",
            Genre::Thriller => "Thriller",
            Genre::Psychology => "Psychology",
            Genre::Philosophy => "Philosophy",
            Genre::Biographies => "Biographies",
        }
    }

    /// Step through `ALL`, wrapping at both ends. Used by the form's genre
    /// picker.
    pub fn cycle(self, offset: isize) -> Genre {
        let len = Genre::ALL.len() as isize;
        let idx = Genre::ALL.iter().position(|g| *g == self).unwrap_or(0) as isize;
        Genre::ALL[(idx + offset).rem_euclid(len) as usize]
    }
}

impl fmt::Display for Genre {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single book record as persisted in the library file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    /// Missing in files written before ids existed; the catalog assigns one
    /// on load.
    #[serde(default)]
    pub id: BookId,
    pub title: String,
    pub author: String,
    pub publication_year: PublicationYear,
    pub genre: String,
    pub read_status: bool,
    /// Creation timestamp in [`ADDED_DATE_FORMAT`]. Never rewritten.
    pub added_date: String,
}

impl Book {
    /// `Title by Author (Year)`, the one-line form used by search results.
    pub fn display_line(&self) -> String {
        format!("{} by {} ({})", self.title, self.author, self.publication_year)
    }

    pub fn status_label(&self) -> &'static str {
        if self.read_status {
            "Read"
        } else {
            "Unread"
        }
    }
}

/// Caller-supplied fields for a book that has not been added yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBook {
    pub title: String,
    pub author: String,
    pub publication_year: PublicationYear,
    pub genre: String,
    pub read_status: bool,
}

impl NewBook {
    pub fn new(
        title: impl Into<String>,
        author: impl Into<String>,
        publication_year: impl Into<PublicationYear>,
        genre: impl Into<String>,
        read_status: bool,
    ) -> Self {
        Self {
            title: title.into(),
            author: author.into(),
            publication_year: publication_year.into(),
            genre: genre.into(),
            read_status,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn publication_year_accepts_numbers_and_text() {
        let parsed: Vec<PublicationYear> =
            serde_json::from_str(r#"[1965, "1949", "unknown"]"#).unwrap();
        assert_eq!(parsed[0], PublicationYear::Year(1965));
        assert_eq!(parsed[1].as_year(), Some(1949));
        assert_eq!(parsed[2].as_year(), None);
        assert_eq!(
            serde_json::to_string(&parsed).unwrap(),
            r#"[1965,"1949","unknown"]"#
        );
    }

    #[test]
    fn genre_cycle_wraps() {
        assert_eq!(Genre::Fiction.cycle(-1), Genre::Biographies);
        assert_eq!(Genre::Biographies.cycle(1), Genre::Fiction);
        assert_eq!(Genre::Fiction.cycle(1), Genre::NonFiction);
    }

    #[test]
    fn publication_year_keeps_floats_and_null() {
        let parsed: Vec<PublicationYear> =
            serde_json::from_str(r#"[1990.0, 1990.5, null]"#).unwrap();
        assert_eq!(parsed[0].as_year(), Some(1990));
        assert_eq!(parsed[1].as_year(), None);
        assert_eq!(parsed[2].as_year(), None);
        assert_eq!(parsed[2].to_string(), "unknown");
        assert_eq!(
            serde_json::to_string(&parsed).unwrap(),
            r#"[1990.0,1990.5,null]"#
        );
    }

    #[test]
    fn genre_default_is_fiction() {
        assert_eq!(Genre::default(), Genre::Fiction);
        assert_eq!(Genre::NonFiction.to_string(), "Non-Fiction");
    }

    #[test]
    fn book_without_id_deserializes_as_unassigned() {
        let book: Book = serde_json::from_str(
            r#"{"title":"Dune","author":"Herbert","publication_year":1965,
                "genre":"Science","read_status":true,"added_date":"2024-01-01 10:00:00"}"#,
        )
        .unwrap();
        assert!(book.id.is_unassigned());
        assert_eq!(book.display_line(), "Dune by Herbert (1965)");
    }
}
