use anyhow::{anyhow, Context, Result};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

use crate::models::{Book, BookId, Genre, NewBook, PublicationYear};

/// Longest title or author the form accepts.
const MAX_TEXT_CHARS: usize = 100;
/// Year the form starts out with.
const DEFAULT_YEAR: i64 = 2023;
/// Oldest publication year the form accepts.
pub(crate) const MIN_YEAR: i64 = 1000;

/// Fields of the add-book form, in focus order.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
pub(crate) enum BookField {
    #[default]
    Title,
    Author,
    Year,
    Genre,
    Read,
}

impl BookField {
    const ORDER: [BookField; 5] = [
        BookField::Title,
        BookField::Author,
        BookField::Year,
        BookField::Genre,
        BookField::Read,
    ];

    fn step(self, offset: isize) -> BookField {
        let len = Self::ORDER.len() as isize;
        let idx = Self::ORDER.iter().position(|f| *f == self).unwrap_or(0) as isize;
        Self::ORDER[(idx + offset).rem_euclid(len) as usize]
    }

    pub(crate) fn row(self) -> u16 {
        Self::ORDER.iter().position(|f| *f == self).unwrap_or(0) as u16
    }

    pub(crate) fn label(self) -> &'static str {
        match self {
            BookField::Title => "Book Title",
            BookField::Author => "Author",
            BookField::Year => "Publication Year",
            BookField::Genre => "Genre",
            BookField::Read => "Have you read this book?",
        }
    }
}

/// State of the add-book form, including author autocomplete tracking.
#[derive(Clone, Debug)]
pub(crate) struct BookForm {
    pub(crate) title: String,
    pub(crate) author: String,
    pub(crate) year: String,
    pub(crate) genre: Genre,
    pub(crate) read: bool,
    pub(crate) active: BookField,
    pub(crate) error: Option<String>,
    pub(crate) suggestion: Option<String>,
    pub(crate) autocomplete_disabled: bool,
}

impl Default for BookForm {
    fn default() -> Self {
        Self {
            title: String::new(),
            author: String::new(),
            year: DEFAULT_YEAR.to_string(),
            genre: Genre::default(),
            read: true,
            active: BookField::Title,
            error: None,
            suggestion: None,
            autocomplete_disabled: false,
        }
    }
}

impl BookForm {
    pub(crate) fn next_field(&mut self) {
        self.active = self.active.step(1);
        self.clear_suggestion();
    }

    pub(crate) fn previous_field(&mut self) {
        self.active = self.active.step(-1);
        self.clear_suggestion();
    }

    /// Insert a character into the active field. Space flips the read flag
    /// when that field has focus.
    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        if ch.is_control() {
            return false;
        }
        match self.active {
            BookField::Title => push_limited(&mut self.title, ch),
            BookField::Author => {
                self.autocomplete_disabled = false;
                push_limited(&mut self.author, ch)
            }
            BookField::Year => {
                if ch.is_ascii_digit() && self.year.len() < 4 {
                    self.year.push(ch);
                    true
                } else {
                    false
                }
            }
            BookField::Genre => false,
            BookField::Read => {
                if ch == ' ' {
                    self.read = !self.read;
                    true
                } else {
                    false
                }
            }
        }
    }

    pub(crate) fn backspace(&mut self) {
        match self.active {
            BookField::Title => {
                self.title.pop();
            }
            BookField::Author => {
                self.author.pop();
                self.autocomplete_disabled = false;
            }
            BookField::Year => {
                self.year.pop();
            }
            BookField::Genre | BookField::Read => {}
        }
    }

    /// Left/Right on the picker fields.
    pub(crate) fn adjust(&mut self, offset: isize) {
        match self.active {
            BookField::Genre => self.genre = self.genre.cycle(offset),
            BookField::Read => self.read = !self.read,
            _ => {}
        }
    }

    /// Validate the inputs and build the record handed to the catalog.
    pub(crate) fn parse_inputs(&self, current_year: i64) -> Result<NewBook> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(anyhow!("Book title is required."));
        }
        let author = self.author.trim();
        if author.is_empty() {
            return Err(anyhow!("Author is required."));
        }
        let year_raw = self.year.trim();
        if year_raw.is_empty() {
            return Err(anyhow!("Publication year is required."));
        }
        let year = year_raw
            .parse::<i64>()
            .context("Publication year must be a number.")?;
        if !(MIN_YEAR..=current_year).contains(&year) {
            return Err(anyhow!(
                "Publication year must be between {MIN_YEAR} and {current_year}."
            ));
        }

        Ok(NewBook {
            title: title.to_string(),
            author: author.to_string(),
            publication_year: PublicationYear::Year(year),
            genre: self.genre.as_str().to_string(),
            read_status: self.read,
        })
    }

    /// Suggest an existing author whose name starts with what was typed.
    pub(crate) fn update_suggestion(&mut self, authors: &[String]) {
        if self.active != BookField::Author
            || self.autocomplete_disabled
            || self.author.chars().count() < 2
        {
            self.clear_suggestion();
            return;
        }

        let current_lower = self.author.to_lowercase();
        self.suggestion = authors
            .iter()
            .find(|candidate| candidate.to_lowercase().starts_with(&current_lower))
            .filter(|candidate| candidate.to_lowercase() != current_lower)
            .cloned();
    }

    pub(crate) fn has_active_suggestion(&self) -> bool {
        self.active == BookField::Author && self.suggestion.is_some()
    }

    pub(crate) fn accept_suggestion(&mut self) -> bool {
        if self.suggestion_suffix().is_none() {
            return false;
        }
        match self.suggestion.take() {
            Some(candidate) => {
                self.author = candidate;
                self.autocomplete_disabled = true;
                true
            }
            None => false,
        }
    }

    /// Dismiss the suggestion for the rest of this entry.
    pub(crate) fn cancel_autocomplete(&mut self) -> bool {
        if self.has_active_suggestion() {
            self.autocomplete_disabled = true;
            self.suggestion = None;
            return true;
        }
        false
    }

    fn clear_suggestion(&mut self) {
        self.suggestion = None;
    }

    /// Remaining characters of the suggestion, shown ghosted after the input.
    pub(crate) fn suggestion_suffix(&self) -> Option<String> {
        let candidate = self.suggestion.as_ref()?;
        let suffix: String = candidate.chars().skip(self.author.chars().count()).collect();
        if suffix.is_empty() {
            None
        } else {
            Some(suffix)
        }
    }

    pub(crate) fn build_line(&self, field: BookField) -> Line<'static> {
        let is_active = self.active == field;
        let active_style = Style::default().fg(Color::Yellow);
        let mut spans = vec![Span::raw(format!("{}: ", field.label()))];

        match field {
            BookField::Title | BookField::Author | BookField::Year => {
                let value = match field {
                    BookField::Title => &self.title,
                    BookField::Author => &self.author,
                    _ => &self.year,
                };
                if value.is_empty() {
                    let style = if is_active {
                        active_style
                    } else {
                        Style::default().fg(Color::DarkGray)
                    };
                    spans.push(Span::styled("<required>", style));
                } else {
                    let style = if is_active {
                        active_style
                    } else {
                        Style::default()
                    };
                    spans.push(Span::styled(value.clone(), style));
                }
                if field == BookField::Author && is_active {
                    if let Some(suffix) = self.suggestion_suffix() {
                        spans.push(Span::styled(suffix, Style::default().fg(Color::DarkGray)));
                    }
                }
            }
            BookField::Genre => {
                let style = if is_active {
                    active_style.add_modifier(Modifier::BOLD)
                } else {
                    Style::default()
                };
                spans.push(Span::styled(format!("< {} >", self.genre), style));
            }
            BookField::Read => {
                let (yes, no) = if self.read {
                    ("(x) Yes", "( ) No")
                } else {
                    ("( ) Yes", "(x) No")
                };
                let style = if is_active {
                    active_style
                } else {
                    Style::default()
                };
                spans.push(Span::styled(format!("{yes}   {no}"), style));
            }
        }

        Line::from(spans)
    }

    /// Character length of a text field, used to place the cursor.
    pub(crate) fn value_len(&self, field: BookField) -> Option<usize> {
        match field {
            BookField::Title => Some(self.title.chars().count()),
            BookField::Author => Some(self.author.chars().count()),
            BookField::Year => Some(self.year.chars().count()),
            BookField::Genre | BookField::Read => None,
        }
    }
}

fn push_limited(value: &mut String, ch: char) -> bool {
    if value.chars().count() >= MAX_TEXT_CHARS {
        return false;
    }
    value.push(ch);
    true
}

/// State for confirming the removal of a book.
#[derive(Clone, Debug)]
pub(crate) struct ConfirmRemove {
    pub(crate) id: BookId,
    pub(crate) title: String,
    pub(crate) author: String,
}

impl ConfirmRemove {
    pub(crate) fn from(book: &Book) -> Self {
        Self {
            id: book.id,
            title: book.title.clone(),
            author: book.author.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled() -> BookForm {
        BookForm {
            title: " Dune ".into(),
            author: "Frank Herbert".into(),
            year: "1965".into(),
            genre: Genre::Science,
            ..BookForm::default()
        }
    }

    #[test]
    fn parse_trims_and_builds_new_book() {
        let book = filled().parse_inputs(2026).unwrap();
        assert_eq!(book.title, "Dune");
        assert_eq!(book.publication_year, PublicationYear::Year(1965));
        assert_eq!(book.genre, "Science");
        assert!(book.read_status);
    }

    #[test]
    fn year_outside_range_is_rejected() {
        let mut form = filled();
        form.year = "999".into();
        assert!(form.parse_inputs(2026).is_err());
        form.year = "2027".into();
        let err = form.parse_inputs(2026).unwrap_err();
        assert_eq!(err.to_string(), "Publication year must be between 1000 and 2026.");
    }

    #[test]
    fn missing_title_is_rejected() {
        let mut form = filled();
        form.title = "   ".into();
        assert_eq!(
            form.parse_inputs(2026).unwrap_err().to_string(),
            "Book title is required."
        );
    }

    #[test]
    fn year_field_only_takes_four_digits() {
        let mut form = BookForm {
            active: BookField::Year,
            year: String::new(),
            ..BookForm::default()
        };
        for ch in "19x651".chars() {
            form.push_char(ch);
        }
        assert_eq!(form.year, "1965");
    }

    #[test]
    fn author_suggestion_accepts_existing_name() {
        let authors = vec!["Frank Herbert".to_string(), "George Orwell".to_string()];
        let mut form = BookForm {
            active: BookField::Author,
            author: "geo".into(),
            ..BookForm::default()
        };
        form.update_suggestion(&authors);

        assert_eq!(form.suggestion_suffix().as_deref(), Some("rge Orwell"));
        assert!(form.accept_suggestion());
        assert_eq!(form.author, "George Orwell");

        form.update_suggestion(&authors);
        assert!(form.suggestion.is_none());
    }

    #[test]
    fn space_toggles_read_and_arrows_cycle_genre() {
        let mut form = BookForm {
            active: BookField::Read,
            ..BookForm::default()
        };
        assert!(form.push_char(' '));
        assert!(!form.read);

        form.previous_field();
        form.adjust(-1);
        assert_eq!(form.genre, Genre::Biographies);
    }
}
