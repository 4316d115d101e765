//! The in-memory library and the operations the UI drives: add, remove,
//! search and flush. Every book carries a stable [`BookId`]; positions are
//! only used for display order.

use std::collections::HashSet;
use std::fmt;

use chrono::Local;

use crate::models::{Book, BookId, NewBook, ADDED_DATE_FORMAT};
use crate::stats::{compute_statistics, Stats};
use crate::store::{JsonStore, StoreError};

/// When mutations reach the disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WritePolicy {
    /// Save the whole library after every add or effective remove.
    #[default]
    WriteThrough,
    /// Only mark the library dirty; the caller decides when to `flush`.
    Manual,
}

/// Book field a search matches against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchField {
    #[default]
    Title,
    Author,
    Genre,
}

impl SearchField {
    pub const ALL: [SearchField; 3] = [SearchField::Title, SearchField::Author, SearchField::Genre];

    fn value<'a>(&self, book: &'a Book) -> &'a str {
        match self {
            SearchField::Title => &book.title,
            SearchField::Author => &book.author,
            SearchField::Genre => &book.genre,
        }
    }

    pub fn cycle(self, offset: isize) -> SearchField {
        let len = Self::ALL.len() as isize;
        let idx = Self::ALL.iter().position(|f| *f == self).unwrap_or(0) as isize;
        Self::ALL[(idx + offset).rem_euclid(len) as usize]
    }
}

impl fmt::Display for SearchField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SearchField::Title => "Title",
            SearchField::Author => "Author",
            SearchField::Genre => "Genre",
        })
    }
}

/// Result of a mutation: the operation's value plus the outcome of the save
/// it triggered. A failed save does not undo the in-memory change.
#[derive(Debug)]
#[must_use]
pub struct Change<T> {
    pub value: T,
    pub saved: Result<(), StoreError>,
}

impl<T> Change<T> {
    fn unsaved(value: T) -> Self {
        Self {
            value,
            saved: Ok(()),
        }
    }
}

/// Session state: the ordered book list and the store it is persisted to.
#[derive(Debug)]
pub struct Library {
    books: Vec<Book>,
    store: JsonStore,
    policy: WritePolicy,
    next_id: u64,
    dirty: bool,
}

impl Library {
    /// Load the library from `store`. A load failure is returned alongside an
    /// empty library so the caller can report it and carry on.
    pub fn open(store: JsonStore, policy: WritePolicy) -> (Self, Option<StoreError>) {
        match store.load() {
            Ok(books) => {
                tracing::info!(path = %store.path().display(), count = books.len(), "library opened");
                (Self::with_books(store, policy, books), None)
            }
            Err(err) => {
                tracing::warn!(error = %err, "failed to load library, starting empty");
                (Self::with_books(store, policy, Vec::new()), Some(err))
            }
        }
    }

    /// Build a library from already loaded books. Books without an id, or
    /// sharing one with an earlier book, get a fresh id. When the stored ids
    /// leave no room above them, every book is renumbered from one.
    pub fn with_books(store: JsonStore, policy: WritePolicy, books: Vec<Book>) -> Self {
        let mut library = Self {
            books,
            store,
            policy,
            next_id: 1,
            dirty: false,
        };
        let max_id = library.books.iter().map(|b| b.id.0).max().unwrap_or(0);
        let headroom = library.books.len() as u64 + 1;
        let reassigned = if max_id.checked_add(headroom).is_some() {
            library.next_id = max_id + 1;
            library.assign_missing_ids()
        } else {
            library.renumber()
        };
        if reassigned > 0 {
            tracing::info!(reassigned, "assigned ids to books without a unique id");
        }
        library.dirty = reassigned > 0;
        library
    }

    fn assign_missing_ids(&mut self) -> usize {
        let mut seen = HashSet::new();
        let mut reassigned = 0;
        for book in &mut self.books {
            if book.id.is_unassigned() || !seen.insert(book.id) {
                book.id = BookId(self.next_id);
                seen.insert(book.id);
                self.next_id += 1;
                reassigned += 1;
            }
        }
        reassigned
    }

    /// Give every book the id matching its position, starting at one.
    fn renumber(&mut self) -> usize {
        for (index, book) in self.books.iter_mut().enumerate() {
            book.id = BookId(index as u64 + 1);
        }
        self.next_id = self.books.len() as u64 + 1;
        self.dirty = true;
        tracing::warn!(count = self.books.len(), "book ids exhausted, renumbered library");
        self.books.len()
    }

    fn allocate_id(&mut self) -> BookId {
        if self.next_id == u64::MAX {
            self.renumber();
        }
        let id = BookId(self.next_id);
        self.next_id += 1;
        id
    }

    pub fn books(&self) -> &[Book] {
        &self.books
    }

    pub fn len(&self) -> usize {
        self.books.len()
    }

    pub fn is_empty(&self) -> bool {
        self.books.is_empty()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn policy(&self) -> WritePolicy {
        self.policy
    }

    pub fn get(&self, id: BookId) -> Option<&Book> {
        self.books.iter().find(|b| b.id == id)
    }

    /// Current display position of the book with `id`.
    pub fn position(&self, id: BookId) -> Option<usize> {
        self.books.iter().position(|b| b.id == id)
    }

    /// Append a new book stamped with the current local time.
    pub fn add_book(&mut self, new: NewBook) -> Change<BookId> {
        let id = self.allocate_id();
        let book = Book {
            id,
            title: new.title,
            author: new.author,
            publication_year: new.publication_year,
            genre: new.genre,
            read_status: new.read_status,
            added_date: Local::now().format(ADDED_DATE_FORMAT).to_string(),
        };
        tracing::info!(%id, title = %book.title, author = %book.author, "book added");
        self.books.push(book);

        self.after_mutation(id)
    }

    /// Remove the book with `id`. Unknown ids leave the library untouched
    /// and trigger no save.
    pub fn remove_book(&mut self, id: BookId) -> Change<Option<Book>> {
        match self.position(id) {
            Some(index) => self.remove_at(index),
            None => {
                tracing::debug!(%id, "remove ignored, no such book");
                Change::unsaved(None)
            }
        }
    }

    /// Remove the book at `index`, shifting later books down by one. An
    /// out-of-range index is a silent no-op.
    pub fn remove_at(&mut self, index: usize) -> Change<Option<Book>> {
        if index >= self.books.len() {
            tracing::debug!(index, len = self.books.len(), "remove ignored, index out of range");
            return Change::unsaved(None);
        }

        let book = self.books.remove(index);
        tracing::info!(id = %book.id, title = %book.title, "book removed");
        self.after_mutation(Some(book))
    }

    /// Case-insensitive substring match of `term` against `field`, in library
    /// order. An empty term matches everything.
    pub fn search_books(&self, term: &str, field: SearchField) -> Vec<&Book> {
        let needle = term.to_lowercase();
        let results: Vec<&Book> = self
            .books
            .iter()
            .filter(|book| field.value(book).to_lowercase().contains(&needle))
            .collect();
        tracing::debug!(term, %field, matches = results.len(), "search");
        results
    }

    pub fn statistics(&self) -> Stats {
        compute_statistics(&self.books)
    }

    /// Persist the library if it has unsaved changes.
    pub fn flush(&mut self) -> Result<(), StoreError> {
        if !self.dirty {
            return Ok(());
        }
        match self.store.save(&self.books) {
            Ok(()) => {
                self.dirty = false;
                tracing::info!(path = %self.store.path().display(), count = self.books.len(), "library saved");
                Ok(())
            }
            Err(err) => {
                tracing::warn!(error = %err, "failed to save library");
                Err(err)
            }
        }
    }

    fn after_mutation<T>(&mut self, value: T) -> Change<T> {
        self.dirty = true;
        let saved = match self.policy {
            WritePolicy::WriteThrough => self.flush(),
            WritePolicy::Manual => Ok(()),
        };
        Change { value, saved }
    }
}
