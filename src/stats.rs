//! Summary statistics shown on the statistics screen.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use crate::models::Book;

/// Aggregated view of a library. The `genres` and `authors` lists are sorted
/// by count, highest first; equal counts keep the order in which the value
/// first appeared in the library. `decades` is sorted ascending.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Stats {
    pub total_books: usize,
    pub read_books: usize,
    pub unread_books: usize,
    pub percent_read: f64,
    pub genres: Vec<(String, usize)>,
    pub authors: Vec<(String, usize)>,
    pub decades: Vec<(i64, usize)>,
}

impl Stats {
    /// Share of unread books, the complement of `percent_read`.
    pub fn percent_unread(&self) -> f64 {
        if self.total_books == 0 {
            0.0
        } else {
            100.0 - self.percent_read
        }
    }
}

/// Single pass over `books` followed by one sort per grouping.
pub fn compute_statistics(books: &[Book]) -> Stats {
    let total_books = books.len();
    let mut read_books = 0;
    let mut genres = FirstSeenCounter::default();
    let mut authors = FirstSeenCounter::default();
    let mut decades: BTreeMap<i64, usize> = BTreeMap::new();

    for book in books {
        if book.read_status {
            read_books += 1;
        }
        genres.add(&book.genre);
        authors.add(&book.author);
        if let Some(year) = book.publication_year.as_year() {
            *decades.entry(year.div_euclid(10) * 10).or_insert(0) += 1;
        }
    }

    let percent_read = if total_books > 0 {
        read_books as f64 / total_books as f64 * 100.0
    } else {
        0.0
    };

    let stats = Stats {
        total_books,
        read_books,
        unread_books: total_books - read_books,
        percent_read,
        genres: genres.into_sorted(),
        authors: authors.into_sorted(),
        decades: decades.into_iter().collect(),
    };
    tracing::debug!(
        total = stats.total_books,
        read = stats.read_books,
        genres = stats.genres.len(),
        decades = stats.decades.len(),
        "statistics computed"
    );
    stats
}

/// Counts occurrences while remembering first-appearance order.
#[derive(Default)]
struct FirstSeenCounter {
    slots: HashMap<String, usize>,
    counts: Vec<(String, usize)>,
}

impl FirstSeenCounter {
    fn add(&mut self, key: &str) {
        if let Some(&slot) = self.slots.get(key) {
            self.counts[slot].1 += 1;
        } else {
            self.slots.insert(key.to_string(), self.counts.len());
            self.counts.push((key.to_string(), 1));
        }
    }

    fn into_sorted(mut self) -> Vec<(String, usize)> {
        // `sort_by` is stable, which is what keeps ties in first-seen order.
        self.counts.sort_by(|a, b| b.1.cmp(&a.1));
        self.counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BookId, PublicationYear};

    fn book(title: &str, author: &str, year: PublicationYear, genre: &str, read: bool) -> Book {
        Book {
            id: BookId(0),
            title: title.into(),
            author: author.into(),
            publication_year: year,
            genre: genre.into(),
            read_status: read,
            added_date: "2024-01-01 00:00:00".into(),
        }
    }

    #[test]
    fn empty_library_has_zero_percent() {
        let stats = compute_statistics(&[]);
        assert_eq!(stats.total_books, 0);
        assert_eq!(stats.percent_read, 0.0);
        assert_eq!(stats.percent_unread(), 0.0);
        assert!(stats.genres.is_empty());
        assert!(stats.decades.is_empty());
    }

    #[test]
    fn dune_and_1984() {
        let books = vec![
            book("Dune", "Herbert", PublicationYear::Year(1965), "Science", true),
            book("1984", "Orwell", PublicationYear::Year(1949), "Fiction", false),
        ];
        let stats = compute_statistics(&books);

        assert_eq!(stats.total_books, 2);
        assert_eq!(stats.read_books, 1);
        assert_eq!(stats.unread_books, 1);
        assert_eq!(stats.percent_read, 50.0);
        assert_eq!(stats.decades, vec![(1940, 1), (1960, 1)]);
    }

    #[test]
    fn ties_keep_first_seen_order() {
        let books = vec![
            book("a", "Le Guin", PublicationYear::Year(1969), "Fantasy", false),
            book("b", "Asimov", PublicationYear::Year(1951), "Science", false),
            book("c", "Asimov", PublicationYear::Year(1950), "Science", true),
            book("d", "Banks", PublicationYear::Year(1987), "Fiction", false),
            book("e", "Le Guin", PublicationYear::Year(1974), "Fiction", true),
        ];
        let stats = compute_statistics(&books);

        assert_eq!(
            stats.genres,
            vec![
                ("Science".to_string(), 2),
                ("Fiction".to_string(), 2),
                ("Fantasy".to_string(), 1),
            ]
        );
        assert_eq!(
            stats.authors,
            vec![
                ("Le Guin".to_string(), 2),
                ("Asimov".to_string(), 2),
                ("Banks".to_string(), 1),
            ]
        );
        assert_eq!(stats.decades, vec![(1950, 2), (1960, 1), (1970, 1), (1980, 1)]);
    }

    #[test]
    fn unparseable_year_only_skips_decades() {
        let books = vec![
            book("a", "x", PublicationYear::Text("circa 1900".into()), "History", true),
            book("b", "y", PublicationYear::Text(" 2001 ".into()), "History", false),
            book("c", "z", PublicationYear::Year(2019), "History", false),
        ];
        let stats = compute_statistics(&books);

        assert_eq!(stats.total_books, 3);
        assert_eq!(stats.read_books + stats.unread_books, stats.total_books);
        assert_eq!(stats.decades, vec![(2000, 1), (2010, 1)]);
        assert_eq!(stats.genres, vec![("History".to_string(), 3)]);
    }

    #[test]
    fn percent_read_matches_ratio() {
        let books: Vec<Book> = (0..3)
            .map(|i| book("t", "a", PublicationYear::Year(2000), "Fiction", i == 0))
            .collect();
        let stats = compute_statistics(&books);
        assert!((stats.percent_read - 100.0 / 3.0).abs() < 1e-9);
    }
}
