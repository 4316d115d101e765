use crate::catalog::{Library, SearchField};
use crate::models::{Book, BookId};

/// Clamp `selected + offset` into `0..len`.
fn shifted(selected: usize, offset: isize, len: usize) -> usize {
    if len == 0 {
        return 0;
    }
    let target = selected as isize + offset;
    target.clamp(0, len as isize - 1) as usize
}

/// Cursor over the library list.
#[derive(Debug, Default)]
pub(crate) struct LibraryScreen {
    pub(crate) selected: usize,
}

impl LibraryScreen {
    pub(crate) fn move_selection(&mut self, offset: isize, len: usize) {
        self.selected = shifted(self.selected, offset, len);
    }

    pub(crate) fn select_last(&mut self, len: usize) {
        self.selected = len.saturating_sub(1);
    }

    pub(crate) fn ensure_in_bounds(&mut self, len: usize) {
        if self.selected >= len {
            self.selected = len.saturating_sub(1);
        }
    }

    /// Move the cursor onto `id` if it is still in the library.
    pub(crate) fn focus(&mut self, library: &Library, id: BookId) {
        if let Some(position) = library.position(id) {
            self.selected = position;
        }
    }

    pub(crate) fn current<'a>(&self, library: &'a Library) -> Option<&'a Book> {
        library.books().get(self.selected)
    }
}

/// Query, target field and the last result set of the search view.
#[derive(Debug, Default)]
pub(crate) struct SearchScreen {
    pub(crate) query: String,
    pub(crate) field: SearchField,
    /// `None` until the first search runs.
    pub(crate) results: Option<Vec<Book>>,
    pub(crate) selected: usize,
}

impl SearchScreen {
    pub(crate) fn run(&mut self, library: &Library) -> usize {
        let results: Vec<Book> = library
            .search_books(&self.query, self.field)
            .into_iter()
            .cloned()
            .collect();
        let count = results.len();
        self.results = Some(results);
        self.selected = 0;
        count
    }

    /// Drop results that no longer exist after a removal.
    pub(crate) fn retain_existing(&mut self, library: &Library) {
        if let Some(results) = &mut self.results {
            results.retain(|book| library.get(book.id).is_some());
            if self.selected >= results.len() {
                self.selected = results.len().saturating_sub(1);
            }
        }
    }

    pub(crate) fn cycle_field(&mut self, offset: isize) {
        self.field = self.field.cycle(offset);
    }

    pub(crate) fn move_selection(&mut self, offset: isize) {
        let len = self.results.as_ref().map_or(0, Vec::len);
        self.selected = shifted(self.selected, offset, len);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shifted_clamps_both_ends() {
        assert_eq!(shifted(0, -3, 4), 0);
        assert_eq!(shifted(2, 5, 4), 3);
        assert_eq!(shifted(1, 1, 4), 2);
        assert_eq!(shifted(3, 1, 0), 0);
    }

    #[test]
    fn ensure_in_bounds_after_shrink() {
        let mut screen = LibraryScreen { selected: 4 };
        screen.ensure_in_bounds(2);
        assert_eq!(screen.selected, 1);
        screen.ensure_in_bounds(0);
        assert_eq!(screen.selected, 0);
    }
}
