//! Ordered book catalog

use super::Book;
use std::collections::HashSet;
use tracing::warn;

/// Books in shelf order
///
/// Order is the spreadsheet row order, or the prior snapshot order when the catalog
/// was loaded from JSON. It is preserved end-to-end.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    books: Vec<Book>,
}

impl Catalog {
    pub fn new(books: Vec<Book>) -> Self {
        Self { books }
    }

    pub fn books(&self) -> &[Book] {
        &self.books
    }

    pub fn books_mut(&mut self) -> &mut [Book] {
        &mut self.books
    }

    pub fn len(&self) -> usize {
        self.books.len()
    }

    pub fn is_empty(&self) -> bool {
        self.books.is_empty()
    }

    /// Make ids unique by suffixing repeats with `-2`, `-3`, ... in catalog order
    ///
    /// Returns the number of ids that were changed. The outcome depends only on the
    /// ids and their order, so re-running on the same source yields the same ids.
    pub fn ensure_unique_ids(&mut self) -> usize {
        let mut seen: HashSet<String> = HashSet::with_capacity(self.books.len());
        let mut renamed = 0;

        for book in &mut self.books {
            if seen.insert(book.id.clone()) {
                continue;
            }

            let mut n = 2;
            let mut candidate = format!("{}-{}", book.id, n);
            while seen.contains(&candidate) {
                n += 1;
                candidate = format!("{}-{}", book.id, n);
            }

            warn!(title = %book.title, from = %book.id, to = %candidate, "Duplicate book id renamed");
            seen.insert(candidate.clone());
            book.id = candidate;
            renamed += 1;
        }

        renamed
    }
}
