//! In-memory book collection.
//!
//! Books live in a single insertion-ordered `Vec` behind an `RwLock`. Reads
//! share the lock, every mutation takes it exclusively, and the lock is never
//! held across an `.await`.

use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use time::OffsetDateTime;
use uuid::Uuid;

use super::error::BookError;
use super::models::{Book, BookFields, BookFilter, BookPayload, BookSummary};

#[derive(Debug, Default)]
pub struct BookRegistry {
    books: RwLock<Vec<Book>>,
}

impl BookRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    // Mutations replace whole elements, so a poisoned lock still guards a
    // consistent collection.
    fn read(&self) -> RwLockReadGuard<'_, Vec<Book>> {
        self.books.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Vec<Book>> {
        self.books.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Number of books currently held.
    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Validate and append a new book, returning its id.
    pub fn create(&self, payload: BookPayload) -> Result<String, BookError> {
        let fields = BookFields::try_from(payload)?;
        let mut books = self.write();

        let id = loop {
            let candidate = Uuid::now_v7().simple().to_string();
            if !books.iter().any(|book| book.id == candidate) {
                break candidate;
            }
        };

        books.push(Book::new(id.clone(), fields, OffsetDateTime::now_utc()));

        if books.last().map(|book| book.id.as_str()) != Some(id.as_str()) {
            return Err(BookError::InternalInconsistency(id));
        }

        tracing::debug!(book_id = %id, total = books.len(), "book added");
        Ok(id)
    }

    /// Summaries of the books matching `filter`, in insertion order.
    pub fn list(&self, filter: &BookFilter) -> Vec<BookSummary> {
        self.read()
            .iter()
            .filter(|book| filter.matches(book))
            .map(Book::to_summary)
            .collect()
    }

    pub fn get(&self, id: &str) -> Result<Book, BookError> {
        self.read()
            .iter()
            .find(|book| book.id == id)
            .cloned()
            .ok_or_else(|| BookError::NotFound(id.to_string()))
    }

    /// Replace the caller-owned fields of an existing book.
    ///
    /// The payload is validated before the id is looked up, so a bad payload
    /// is reported even for an unknown id.
    pub fn update(&self, id: &str, payload: BookPayload) -> Result<(), BookError> {
        let fields = BookFields::try_from(payload)?;
        let mut books = self.write();

        let book = books
            .iter_mut()
            .find(|book| book.id == id)
            .ok_or_else(|| BookError::NotFound(id.to_string()))?;
        book.apply(fields, OffsetDateTime::now_utc());

        tracing::debug!(book_id = %id, "book updated");
        Ok(())
    }

    pub fn delete(&self, id: &str) -> Result<(), BookError> {
        let mut books = self.write();

        let index = books
            .iter()
            .position(|book| book.id == id)
            .ok_or_else(|| BookError::NotFound(id.to_string()))?;
        books.remove(index);

        tracing::debug!(book_id = %id, total = books.len(), "book deleted");
        Ok(())
    }
}
