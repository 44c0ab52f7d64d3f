//! Process-local repository for tests and ephemeral sessions.
//!
//! # Invariants
//! - Same validation and not-found semantics as the SQLite repository.
//! - Insertion order is preserved.

use crate::model::book::{BookId, BookRecord};
use crate::repo::book_repo::{BookRepository, RepoError, RepoResult};
use std::cell::RefCell;

/// In-memory book store. Single-threaded by construction (`RefCell`).
#[derive(Debug, Default)]
pub struct InMemoryBookRepository {
    books: RefCell<Vec<BookRecord>>,
}

impl InMemoryBookRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored books.
    pub fn len(&self) -> usize {
        self.books.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.books.borrow().is_empty()
    }
}

impl BookRepository for InMemoryBookRepository {
    fn insert(&self, book: &BookRecord) -> RepoResult<BookId> {
        book.validate()?;

        let mut books = self.books.borrow_mut();
        if books.iter().any(|stored| stored.id() == book.id()) {
            return Err(RepoError::DuplicateId(book.id()));
        }
        books.push(book.clone());
        Ok(book.id())
    }

    fn update(&self, book: &BookRecord) -> RepoResult<()> {
        book.validate()?;

        let mut books = self.books.borrow_mut();
        let stored = books
            .iter_mut()
            .find(|stored| stored.id() == book.id())
            .ok_or(RepoError::NotFound(book.id()))?;
        *stored = book.clone();
        Ok(())
    }

    fn delete(&self, id: BookId) -> RepoResult<()> {
        let mut books = self.books.borrow_mut();
        let index = books
            .iter()
            .position(|stored| stored.id() == id)
            .ok_or(RepoError::NotFound(id))?;
        books.remove(index);
        Ok(())
    }

    fn get(&self, id: BookId) -> RepoResult<Option<BookRecord>> {
        Ok(self
            .books
            .borrow()
            .iter()
            .find(|stored| stored.id() == id)
            .cloned())
    }

    fn load_all(&self) -> RepoResult<Vec<BookRecord>> {
        Ok(self.books.borrow().clone())
    }
}
