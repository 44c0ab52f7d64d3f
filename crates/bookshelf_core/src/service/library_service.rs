//! Library use-case service.
//!
//! # Responsibility
//! - Own the in-memory book collection loaded from a repository.
//! - Validate form input before add/edit and commit every mutation.
//! - Answer list queries from the in-memory collection.
//!
//! # Invariants
//! - Storage is written first; memory changes only after the repository
//!   confirms the commit. A failed commit leaves memory untouched.
//! - Edits replace title, author and year together.
//! - Commit failures are logged and returned; they are never retried.

use crate::model::book::{BookFormInput, BookId, BookRecord};
use crate::query::list::{LibraryView, SortKey};
use crate::repo::book_repo::{BookRepository, RepoError, RepoResult};
use crate::validation::validator::{FieldErrors, Validation};
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Error for library use-cases.
#[derive(Debug)]
pub enum LibraryError {
    /// Form input failed validation; carries per-field messages.
    Rejected(FieldErrors),
    /// Target book is not in the collection.
    NotFound(BookId),
    /// Repository failed to commit or load.
    Storage(RepoError),
}

impl Display for LibraryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Rejected(errors) => write!(f, "{errors}"),
            Self::NotFound(id) => write!(f, "book not found: {id}"),
            Self::Storage(err) => write!(f, "storage commit failed: {err}"),
        }
    }
}

impl Error for LibraryError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Rejected(errors) => Some(errors),
            Self::NotFound(_) => None,
            Self::Storage(err) => Some(err),
        }
    }
}

impl From<RepoError> for LibraryError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(id) => Self::NotFound(id),
            other => Self::Storage(other),
        }
    }
}

/// Library facade over a repository implementation.
pub struct LibraryService<R: BookRepository> {
    repo: R,
    books: Vec<BookRecord>,
}

impl<R: BookRepository> LibraryService<R> {
    /// Loads the full collection from `repo`.
    pub fn open(repo: R) -> RepoResult<Self> {
        let books = repo.load_all()?;
        info!(
            "event=library_open module=service status=ok count={}",
            books.len()
        );
        Ok(Self { repo, books })
    }

    /// Read-only view of the collection in storage order.
    pub fn books(&self) -> &[BookRecord] {
        &self.books
    }

    pub fn get(&self, id: BookId) -> Option<&BookRecord> {
        self.books.iter().find(|book| book.id() == id)
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    /// Validates `input`, stores a new book, and appends it to the collection.
    pub fn add_book(&mut self, input: &BookFormInput) -> Result<BookRecord, LibraryError> {
        let fields = match input.validate() {
            Validation::Accepted(fields) => fields,
            Validation::Rejected(errors) => {
                info!(
                    "event=book_add module=service status=rejected error_count={}",
                    errors.len()
                );
                return Err(LibraryError::Rejected(errors));
            }
        };

        let book = BookRecord::new(fields);
        if let Err(err) = self.repo.insert(&book) {
            warn!(
                "event=book_add module=service status=error book_id={} error={}",
                book.id(),
                err
            );
            return Err(err.into());
        }

        info!(
            "event=book_add module=service status=ok book_id={}",
            book.id()
        );
        self.books.push(book.clone());
        Ok(book)
    }

    /// Re-validates `input` and replaces all fields of book `id`.
    pub fn update_book(
        &mut self,
        id: BookId,
        input: &BookFormInput,
    ) -> Result<BookRecord, LibraryError> {
        let index = self.position(id)?;
        let fields = match input.validate() {
            Validation::Accepted(fields) => fields,
            Validation::Rejected(errors) => {
                info!(
                    "event=book_update module=service status=rejected book_id={id} error_count={}",
                    errors.len()
                );
                return Err(LibraryError::Rejected(errors));
            }
        };

        let mut updated = self.books[index].clone();
        updated.apply(fields);
        if let Err(err) = self.repo.update(&updated) {
            warn!("event=book_update module=service status=error book_id={id} error={err}");
            return Err(err.into());
        }

        info!("event=book_update module=service status=ok book_id={id}");
        self.books[index] = updated.clone();
        Ok(updated)
    }

    /// Deletes book `id` from storage and from the collection.
    pub fn delete_book(&mut self, id: BookId) -> Result<BookRecord, LibraryError> {
        let index = self.position(id)?;
        if let Err(err) = self.repo.delete(id) {
            warn!("event=book_delete module=service status=error book_id={id} error={err}");
            return Err(err.into());
        }

        info!("event=book_delete module=service status=ok book_id={id}");
        Ok(self.books.remove(index))
    }

    /// Filters and sorts the collection for display.
    pub fn view(&self, search_text: &str, sort_key: SortKey) -> LibraryView {
        LibraryView::build(&self.books, search_text, sort_key)
    }

    /// Replaces the in-memory collection with the repository's contents.
    pub fn reload(&mut self) -> RepoResult<()> {
        self.books = self.repo.load_all()?;
        Ok(())
    }

    fn position(&self, id: BookId) -> Result<usize, LibraryError> {
        self.books
            .iter()
            .position(|book| book.id() == id)
            .ok_or(LibraryError::NotFound(id))
    }
}
