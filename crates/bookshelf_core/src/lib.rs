//! Core domain logic for Bookshelf.
//! This crate is the single source of truth for catalog invariants.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod query;
pub mod repo;
pub mod service;
pub mod validation;

pub use config::CoreConfig;
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::book::{BookFormInput, BookId, BookRecord, BookValidationError};
pub use query::list::{query, LibraryView, ListState, SortKey};
pub use repo::book_repo::{BookRepository, RepoError, RepoResult, SqliteBookRepository};
pub use repo::memory::InMemoryBookRepository;
pub use service::library_service::{LibraryError, LibraryService};
pub use validation::validator::{
    quick_check, validate, validate_at, AcceptedBook, BookField, FieldErrors,
    FieldValidationError, Validation,
};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
