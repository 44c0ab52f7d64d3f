//! Domain model for the book catalog.
//!
//! # Responsibility
//! - Define the canonical book record used by validation, query and storage.
//!
//! # Invariants
//! - Every record is identified by a stable `BookId`.
//! - Deletion is a hard delete; there are no tombstones.

pub mod book;
