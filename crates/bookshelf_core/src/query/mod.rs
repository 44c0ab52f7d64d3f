//! Display-list queries over the in-memory collection.
//!
//! # Responsibility
//! - Filter by free-text search and order by a sort key.
//! - Expose empty-state signals the list screen switches on.

pub mod list;
