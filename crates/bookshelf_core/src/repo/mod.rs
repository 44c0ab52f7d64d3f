//! Persistence contracts and implementations.
//!
//! # Responsibility
//! - Define the explicit `insert/update/delete/load_all` storage interface.
//! - Keep SQL details out of the service layer.
//!
//! # Invariants
//! - Write paths run `BookRecord::validate()` before touching storage.
//! - Missing targets surface as `RepoError::NotFound`, not silent no-ops.

pub mod book_repo;
pub mod memory;
