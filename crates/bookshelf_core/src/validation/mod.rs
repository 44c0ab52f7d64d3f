//! Book form validation.
//!
//! # Responsibility
//! - Decide whether raw form input may become (or update) a `BookRecord`.
//! - Produce per-field, user-facing error messages on rejection.
//!
//! # Invariants
//! - Full validation and the submit gate are separate checks and may disagree.
//! - Validation never short-circuits; every field is evaluated.

pub mod validator;
