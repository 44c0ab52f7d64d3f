//! Catalog use-case services.
//!
//! # Responsibility
//! - Orchestrate validation, persistence and queries for UI callers.
//! - Keep FFI and CLI layers decoupled from storage details.

pub mod library_service;
