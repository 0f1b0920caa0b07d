//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define data access contracts for notes.
//! - Isolate SQLite query details from service orchestration.
//!
//! # Invariants
//! - Repository writes validate notes before persistence.
//! - Repository APIs return semantic errors (`NotFound`) in addition to DB
//!   transport errors.

pub mod note_repo;
