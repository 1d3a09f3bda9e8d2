//! Repository layer over SQLite.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts.
//! - Isolate SQL details from service orchestration.
//!
//! # Invariants
//! - Repository writes enforce model validation before persistence.
//! - Repository APIs return semantic errors (`NotFound`, `DuplicateName`)
//!   in addition to DB transport errors.

pub mod bookmark_repo;
