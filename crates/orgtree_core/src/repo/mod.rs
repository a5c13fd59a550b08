//! Unit store abstraction and persistence implementation.
//!
//! # Responsibility
//! - Define the read-only query contract the core algorithms depend on.
//! - Isolate SQLite query details from search and tree orchestration.
//!
//! # Invariants
//! - Repository APIs never mutate units.
//! - Transport errors are returned unchanged; semantic errors (`NotFound`,
//!   malformed hierarchy) are decided by callers.

pub mod unit_repo;
