//! Domain model for the organizational unit registry.
//!
//! # Responsibility
//! - Define the canonical `Unit` record read by every core component.
//! - Keep derived read models (unit with children) next to the record.
//!
//! # Invariants
//! - Every unit is identified by a stable integer `UnitId`.
//! - Core components never mutate units; all views are projections.

pub mod unit;
