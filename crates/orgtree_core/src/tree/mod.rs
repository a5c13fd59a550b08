//! Hierarchy traversal over parent pointers.
//!
//! # Responsibility
//! - Resolve root-to-node paths with cycle detection.
//! - Provide single-level child slices.
//! - Materialize nested trees and breadcrumbs from a flat snapshot.
//!
//! # Invariants
//! - Traversal never follows live references; relationships are resolved
//!   by id lookup only.
//! - Every walk is bounded, so corrupt data cannot hang a request.

use crate::model::unit::UnitId;
use crate::repo::unit_repo::UnitRepoError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod materialize;
pub mod path;
pub mod slice;

/// Result type for tree APIs.
pub type TreeResult<T> = Result<T, TreeError>;

/// Data-integrity defect found while walking a parent chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HierarchyDefect {
    /// The walk revisited `repeated_id` before reaching a root.
    Cycle { repeated_id: UnitId },
    /// `unit_id` points at a parent that does not exist.
    DanglingParent { unit_id: UnitId, parent_id: UnitId },
    /// The walk exceeded the deepest level present in the store.
    DepthExceeded { max_depth: usize },
    /// `unit_id` has a level inconsistent with its parent.
    LevelMismatch {
        unit_id: UnitId,
        expected: i64,
        actual: i64,
    },
}

impl Display for HierarchyDefect {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cycle { repeated_id } => write!(f, "cycle through unit {repeated_id}"),
            Self::DanglingParent { unit_id, parent_id } => {
                write!(f, "unit {unit_id} references missing parent {parent_id}")
            }
            Self::DepthExceeded { max_depth } => {
                write!(f, "parent chain longer than {max_depth} links")
            }
            Self::LevelMismatch {
                unit_id,
                expected,
                actual,
            } => write!(
                f,
                "unit {unit_id} has level {actual}, expected {expected}"
            ),
        }
    }
}

/// Errors from tree operations.
#[derive(Debug)]
pub enum TreeError {
    /// Requested unit does not exist.
    NotFound(UnitId),
    /// Parent chain of `unit_id` does not terminate cleanly at a root.
    MalformedHierarchy {
        unit_id: UnitId,
        defect: HierarchyDefect,
    },
    /// Store failure.
    Repo(UnitRepoError),
}

impl Display for TreeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(id) => write!(f, "unit not found: {id}"),
            Self::MalformedHierarchy { unit_id, defect } => {
                write!(f, "malformed hierarchy above unit {unit_id}: {defect}")
            }
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for TreeError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<UnitRepoError> for TreeError {
    fn from(value: UnitRepoError) -> Self {
        Self::Repo(value)
    }
}
