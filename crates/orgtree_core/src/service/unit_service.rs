//! Unit registry use-case service.
//!
//! # Responsibility
//! - Expose path, children, unit, search and export operations to transports.
//! - Map component errors onto one request-level error taxonomy.
//!
//! # Invariants
//! - The service holds no mutable state; every call is independent.
//! - Invalid search input is rejected before any store access.
//! - Store failures are passed through unchanged, never retried.

use crate::config::CoreConfig;
use crate::model::unit::{Unit, UnitId, UnitWithChildren};
use crate::repo::unit_repo::{UnitRepoError, UnitRepository};
use crate::search::assemble::{search_units, SearchError, SearchHit, SearchRequest};
use crate::tree::materialize::{materialize_tree, MaterializedTree};
use crate::tree::path::resolve_path;
use crate::tree::slice::list_children;
use crate::tree::{HierarchyDefect, TreeError};
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

/// Errors from unit service operations.
#[derive(Debug)]
pub enum UnitServiceError {
    /// Referenced unit does not exist.
    NotFound(UnitId),
    /// Parent chain of `unit_id` is corrupt.
    MalformedHierarchy {
        unit_id: UnitId,
        defect: HierarchyDefect,
    },
    /// Caller-supplied parameter violates the request contract.
    InvalidQuery {
        field: &'static str,
        message: String,
    },
    /// Store failure.
    Repo(UnitRepoError),
}

impl Display for UnitServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(id) => write!(f, "unit not found: {id}"),
            Self::MalformedHierarchy { unit_id, defect } => {
                write!(f, "malformed hierarchy above unit {unit_id}: {defect}")
            }
            Self::InvalidQuery { field, message } => {
                write!(f, "invalid query `{field}`: {message}")
            }
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for UnitServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<UnitRepoError> for UnitServiceError {
    fn from(value: UnitRepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<TreeError> for UnitServiceError {
    fn from(value: TreeError) -> Self {
        match value {
            TreeError::NotFound(id) => Self::NotFound(id),
            TreeError::MalformedHierarchy { unit_id, defect } => {
                Self::MalformedHierarchy { unit_id, defect }
            }
            TreeError::Repo(err) => Self::Repo(err),
        }
    }
}

impl From<SearchError> for UnitServiceError {
    fn from(value: SearchError) -> Self {
        match value {
            SearchError::InvalidQuery { field, message } => Self::InvalidQuery { field, message },
            SearchError::Repo(err) => Self::Repo(err),
        }
    }
}

/// Unit registry service facade.
pub struct UnitService<R: UnitRepository> {
    repo: R,
    config: CoreConfig,
}

impl<R: UnitRepository> UnitService<R> {
    /// Creates service with default configuration.
    pub fn new(repo: R) -> Self {
        Self::with_config(repo, CoreConfig::default())
    }

    /// Creates service with explicit configuration.
    pub fn with_config(repo: R, config: CoreConfig) -> Self {
        Self { repo, config }
    }

    /// Returns the active configuration.
    pub fn config(&self) -> &CoreConfig {
        &self.config
    }

    /// Returns units from the root down to `unit_id`, inclusive.
    pub fn resolve_path(&self, unit_id: UnitId) -> Result<Vec<Unit>, UnitServiceError> {
        resolve_path(&self.repo, unit_id).map_err(Into::into)
    }

    /// Lists direct children of `parent_id` (roots when `None`), sorted by name.
    pub fn list_children(
        &self,
        parent_id: Option<UnitId>,
    ) -> Result<Vec<Unit>, UnitServiceError> {
        list_children(&self.repo, parent_id).map_err(Into::into)
    }

    /// Loads one unit together with its sorted direct children.
    pub fn get_unit(&self, unit_id: UnitId) -> Result<UnitWithChildren, UnitServiceError> {
        let unit = self
            .repo
            .find_by_id(unit_id)?
            .ok_or(UnitServiceError::NotFound(unit_id))?;
        let children = list_children(&self.repo, Some(unit_id))?;
        Ok(UnitWithChildren { unit, children })
    }

    /// Returns one ranked search page.
    pub fn search(&self, request: &SearchRequest) -> Result<Vec<SearchHit>, UnitServiceError> {
        search_units(&self.repo, request, &self.config.search).map_err(Into::into)
    }

    /// Materializes an arbitrary unit collection with the configured separator.
    pub fn materialize_tree(&self, units: &[Unit]) -> MaterializedTree {
        materialize_tree(units, &self.config.tree.breadcrumb_separator)
    }

    /// Loads every unit from the store and materializes it.
    pub fn export_snapshot(&self) -> Result<MaterializedTree, UnitServiceError> {
        let started_at = Instant::now();
        let units = self.repo.all_units()?;
        let tree = self.materialize_tree(&units);
        info!(
            "event=export_snapshot module=service status=ok units={} roots={} duration_ms={}",
            units.len(),
            tree.roots.len(),
            started_at.elapsed().as_millis()
        );
        Ok(tree)
    }
}
