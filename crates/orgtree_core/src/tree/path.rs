//! Ancestor path resolution.
//!
//! # Invariants
//! - Output is root-first and ends with the requested unit.
//! - Levels increase by exactly one along the output.
//! - The walk is bounded by the deepest level in the store plus one link,
//!   so cycles terminate with `MalformedHierarchy`.

use crate::model::unit::{Unit, UnitId};
use crate::repo::unit_repo::UnitRepository;
use crate::tree::{HierarchyDefect, TreeError, TreeResult};
use log::error;
use std::collections::HashSet;

/// Returns units from the root down to and including `id`.
///
/// # Errors
/// - `NotFound` when `id` does not exist.
/// - `MalformedHierarchy` on cycles, dangling parents, over-long chains or
///   inconsistent levels.
pub fn resolve_path<R>(repo: &R, id: UnitId) -> TreeResult<Vec<Unit>>
where
    R: UnitRepository + ?Sized,
{
    let max_depth = depth_bound(repo)?;
    let mut chain = repo.ancestor_chain(id, max_depth)?;
    if chain.is_empty() {
        return Err(TreeError::NotFound(id));
    }

    let verdict = check_chain(&chain, max_depth);
    chain.reverse();
    if let Err(defect) = verdict.and_then(|()| check_levels(&chain)) {
        error!(
            "event=hierarchy_malformed module=tree status=error unit_id={} defect=\"{}\"",
            id, defect
        );
        return Err(TreeError::MalformedHierarchy {
            unit_id: id,
            defect,
        });
    }
    Ok(chain)
}

fn depth_bound<R>(repo: &R) -> TreeResult<usize>
where
    R: UnitRepository + ?Sized,
{
    let deepest = repo.max_level()?.unwrap_or(0);
    Ok(usize::try_from(deepest).unwrap_or(0).saturating_add(1))
}

/// Checks a nearest-first chain for repeats and a clean root.
fn check_chain(chain: &[Unit], max_depth: usize) -> Result<(), HierarchyDefect> {
    let mut visited = HashSet::new();
    for unit in chain {
        if !visited.insert(unit.id) {
            return Err(HierarchyDefect::Cycle {
                repeated_id: unit.id,
            });
        }
    }

    match chain.last().and_then(|top| top.parent_id.map(|parent| (top.id, parent))) {
        None => Ok(()),
        Some(_) if chain.len() > max_depth => Err(HierarchyDefect::DepthExceeded { max_depth }),
        Some((unit_id, parent_id)) => Err(HierarchyDefect::DanglingParent { unit_id, parent_id }),
    }
}

/// Checks a root-first chain for consecutive levels.
fn check_levels(chain: &[Unit]) -> Result<(), HierarchyDefect> {
    for pair in chain.windows(2) {
        let expected = pair[0].level + 1;
        if pair[1].level != expected {
            return Err(HierarchyDefect::LevelMismatch {
                unit_id: pair[1].id,
                expected,
                actual: pair[1].level,
            });
        }
    }
    Ok(())
}
