//! Single-level child listing.

use crate::model::unit::{sort_by_name, Unit, UnitId};
use crate::repo::unit_repo::UnitRepository;
use crate::tree::TreeResult;

/// Lists direct children of `parent_id` (roots when `None`), sorted by name.
///
/// An unknown parent yields an empty list.
pub fn list_children<R>(repo: &R, parent_id: Option<UnitId>) -> TreeResult<Vec<Unit>>
where
    R: UnitRepository + ?Sized,
{
    let mut units = repo.find_by_parent(parent_id)?;
    sort_by_name(&mut units);
    Ok(units)
}
