//! Exact identifier matcher.
//!
//! # Responsibility
//! - Collect units whose identifiers equal the query.
//! - Order the exact tier by display name.
//!
//! # Invariants
//! - String-form and numeric `code_abp` equality are independent conditions.
//! - A query that does not parse as `i32` silently skips the numeric branch.
//! - Each unit appears at most once.

use crate::model::unit::{sort_by_name, Unit};
use crate::repo::unit_repo::{ExactField, UnitRepoResult, UnitRepository};
use std::collections::BTreeMap;

/// Fields consulted by [`match_exact`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExactMode {
    /// `bin`, `code`, `code_abp` only. Used ahead of the fuzzy tier.
    Identifiers,
    /// Identifiers plus case-sensitive `name` equality. Used by exact-only search.
    IdentifiersAndName,
}

/// Returns units whose identifier fields equal `query`, ordered by name.
pub fn match_exact<R>(repo: &R, query: &str, mode: ExactMode) -> UnitRepoResult<Vec<Unit>>
where
    R: UnitRepository + ?Sized,
{
    let mut lookups = vec![
        ExactField::Bin(query),
        ExactField::Code(query),
        ExactField::CodeAbpText(query),
    ];
    if let Ok(numeric) = query.parse::<i32>() {
        lookups.push(ExactField::CodeAbp(numeric));
    }
    if mode == ExactMode::IdentifiersAndName {
        lookups.push(ExactField::Name(query));
    }

    let mut matched = BTreeMap::new();
    for lookup in lookups {
        for unit in repo.find_by_exact_field(lookup)? {
            matched.entry(unit.id).or_insert(unit);
        }
    }

    let mut units: Vec<Unit> = matched.into_values().collect();
    sort_by_name(&mut units);
    Ok(units)
}
