//! Organizational unit domain model.
//!
//! # Responsibility
//! - Define the single entity stored in the hierarchy.
//! - Provide name ordering shared by tree slices and the exact search tier.
//!
//! # Invariants
//! - `parent_id = None` marks a root.
//! - `level` equals the parent's level + 1 for non-roots (assumed, never repaired).
//! - `bin` is at most 12 characters, `code` at most 20.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Stable identifier of one unit.
pub type UnitId = i64;

/// Maximum stored length of [`Unit::bin`].
pub const BIN_MAX_LEN: usize = 12;
/// Maximum stored length of [`Unit::code`].
pub const CODE_MAX_LEN: usize = 20;

/// One node of the organizational hierarchy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unit {
    /// Primary identity, never reused.
    pub id: UnitId,
    /// Display name. Not unique; used for fuzzy matching.
    pub name: String,
    /// Business identification number.
    pub bin: Option<String>,
    /// Short identifier code.
    pub code: Option<String>,
    /// Numeric budget program code.
    pub code_abp: Option<i32>,
    /// Parent unit id. `None` means root.
    pub parent_id: Option<UnitId>,
    /// Depth in the tree; roots are level 0.
    pub level: i64,
    /// Denormalized counter maintained by the write path.
    pub direct_children_count: i64,
    /// Denormalized counter maintained by the write path.
    pub total_descendants_count: i64,
}

impl Unit {
    /// Creates a root-level unit with no identifiers.
    ///
    /// Used by tests and in-memory stores; counters start at zero.
    pub fn new(id: UnitId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            bin: None,
            code: None,
            code_abp: None,
            parent_id: None,
            level: 0,
            direct_children_count: 0,
            total_descendants_count: 0,
        }
    }
}

/// Unit read model with its direct children attached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitWithChildren {
    #[serde(flatten)]
    pub unit: Unit,
    /// Direct children ordered by [`compare_by_name`].
    pub children: Vec<Unit>,
}

/// Total display-name ordering used for tree slices and the exact tier.
///
/// Compares case-folded names first so "alpha" and "Alpha" sort together,
/// then raw names so case variants have a fixed order, then ids.
pub fn compare_by_name(left: &Unit, right: &Unit) -> Ordering {
    let folded = left
        .name
        .chars()
        .flat_map(char::to_lowercase)
        .cmp(right.name.chars().flat_map(char::to_lowercase));
    folded
        .then_with(|| left.name.cmp(&right.name))
        .then_with(|| left.id.cmp(&right.id))
}

/// Sorts units in place with [`compare_by_name`].
pub fn sort_by_name(units: &mut [Unit]) {
    units.sort_by(compare_by_name);
}

#[cfg(test)]
mod tests {
    use super::{compare_by_name, sort_by_name, Unit};
    use std::cmp::Ordering;

    #[test]
    fn name_ordering_folds_case_before_raw_comparison() {
        let mut units = vec![
            Unit::new(1, "beta"),
            Unit::new(2, "Alpha"),
            Unit::new(3, "alpha"),
            Unit::new(4, "Gamma"),
        ];
        sort_by_name(&mut units);
        let names: Vec<_> = units.iter().map(|unit| unit.name.as_str()).collect();
        assert_eq!(names, vec!["Alpha", "alpha", "beta", "Gamma"]);
    }

    #[test]
    fn name_ordering_breaks_ties_by_id() {
        let left = Unit::new(7, "Same");
        let right = Unit::new(3, "Same");
        assert_eq!(compare_by_name(&left, &right), Ordering::Greater);
    }

    #[test]
    fn name_ordering_handles_cyrillic_case() {
        let mut units = vec![Unit::new(1, "Школа"), Unit::new(2, "акимат")];
        sort_by_name(&mut units);
        assert_eq!(units[0].id, 2);
    }

    #[test]
    fn unit_serializes_with_flat_children_envelope() {
        let value = serde_json::to_value(super::UnitWithChildren {
            unit: Unit::new(1, "Root"),
            children: vec![Unit::new(2, "Child")],
        })
        .expect("serialize");
        assert_eq!(value["id"], 1);
        assert_eq!(value["children"][0]["name"], "Child");
    }
}
