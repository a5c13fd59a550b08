//! Nested tree and breadcrumb materialization from a flat snapshot.
//!
//! # Responsibility
//! - Build an id -> position index once and resolve all relationships by
//!   lookup, never by live references.
//! - Produce the nested parent -> children view and the flat per-unit rows
//!   with breadcrumb paths.
//!
//! # Invariants
//! - Units with a null or unresolvable `parent_id` become roots.
//! - Children keep snapshot order; roots keep snapshot order.
//! - Cycles in the snapshot are cut at one member, which becomes a root;
//!   every unit appears exactly once in the nested view.
//! - Duplicate ids keep the first occurrence.

use crate::model::unit::{Unit, UnitId};
use log::warn;
use serde::Serialize;
use std::collections::HashMap;

/// Nested node of a materialized tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TreeNode {
    #[serde(flatten)]
    pub unit: Unit,
    pub children: Vec<TreeNode>,
}

/// Flat export record with its breadcrumb path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportRow {
    pub id: UnitId,
    pub name: String,
    pub bin: Option<String>,
    pub code: Option<String>,
    pub code_abp: Option<i32>,
    pub parent_id: Option<UnitId>,
    pub level: i64,
    /// Root-to-unit names joined by the breadcrumb separator.
    pub path: String,
}

/// Both derived views of one snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MaterializedTree {
    /// Top-level nodes with nested children.
    pub roots: Vec<TreeNode>,
    /// One row per unit, snapshot order.
    pub rows: Vec<ExportRow>,
}

impl MaterializedTree {
    /// Returns the breadcrumb of `id`, if the unit was in the snapshot.
    pub fn breadcrumb(&self, id: UnitId) -> Option<&str> {
        self.rows
            .iter()
            .find(|row| row.id == id)
            .map(|row| row.path.as_str())
    }
}

/// Materializes nested and flat views of `units`.
pub fn materialize_tree(units: &[Unit], separator: &str) -> MaterializedTree {
    let mut index: HashMap<UnitId, usize> = HashMap::with_capacity(units.len());
    let mut kept: Vec<&Unit> = Vec::with_capacity(units.len());
    for unit in units {
        if index.contains_key(&unit.id) {
            warn!(
                "event=materialize_duplicate module=tree status=skipped unit_id={}",
                unit.id
            );
            continue;
        }
        index.insert(unit.id, kept.len());
        kept.push(unit);
    }

    let mut parent_of: Vec<Option<usize>> = kept
        .iter()
        .map(|unit| unit.parent_id.and_then(|parent| index.get(&parent).copied()))
        .collect();
    cut_cycles(&kept, &mut parent_of);

    let mut children: Vec<Vec<usize>> = vec![Vec::new(); kept.len()];
    let mut root_positions = Vec::new();
    for (position, parent) in parent_of.iter().enumerate() {
        match parent {
            Some(parent) => children[*parent].push(position),
            None => root_positions.push(position),
        }
    }

    let rows = kept
        .iter()
        .enumerate()
        .map(|(position, unit)| ExportRow {
            id: unit.id,
            name: unit.name.clone(),
            bin: unit.bin.clone(),
            code: unit.code.clone(),
            code_abp: unit.code_abp,
            parent_id: unit.parent_id,
            level: unit.level,
            path: breadcrumb(&kept, &parent_of, position, separator),
        })
        .collect();

    MaterializedTree {
        roots: build_nodes(&kept, &children, &root_positions),
        rows,
    }
}

/// Detaches one member of every parent cycle so all chains end at a root.
fn cut_cycles(units: &[&Unit], parent_of: &mut [Option<usize>]) {
    // 0 = unvisited, 1 = on current walk, 2 = settled.
    let mut state = vec![0u8; units.len()];
    for start in 0..units.len() {
        let mut walk = Vec::new();
        let mut cursor = Some(start);
        while let Some(position) = cursor {
            match state[position] {
                2 => break,
                1 => {
                    warn!(
                        "event=materialize_cycle module=tree status=cut unit_id={}",
                        units[position].id
                    );
                    parent_of[position] = None;
                    break;
                }
                _ => {
                    state[position] = 1;
                    walk.push(position);
                    cursor = parent_of[position];
                }
            }
        }
        for position in walk {
            state[position] = 2;
        }
    }
}

fn breadcrumb(
    units: &[&Unit],
    parent_of: &[Option<usize>],
    position: usize,
    separator: &str,
) -> String {
    let mut names = Vec::new();
    let mut cursor = Some(position);
    while let Some(current) = cursor {
        names.push(units[current].name.as_str());
        cursor = parent_of[current];
    }
    names.reverse();
    names.join(separator)
}

/// Builds owned nodes bottom-up without recursion.
fn build_nodes(units: &[&Unit], children: &[Vec<usize>], roots: &[usize]) -> Vec<TreeNode> {
    let mut preorder = Vec::with_capacity(units.len());
    let mut stack: Vec<usize> = roots.iter().rev().copied().collect();
    while let Some(position) = stack.pop() {
        preorder.push(position);
        stack.extend(children[position].iter().rev().copied());
    }

    let mut built: Vec<Option<TreeNode>> = vec![None; units.len()];
    for &position in preorder.iter().rev() {
        let nested = children[position]
            .iter()
            .filter_map(|child| built[*child].take())
            .collect();
        built[position] = Some(TreeNode {
            unit: units[position].clone(),
            children: nested,
        });
    }

    roots
        .iter()
        .filter_map(|position| built[*position].take())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::materialize_tree;
    use crate::model::unit::Unit;

    fn unit(id: i64, name: &str, parent_id: Option<i64>, level: i64) -> Unit {
        let mut unit = Unit::new(id, name);
        unit.parent_id = parent_id;
        unit.level = level;
        unit
    }

    fn ids(nodes: &[super::TreeNode]) -> Vec<i64> {
        nodes.iter().map(|node| node.unit.id).collect()
    }

    #[test]
    fn dangling_parent_becomes_root() {
        let units = vec![
            unit(1, "Root", None, 0),
            unit(2, "A", Some(1), 1),
            unit(3, "B", Some(1), 1),
            unit(4, "Orphan", Some(99), 1),
        ];
        let tree = materialize_tree(&units, " / ");
        assert_eq!(ids(&tree.roots), vec![1, 4]);
        assert_eq!(ids(&tree.roots[0].children), vec![2, 3]);
        assert!(tree.roots[1].children.is_empty());
        assert_eq!(tree.breadcrumb(4), Some("Orphan"));
    }

    #[test]
    fn breadcrumbs_join_root_to_node_names() {
        let units = vec![
            unit(3, "School", Some(2), 2),
            unit(1, "Country", None, 0),
            unit(2, "City", Some(1), 1),
        ];
        let tree = materialize_tree(&units, " / ");
        assert_eq!(tree.breadcrumb(3), Some("Country / City / School"));
        assert_eq!(tree.breadcrumb(1), Some("Country"));
        assert_eq!(tree.rows[0].id, 3);
        assert_eq!(ids(&tree.roots), vec![1]);
        assert_eq!(ids(&tree.roots[0].children[0].children), vec![3]);
    }

    #[test]
    fn cycle_is_cut_and_every_unit_appears_once() {
        let units = vec![
            unit(1, "A", Some(2), 0),
            unit(2, "B", Some(1), 1),
            unit(3, "C", Some(2), 2),
        ];
        let tree = materialize_tree(&units, "/");
        assert_eq!(ids(&tree.roots), vec![1]);
        assert_eq!(ids(&tree.roots[0].children), vec![2]);
        assert_eq!(ids(&tree.roots[0].children[0].children), vec![3]);
        assert_eq!(tree.breadcrumb(3), Some("A/B/C"));
    }

    #[test]
    fn duplicate_ids_keep_first_occurrence() {
        let units = vec![unit(1, "First", None, 0), unit(1, "Second", None, 0)];
        let tree = materialize_tree(&units, " / ");
        assert_eq!(tree.rows.len(), 1);
        assert_eq!(tree.roots[0].unit.name, "First");
    }

    #[test]
    fn deep_chain_builds_without_recursion() {
        let units: Vec<Unit> = (0..1_000)
            .map(|id| unit(id, "n", if id == 0 { None } else { Some(id - 1) }, id))
            .collect();
        let tree = materialize_tree(&units, "/");
        assert_eq!(tree.roots.len(), 1);
        let mut depth = 0;
        let mut node = &tree.roots[0];
        while let Some(child) = node.children.first() {
            node = child;
            depth += 1;
        }
        assert_eq!(depth, 999);
    }
}
