//! JSON renderings of a materialized snapshot.
//!
//! # Responsibility
//! - Render the nested view as a JSON array of root nodes.
//! - Render the flat view as a JSON array of rows carrying breadcrumbs.
//!
//! # Invariants
//! - Rendering never reorders nodes or rows.
//! - Unit fields are flattened into each node next to `children`.

use crate::tree::materialize::MaterializedTree;

/// Renders the nested parent -> children view.
pub fn to_nested_json(tree: &MaterializedTree, pretty: bool) -> serde_json::Result<String> {
    if pretty {
        serde_json::to_string_pretty(&tree.roots)
    } else {
        serde_json::to_string(&tree.roots)
    }
}

/// Renders one flat row per unit with its breadcrumb `path`.
pub fn to_rows_json(tree: &MaterializedTree, pretty: bool) -> serde_json::Result<String> {
    if pretty {
        serde_json::to_string_pretty(&tree.rows)
    } else {
        serde_json::to_string(&tree.rows)
    }
}

#[cfg(test)]
mod tests {
    use super::{to_nested_json, to_rows_json};
    use crate::model::unit::Unit;
    use crate::tree::materialize::materialize_tree;
    use serde_json::Value;

    fn sample() -> Vec<Unit> {
        let mut root = Unit::new(1, "Ministry");
        root.code = Some("M1".to_string());
        let mut child = Unit::new(2, "School 201");
        child.parent_id = Some(1);
        child.level = 1;
        child.code_abp = Some(201);
        vec![root, child]
    }

    #[test]
    fn nested_json_flattens_unit_fields_next_to_children() {
        let tree = materialize_tree(&sample(), " / ");
        let json = to_nested_json(&tree, false).expect("nested export should render");
        let value: Value = serde_json::from_str(&json).expect("export should be valid json");

        assert_eq!(value[0]["id"], 1);
        assert_eq!(value[0]["code"], "M1");
        assert_eq!(value[0]["children"][0]["name"], "School 201");
        assert_eq!(value[0]["children"][0]["code_abp"], 201);
        assert_eq!(
            value[0]["children"][0]["children"]
                .as_array()
                .map(Vec::len),
            Some(0)
        );
    }

    #[test]
    fn rows_json_carries_breadcrumb_paths() {
        let tree = materialize_tree(&sample(), " > ");
        let json = to_rows_json(&tree, true).expect("rows export should render");
        let value: Value = serde_json::from_str(&json).expect("export should be valid json");

        let rows = value.as_array().expect("rows should be an array");
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1]["path"], "Ministry > School 201");
        assert_eq!(rows[1]["parent_id"], 1);
        assert!(rows[0]["parent_id"].is_null());
        assert!(rows[0].get("children").is_none());
    }
}
