mod common;

use common::{country_fixture, seeded, Seed};
use orgtree_core::repo::unit_repo::SqliteUnitRepository;
use orgtree_core::UnitService;

fn names(units: &[orgtree_core::Unit]) -> Vec<&str> {
    units.iter().map(|unit| unit.name.as_str()).collect()
}

#[test]
fn roots_are_sorted_by_name() {
    let conn = seeded(&[
        Seed::root(1, "Gamma"),
        Seed::root(2, "Alpha"),
        Seed::root(3, "Beta"),
    ]);
    let service = UnitService::new(SqliteUnitRepository::try_new(&conn).unwrap());

    let roots = service.list_children(None).unwrap();
    assert_eq!(names(&roots), vec!["Alpha", "Beta", "Gamma"]);
}

#[test]
fn children_are_one_level_only() {
    let conn = seeded(&country_fixture());
    let service = UnitService::new(SqliteUnitRepository::try_new(&conn).unwrap());

    let children = service.list_children(Some(1)).unwrap();
    assert_eq!(names(&children), vec!["North Region"]);
}

#[test]
fn ordering_ignores_case_and_breaks_ties_deterministically() {
    let conn = seeded(&[
        Seed::root(1, "Root"),
        Seed::child(2, "beta", 1, 1),
        Seed::child(3, "Alpha", 1, 1),
        Seed::child(4, "Beta", 1, 1),
        Seed::child(5, "alpha", 1, 1),
        Seed::child(6, "Alpha", 1, 1),
    ]);
    let service = UnitService::new(SqliteUnitRepository::try_new(&conn).unwrap());

    let first = service.list_children(Some(1)).unwrap();
    let second = service.list_children(Some(1)).unwrap();
    assert_eq!(first, second);

    let ids: Vec<i64> = first.iter().map(|unit| unit.id).collect();
    assert_eq!(ids, vec![3, 6, 5, 4, 2]);
}

#[test]
fn unknown_or_leaf_parent_has_no_children() {
    let conn = seeded(&country_fixture());
    let service = UnitService::new(SqliteUnitRepository::try_new(&conn).unwrap());

    assert!(service.list_children(Some(4)).unwrap().is_empty());
    assert!(service.list_children(Some(404)).unwrap().is_empty());
}
