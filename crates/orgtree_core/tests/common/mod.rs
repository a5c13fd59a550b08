//! Shared seeding helpers for integration tests.
//!
//! The core has no write path, so fixtures go straight into `units`.

#![allow(dead_code)]

use orgtree_core::db::open_db_in_memory;
use rusqlite::{params, Connection};

/// One row to insert into `units`.
#[derive(Debug, Clone, Default)]
pub struct Seed {
    pub id: i64,
    pub name: String,
    pub bin: Option<&'static str>,
    pub code: Option<&'static str>,
    pub code_abp: Option<i64>,
    pub parent_id: Option<i64>,
    pub level: i64,
}

impl Seed {
    pub fn root(id: i64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn child(id: i64, name: impl Into<String>, parent_id: i64, level: i64) -> Self {
        Self {
            id,
            name: name.into(),
            parent_id: Some(parent_id),
            level,
            ..Self::default()
        }
    }

    pub fn bin(mut self, bin: &'static str) -> Self {
        self.bin = Some(bin);
        self
    }

    pub fn code(mut self, code: &'static str) -> Self {
        self.code = Some(code);
        self
    }

    pub fn code_abp(mut self, code_abp: i64) -> Self {
        self.code_abp = Some(code_abp);
        self
    }
}

pub fn setup() -> Connection {
    open_db_in_memory().unwrap()
}

pub fn seeded(rows: &[Seed]) -> Connection {
    let conn = setup();
    insert_all(&conn, rows);
    conn
}

pub fn insert_all(conn: &Connection, rows: &[Seed]) {
    for row in rows {
        conn.execute(
            "INSERT INTO units (id, name, bin, code, code_abp, parent_id, level)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);",
            params![
                row.id,
                row.name,
                row.bin,
                row.code,
                row.code_abp,
                row.parent_id,
                row.level
            ],
        )
        .unwrap();
    }
}

/// Country -> Region -> City -> School chain plus a second root.
pub fn country_fixture() -> Vec<Seed> {
    vec![
        Seed::root(1, "Republic"),
        Seed::child(2, "North Region", 1, 1).code("NR"),
        Seed::child(3, "Capital City", 2, 2).bin("123456789012"),
        Seed::child(4, "School 201", 3, 3),
        Seed::child(5, "Department of Education", 3, 3).code_abp(201),
        Seed::root(6, "Alpha Holding"),
    ]
}
