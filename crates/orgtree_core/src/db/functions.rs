//! Scalar SQL functions backing similarity lookups.
//!
//! SQLite has no trigram extension, so the store registers Rust
//! implementations under the names the queries use:
//! - `casefold(text)` -> Unicode lower-case text
//! - `similarity(a, b)` -> whole-string trigram similarity
//! - `word_similarity(a, b)` -> best extent of `b` matching `a`
//! - `trigram_score(name, query)` -> better of both metrics; the query's
//!   trigrams are built once per statement
//! - `trigram_text(name)` -> padded words fed to the name index
//!
//! NULL arguments yield NULL.

use crate::search::trigram::{self, QueryTrigrams};
use rusqlite::functions::FunctionFlags;
use rusqlite::types::ValueRef;
use rusqlite::Connection;

/// Registers all scalar functions on one connection.
pub fn register_functions(conn: &Connection) -> rusqlite::Result<()> {
    // Innocuous: the index triggers call these from the schema.
    let flags = FunctionFlags::SQLITE_UTF8
        | FunctionFlags::SQLITE_DETERMINISTIC
        | FunctionFlags::SQLITE_INNOCUOUS;

    conn.create_scalar_function("casefold", 1, flags, |ctx| {
        let value: Option<String> = ctx.get(0)?;
        Ok(value.map(|text| text.to_lowercase()))
    })?;

    conn.create_scalar_function("similarity", 2, flags, |ctx| {
        let left: Option<String> = ctx.get(0)?;
        let right: Option<String> = ctx.get(1)?;
        Ok(left
            .zip(right)
            .map(|(left, right)| trigram::similarity(&left, &right)))
    })?;

    conn.create_scalar_function("word_similarity", 2, flags, |ctx| {
        let left: Option<String> = ctx.get(0)?;
        let right: Option<String> = ctx.get(1)?;
        Ok(left
            .zip(right)
            .map(|(left, right)| trigram::word_similarity(&left, &right)))
    })?;

    conn.create_scalar_function("trigram_score", 2, flags, |ctx| {
        let name: Option<String> = ctx.get(0)?;
        if matches!(ctx.get_raw(1), ValueRef::Null) {
            return Ok(None);
        }
        let query = ctx.get_or_create_aux(1, |value| value.as_str().map(QueryTrigrams::new))?;
        Ok(name.map(|name| query.best_score(&name)))
    })?;

    conn.create_scalar_function("trigram_text", 1, flags, |ctx| {
        let name: Option<String> = ctx.get(0)?;
        Ok(name.map(|name| trigram::padded_words(&name)))
    })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::register_functions;
    use crate::search::trigram;
    use rusqlite::Connection;

    fn conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        register_functions(&conn).unwrap();
        conn
    }

    #[test]
    fn casefold_lowers_non_ascii_text() {
        let value: String = conn()
            .query_row("SELECT casefold('ШКОЛА Nr')", [], |row| row.get(0))
            .unwrap();
        assert_eq!(value, "школа nr");
    }

    #[test]
    fn similarity_functions_match_rust_metrics() {
        let conn = conn();
        let (whole, word): (f64, f64) = conn
            .query_row(
                "SELECT similarity('word', 'two words'), word_similarity('word', 'two words')",
                [],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .unwrap();
        assert!((whole - 0.363_636).abs() < 1e-4);
        assert!((word - 0.8).abs() < 1e-9);
    }

    #[test]
    fn null_arguments_produce_null() {
        let value: Option<f64> = conn()
            .query_row("SELECT similarity(NULL, 'x')", [], |row| row.get(0))
            .unwrap();
        assert!(value.is_none());
    }

    #[test]
    fn trigram_score_matches_rust_best_score() {
        let conn = conn();
        let mut stmt = conn
            .prepare(
                "SELECT name, trigram_score(name, ?1)
                 FROM (SELECT 'School 201' AS name UNION ALL SELECT 'Akimat of Almaty region');",
            )
            .unwrap();
        let rows: Vec<(String, f64)> = stmt
            .query_map(["almati"], |row| Ok((row.get(0)?, row.get(1)?)))
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(rows.len(), 2);
        for (name, score) in rows {
            assert_eq!(score, trigram::best_score(&name, "almati"));
        }
    }

    #[test]
    fn trigram_text_pads_each_word() {
        let value: String = conn()
            .query_row("SELECT trigram_text('Old School')", [], |row| row.get(0))
            .unwrap();
        assert_eq!(value, "  old   school ");
        let score: Option<f64> = conn()
            .query_row("SELECT trigram_score('x', NULL)", [], |row| row.get(0))
            .unwrap();
        assert!(score.is_none());
    }
}
