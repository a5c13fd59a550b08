//! Unit store contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide the read-only query shapes the core algorithms are built on.
//! - Keep SQL details (similarity functions, recursive CTEs) inside the
//!   repository boundary.
//!
//! # Invariants
//! - Every listing is returned in a fixed order so repeated calls over
//!   unchanged data yield identical sequences.
//! - Rows that violate column constraints are reported as `InvalidData`,
//!   never silently coerced.

use crate::db::migrations::latest_version;
use crate::db::DbError;
use crate::model::unit::{Unit, UnitId, BIN_MAX_LEN, CODE_MAX_LEN};
use crate::search::trigram::QueryTrigrams;
use rusqlite::{params, Connection, Row, ToSql};
use std::collections::{BTreeMap, HashSet};
use std::error::Error;
use std::fmt::{Display, Formatter};

const UNIT_COLUMNS: &str = "id,
    name,
    bin,
    code,
    code_abp,
    parent_id,
    level,
    direct_children_count,
    total_descendants_count";

/// Result type used by unit repository operations.
pub type UnitRepoResult<T> = Result<T, UnitRepoError>;

/// Errors from unit repository operations.
#[derive(Debug)]
pub enum UnitRepoError {
    /// Underlying SQLite/bootstrap error.
    Db(DbError),
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    /// Required table is missing.
    MissingRequiredTable(&'static str),
    /// Required column is missing from expected table.
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
    /// Persisted data cannot be converted to a valid unit.
    InvalidData(String),
}

impl Display for UnitRepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "unit repository requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "unit repository requires table `{table}`")
            }
            Self::MissingRequiredColumn { table, column } => write!(
                f,
                "unit repository requires column `{column}` in table `{table}`"
            ),
            Self::InvalidData(message) => write!(f, "invalid unit data: {message}"),
        }
    }
}

impl Error for UnitRepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::UninitializedConnection { .. } => None,
            Self::MissingRequiredTable(_) => None,
            Self::MissingRequiredColumn { .. } => None,
            Self::InvalidData(_) => None,
        }
    }
}

impl From<DbError> for UnitRepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for UnitRepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Identifier field compared by exact equality.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExactField<'a> {
    /// `bin = value`.
    Bin(&'a str),
    /// `code = value`.
    Code(&'a str),
    /// `code_abp = value` compared numerically.
    CodeAbp(i32),
    /// Decimal text form of `code_abp` equals `value`.
    CodeAbpText(&'a str),
    /// `name = value`, case-sensitive.
    Name(&'a str),
}

/// Trigram metric used by [`UnitRepository::find_by_similarity`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimilarityMetric {
    /// `similarity(name, text)`.
    Whole,
    /// `word_similarity(text, name)`.
    Word,
}

/// Unit returned together with its similarity score.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredUnit {
    pub unit: Unit,
    pub score: f64,
}

/// Read-only unit store consumed by the core.
pub trait UnitRepository {
    /// Loads one unit by id.
    fn find_by_id(&self, id: UnitId) -> UnitRepoResult<Option<Unit>>;

    /// Lists units whose `parent_id` equals `parent_id` (roots for `None`).
    fn find_by_parent(&self, parent_id: Option<UnitId>) -> UnitRepoResult<Vec<Unit>>;

    /// Lists units whose field equals the given value.
    fn find_by_exact_field(&self, field: ExactField<'_>) -> UnitRepoResult<Vec<Unit>>;

    /// Lists units whose name scores strictly above `threshold` under `metric`.
    fn find_by_similarity(
        &self,
        text: &str,
        threshold: f64,
        metric: SimilarityMetric,
    ) -> UnitRepoResult<Vec<ScoredUnit>>;

    /// Lists units whose name contains `text`, case-insensitively.
    fn find_by_name_fragment(&self, text: &str) -> UnitRepoResult<Vec<Unit>>;

    /// Lists fuzzy candidates for `text`, ordered by id: names containing it
    /// case-insensitively or scoring strictly above `threshold` on either
    /// metric. `score` is the better of both metrics.
    fn find_fuzzy_candidates(
        &self,
        text: &str,
        threshold: f64,
    ) -> UnitRepoResult<Vec<ScoredUnit>> {
        let mut candidates = BTreeMap::new();
        for unit in self.find_by_name_fragment(text)? {
            candidates.entry(unit.id).or_insert(unit);
        }
        for metric in [SimilarityMetric::Whole, SimilarityMetric::Word] {
            for scored in self.find_by_similarity(text, threshold, metric)? {
                candidates.entry(scored.unit.id).or_insert(scored.unit);
            }
        }

        let query = QueryTrigrams::new(text);
        Ok(candidates
            .into_values()
            .map(|unit| ScoredUnit {
                score: query.best_score(&unit.name),
                unit,
            })
            .collect())
    }

    /// Returns the deepest `level` in the store, `None` when empty.
    fn max_level(&self) -> UnitRepoResult<Option<i64>>;

    /// Loads every unit. Used by bulk export only.
    fn all_units(&self) -> UnitRepoResult<Vec<Unit>>;

    /// Returns `id` followed by its ancestors, nearest first.
    ///
    /// Walks at most `max_depth` parent links. A walk that revisits a unit
    /// stops right after the repeated unit so callers can see the cycle.
    fn ancestor_chain(&self, id: UnitId, max_depth: usize) -> UnitRepoResult<Vec<Unit>> {
        let mut chain = Vec::new();
        let mut visited = HashSet::new();
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            let Some(unit) = self.find_by_id(current)? else {
                break;
            };
            let repeated = !visited.insert(unit.id);
            cursor = unit.parent_id;
            chain.push(unit);
            if repeated || chain.len() > max_depth {
                break;
            }
        }
        Ok(chain)
    }
}

/// SQLite-backed unit repository.
pub struct SqliteUnitRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteUnitRepository<'conn> {
    /// Creates repository from migrated connection.
    pub fn try_new(conn: &'conn Connection) -> UnitRepoResult<Self> {
        ensure_unit_connection_ready(conn)?;
        Ok(Self { conn })
    }

    fn query_units(&self, sql: &str, params: &[&dyn ToSql]) -> UnitRepoResult<Vec<Unit>> {
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = stmt.query(params)?;
        let mut units = Vec::new();
        while let Some(row) = rows.next()? {
            units.push(parse_unit_row(row)?);
        }
        Ok(units)
    }
}

impl UnitRepository for SqliteUnitRepository<'_> {
    fn find_by_id(&self, id: UnitId) -> UnitRepoResult<Option<Unit>> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {UNIT_COLUMNS} FROM units WHERE id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_unit_row(row)?));
        }
        Ok(None)
    }

    fn find_by_parent(&self, parent_id: Option<UnitId>) -> UnitRepoResult<Vec<Unit>> {
        match parent_id {
            Some(parent_id) => self.query_units(
                &format!("SELECT {UNIT_COLUMNS} FROM units WHERE parent_id = ?1 ORDER BY id ASC;"),
                &[&parent_id],
            ),
            None => self.query_units(
                &format!("SELECT {UNIT_COLUMNS} FROM units WHERE parent_id IS NULL ORDER BY id ASC;"),
                &[],
            ),
        }
    }

    fn find_by_exact_field(&self, field: ExactField<'_>) -> UnitRepoResult<Vec<Unit>> {
        let (predicate, value): (&str, &dyn ToSql) = match &field {
            ExactField::Bin(value) => ("bin = ?1", value),
            ExactField::Code(value) => ("code = ?1", value),
            ExactField::CodeAbp(value) => ("code_abp = ?1", value),
            ExactField::CodeAbpText(value) => ("CAST(code_abp AS TEXT) = ?1", value),
            ExactField::Name(value) => ("name = ?1", value),
        };
        self.query_units(
            &format!("SELECT {UNIT_COLUMNS} FROM units WHERE {predicate} ORDER BY id ASC;"),
            &[value],
        )
    }

    fn find_by_similarity(
        &self,
        text: &str,
        threshold: f64,
        metric: SimilarityMetric,
    ) -> UnitRepoResult<Vec<ScoredUnit>> {
        let score_expr = match metric {
            SimilarityMetric::Whole => "similarity(name, ?1)",
            SimilarityMetric::Word => "word_similarity(?1, name)",
        };
        let mut stmt = self.conn.prepare(&format!(
            "SELECT * FROM (
                SELECT {UNIT_COLUMNS}, {score_expr} AS score
                FROM units
             )
             WHERE score > ?2
             ORDER BY score DESC, id ASC;"
        ))?;
        let mut rows = stmt.query(params![text, threshold])?;
        let mut scored = Vec::new();
        while let Some(row) = rows.next()? {
            scored.push(ScoredUnit {
                unit: parse_unit_row(row)?,
                score: row.get("score")?,
            });
        }
        Ok(scored)
    }

    fn find_by_name_fragment(&self, text: &str) -> UnitRepoResult<Vec<Unit>> {
        let needle = text.to_lowercase();
        self.query_units(
            &format!(
                "SELECT {UNIT_COLUMNS} FROM units
                 WHERE instr(casefold(name), ?1) > 0
                 ORDER BY id ASC;"
            ),
            &[&needle],
        )
    }

    fn find_fuzzy_candidates(
        &self,
        text: &str,
        threshold: f64,
    ) -> UnitRepoResult<Vec<ScoredUnit>> {
        let needle = text.to_lowercase();
        let index_match = name_index_match(text);
        let narrowing = if index_match.is_some() {
            "WHERE id IN (SELECT rowid FROM unit_name_index WHERE unit_name_index MATCH ?4)"
        } else {
            ""
        };
        let mut stmt = self.conn.prepare(&format!(
            "SELECT * FROM (
                SELECT {UNIT_COLUMNS},
                       trigram_score(name, ?1) AS score,
                       instr(casefold(name), ?2) > 0 AS contains_text
                FROM units
                {narrowing}
             )
             WHERE contains_text OR score > ?3
             ORDER BY id ASC;"
        ))?;

        let mut values: Vec<&dyn ToSql> = vec![&text, &needle, &threshold];
        if let Some(index_match) = &index_match {
            values.push(index_match);
        }
        let mut rows = stmt.query(values.as_slice())?;
        let mut scored = Vec::new();
        while let Some(row) = rows.next()? {
            scored.push(ScoredUnit {
                unit: parse_unit_row(row)?,
                score: row.get("score")?,
            });
        }
        Ok(scored)
    }

    fn max_level(&self) -> UnitRepoResult<Option<i64>> {
        let level = self.conn.query_row("SELECT MAX(level) FROM units;", [], |row| {
            row.get::<_, Option<i64>>(0)
        })?;
        Ok(level)
    }

    fn all_units(&self) -> UnitRepoResult<Vec<Unit>> {
        self.query_units(
            &format!("SELECT {UNIT_COLUMNS} FROM units ORDER BY id ASC;"),
            &[],
        )
    }

    fn ancestor_chain(&self, id: UnitId, max_depth: usize) -> UnitRepoResult<Vec<Unit>> {
        let max_depth = i64::try_from(max_depth).unwrap_or(i64::MAX);
        self.query_units(
            &format!(
                "WITH RECURSIVE chain(unit_id, next_id, depth) AS (
                    SELECT id, parent_id, 0
                    FROM units
                    WHERE id = ?1
                    UNION ALL
                    SELECT u.id, u.parent_id, c.depth + 1
                    FROM units u
                    INNER JOIN chain c ON u.id = c.next_id
                    WHERE c.depth < ?2
                 )
                 SELECT {UNIT_COLUMNS}
                 FROM chain
                 INNER JOIN units ON units.id = chain.unit_id
                 ORDER BY chain.depth ASC;"
            ),
            &[&id, &max_depth],
        )
    }
}

/// Builds an FTS5 query over `unit_name_index` that selects every unit whose
/// name contains `text` or shares at least one trigram with it.
///
/// Returns `None` for texts shorter than one trigram, which the index cannot
/// look up; callers scan all names instead.
fn name_index_match(text: &str) -> Option<String> {
    if text.chars().count() < 3 {
        return None;
    }
    let mut phrases = vec![quote_phrase(text)];
    phrases.extend(
        QueryTrigrams::new(text)
            .sorted()
            .iter()
            .map(|trigram| quote_phrase(&trigram.iter().collect::<String>())),
    );
    Some(phrases.join(" OR "))
}

fn quote_phrase(raw: &str) -> String {
    let escaped = raw.replace('"', "\"\"");
    format!("\"{escaped}\"")
}

fn parse_unit_row(row: &Row<'_>) -> UnitRepoResult<Unit> {
    let id: UnitId = row.get("id")?;
    let code_abp = row
        .get::<_, Option<i64>>("code_abp")?
        .map(|value| {
            i32::try_from(value).map_err(|_| {
                UnitRepoError::InvalidData(format!(
                    "code_abp `{value}` of unit {id} is outside the 32-bit range"
                ))
            })
        })
        .transpose()?;

    let level: i64 = row.get("level")?;
    if level < 0 {
        return Err(UnitRepoError::InvalidData(format!(
            "negative level `{level}` for unit {id}"
        )));
    }

    Ok(Unit {
        id,
        name: row.get("name")?,
        bin: bounded_text(row, "bin", BIN_MAX_LEN, id)?,
        code: bounded_text(row, "code", CODE_MAX_LEN, id)?,
        code_abp,
        parent_id: row.get("parent_id")?,
        level,
        direct_children_count: row.get("direct_children_count")?,
        total_descendants_count: row.get("total_descendants_count")?,
    })
}

fn bounded_text(
    row: &Row<'_>,
    column: &str,
    max_len: usize,
    id: UnitId,
) -> UnitRepoResult<Option<String>> {
    let value: Option<String> = row.get(column)?;
    match value {
        Some(text) if text.chars().count() > max_len => Err(UnitRepoError::InvalidData(format!(
            "{column} of unit {id} exceeds {max_len} characters"
        ))),
        other => Ok(other),
    }
}

fn ensure_unit_connection_ready(conn: &Connection) -> UnitRepoResult<()> {
    let expected_version = latest_version();
    let actual_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    if actual_version != expected_version {
        return Err(UnitRepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    if !table_exists(conn, "units")? {
        return Err(UnitRepoError::MissingRequiredTable("units"));
    }

    for column in [
        "id",
        "name",
        "bin",
        "code",
        "code_abp",
        "parent_id",
        "level",
        "direct_children_count",
        "total_descendants_count",
    ] {
        if !table_has_column(conn, "units", column)? {
            return Err(UnitRepoError::MissingRequiredColumn {
                table: "units",
                column,
            });
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> UnitRepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> UnitRepoResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::name_index_match;

    #[test]
    fn short_text_cannot_use_the_name_index() {
        assert_eq!(name_index_match("ab"), None);
        assert_eq!(name_index_match("шк"), None);
    }

    #[test]
    fn index_match_ors_literal_text_with_each_trigram() {
        let expression = name_index_match("Cat").expect("three characters are indexable");
        assert_eq!(
            expression,
            "\"Cat\" OR \"  c\" OR \" ca\" OR \"at \" OR \"cat\""
        );
    }

    #[test]
    fn index_match_escapes_quotes() {
        let expression = name_index_match("a\"b").expect("three characters are indexable");
        assert!(expression.starts_with("\"a\"\"b\" OR "));
    }
}
