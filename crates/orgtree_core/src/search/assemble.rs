//! Result assembler: exact tier first, fuzzy tier filling the page.
//!
//! # Responsibility
//! - Validate search requests before any store access.
//! - Merge exact and fuzzy streams into one deduplicated, paginated page.
//!
//! # Invariants
//! - Exact-identifier hits always precede fuzzy hits, whatever the score.
//! - A unit matched by both tiers appears once, as an exact hit.
//! - Identifier equality uses the query as given; only blank detection and
//!   the fuzzy tier trim it.
//! - Pages over the same data concatenate to the unpaged sequence.

use crate::config::SearchConfig;
use crate::model::unit::Unit;
use crate::repo::unit_repo::{UnitRepoError, UnitRepository};
use crate::search::exact::{match_exact, ExactMode};
use crate::search::fuzzy::match_fuzzy;
use log::info;
use serde::Serialize;
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

/// Result type for search APIs.
pub type SearchResult<T> = Result<T, SearchError>;

/// Search-layer error for request validation and store access.
#[derive(Debug)]
pub enum SearchError {
    /// Caller-supplied parameter violates the request contract.
    InvalidQuery {
        field: &'static str,
        message: String,
    },
    Repo(UnitRepoError),
}

impl Display for SearchError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidQuery { field, message } => {
                write!(f, "invalid search `{field}`: {message}")
            }
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for SearchError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidQuery { .. } => None,
            Self::Repo(err) => Some(err),
        }
    }
}

impl From<UnitRepoError> for SearchError {
    fn from(value: UnitRepoError) -> Self {
        Self::Repo(value)
    }
}

/// One search page request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    /// Query text. Identifiers are compared verbatim; the fuzzy tier ignores
    /// surrounding whitespace.
    pub text: String,
    /// Exact-only mode: identifiers and name equality, no fuzzy fallback.
    pub exact: bool,
    /// Page size; must lie within the configured bounds.
    pub limit: usize,
    /// Number of leading results to skip.
    pub offset: usize,
}

impl SearchRequest {
    /// Creates a fuzzy-mode request for the first page of `limit` results.
    pub fn new(text: impl Into<String>, limit: usize) -> Self {
        Self {
            text: text.into(),
            exact: false,
            limit,
            offset: 0,
        }
    }

    /// Creates a request with the page-size policy of `config` applied.
    ///
    /// Transports call this so out-of-range sizes are clamped rather than
    /// rejected.
    pub fn clamped(
        text: impl Into<String>,
        exact: bool,
        limit: Option<usize>,
        offset: Option<usize>,
        config: &SearchConfig,
    ) -> Self {
        Self {
            text: text.into(),
            exact,
            limit: config.clamp_limit(limit),
            offset: offset.unwrap_or(0),
        }
    }
}

/// Tier a search hit was produced by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchTier {
    Exact,
    Fuzzy,
}

/// Single search hit returned by [`search_units`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchHit {
    #[serde(flatten)]
    pub unit: Unit,
    pub tier: MatchTier,
    /// Best trigram score; `None` for exact hits.
    pub score: Option<f64>,
}

/// Searches units and returns one ranked page.
///
/// # Errors
/// - `InvalidQuery` for blank text or a limit outside the configured bounds;
///   the store is not touched in that case.
/// - `Repo` for store failures, unchanged.
pub fn search_units<R>(
    repo: &R,
    request: &SearchRequest,
    config: &SearchConfig,
) -> SearchResult<Vec<SearchHit>>
where
    R: UnitRepository + ?Sized,
{
    let fuzzy_query = validate_request(request, config)?;
    let query = request.text.as_str();
    let started_at = Instant::now();
    let window_end = request.offset.saturating_add(request.limit);

    if request.exact {
        let exact = match_exact(repo, query, ExactMode::IdentifiersAndName)?;
        let exact_count = exact.len();
        let page = page_of(exact.into_iter().map(exact_hit), request);
        log_search("exact", query, exact_count, 0, page.len(), started_at);
        return Ok(page);
    }

    let exact = match_exact(repo, query, ExactMode::Identifiers)?;
    let exact_count = exact.len();
    if exact_count >= window_end {
        let page = page_of(exact.into_iter().map(exact_hit), request);
        log_search("fuzzy", query, exact_count, 0, page.len(), started_at);
        return Ok(page);
    }

    // Over-fetch by the exact count so dropped duplicates cannot shorten the window.
    let remaining = window_end - exact_count;
    let fuzzy = match_fuzzy(
        repo,
        fuzzy_query,
        remaining.saturating_add(exact_count),
        &config.ranking,
    )?;
    let fuzzy_count = fuzzy.len();

    let exact_ids: HashSet<_> = exact.iter().map(|unit| unit.id).collect();
    let merged = exact.into_iter().map(exact_hit).chain(
        fuzzy
            .into_iter()
            .filter(|hit| !exact_ids.contains(&hit.unit.id))
            .map(|hit| SearchHit {
                unit: hit.unit,
                tier: MatchTier::Fuzzy,
                score: Some(hit.key.score),
            }),
    );
    let page = page_of(merged, request);
    log_search("fuzzy", query, exact_count, fuzzy_count, page.len(), started_at);
    Ok(page)
}

fn validate_request<'a>(
    request: &'a SearchRequest,
    config: &SearchConfig,
) -> SearchResult<&'a str> {
    let query = request.text.trim();
    if query.is_empty() {
        return Err(SearchError::InvalidQuery {
            field: "query",
            message: "query must not be blank".to_string(),
        });
    }
    if !config.limit_in_bounds(request.limit) {
        return Err(SearchError::InvalidQuery {
            field: "limit",
            message: format!(
                "limit {} is outside 1..={}",
                request.limit, config.max_limit
            ),
        });
    }
    Ok(query)
}

fn exact_hit(unit: Unit) -> SearchHit {
    SearchHit {
        unit,
        tier: MatchTier::Exact,
        score: None,
    }
}

fn page_of(hits: impl Iterator<Item = SearchHit>, request: &SearchRequest) -> Vec<SearchHit> {
    hits.skip(request.offset).take(request.limit).collect()
}

fn log_search(
    mode: &str,
    query: &str,
    exact_hits: usize,
    fuzzy_hits: usize,
    returned: usize,
    started_at: Instant,
) {
    info!(
        "event=search module=search status=ok mode={} query_chars={} exact_hits={} fuzzy_hits={} returned={} duration_ms={}",
        mode,
        query.chars().count(),
        exact_hits,
        fuzzy_hits,
        returned,
        started_at.elapsed().as_millis()
    );
}
