//! Fuzzy name matcher.
//!
//! # Responsibility
//! - Fetch name candidates from the store in one lookup: literal substring
//!   hits plus trigram hits above the configured threshold.
//! - Rank candidates with [`FuzzyRankKey`] and cut to the requested count.
//!
//! # Invariants
//! - Every candidate carries the better of its whole-string and word scores.
//! - Output order is total: identical inputs give identical sequences.

use crate::config::RankingConfig;
use crate::model::unit::Unit;
use crate::repo::unit_repo::{UnitRepoResult, UnitRepository};
use crate::search::rank::FuzzyRankKey;
use log::debug;

/// One ranked fuzzy candidate.
#[derive(Debug, Clone, PartialEq)]
pub struct FuzzyHit {
    pub unit: Unit,
    pub key: FuzzyRankKey,
}

/// Returns at most `limit` units whose name resembles `query`, best first.
pub fn match_fuzzy<R>(
    repo: &R,
    query: &str,
    limit: usize,
    config: &RankingConfig,
) -> UnitRepoResult<Vec<FuzzyHit>>
where
    R: UnitRepository + ?Sized,
{
    if limit == 0 {
        return Ok(Vec::new());
    }

    let candidates = repo.find_fuzzy_candidates(query, config.similarity_threshold)?;
    let candidate_count = candidates.len();
    let folded_query = query.to_lowercase();
    let mut hits: Vec<FuzzyHit> = candidates
        .into_iter()
        .map(|candidate| FuzzyHit {
            key: FuzzyRankKey::new(&candidate.unit, &folded_query, candidate.score),
            unit: candidate.unit,
        })
        .collect();

    hits.sort_by(|left, right| left.key.compare(&right.key, config));
    hits.truncate(limit);

    debug!(
        "event=fuzzy_match module=search status=ok candidates={} returned={} limit={}",
        candidate_count,
        hits.len(),
        limit
    );
    Ok(hits)
}
