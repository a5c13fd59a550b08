//! Fuzzy tier ordering key.
//!
//! The key is a tuple compared tier by tier instead of a blended score:
//! 1. case-insensitive full name equality (true first)
//! 2. case-insensitive prefix match (true first)
//! 3. `max(word_similarity, similarity)` (higher first)
//! 4. character offset of the first literal occurrence (lower first, absent last)
//! 5. name length in characters (shorter first)
//! 6. unit id (lower first)
//!
//! Tiers 4 and 5 can be switched off through [`RankingConfig`]; tier 6 keeps
//! the order total either way.

use crate::config::RankingConfig;
use crate::model::unit::{Unit, UnitId};
use std::cmp::Ordering;

/// Precomputed ranking tiers for one fuzzy candidate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FuzzyRankKey {
    pub name_equals_query: bool,
    pub name_starts_with_query: bool,
    pub score: f64,
    pub match_position: Option<usize>,
    pub name_length: usize,
    pub id: UnitId,
}

impl FuzzyRankKey {
    /// Builds the key for `unit` against an already lower-cased query.
    ///
    /// `score` is `max(word_similarity, similarity)` of the name.
    pub fn new(unit: &Unit, folded_query: &str, score: f64) -> Self {
        let folded_name = unit.name.to_lowercase();
        let match_position = folded_name
            .find(folded_query)
            .map(|byte_offset| folded_name[..byte_offset].chars().count());
        Self {
            name_equals_query: folded_name == folded_query,
            name_starts_with_query: folded_name.starts_with(folded_query),
            score,
            match_position,
            name_length: unit.name.chars().count(),
            id: unit.id,
        }
    }

    /// Compares two keys; `Ordering::Less` means `self` ranks first.
    pub fn compare(&self, other: &Self, config: &RankingConfig) -> Ordering {
        other
            .name_equals_query
            .cmp(&self.name_equals_query)
            .then_with(|| other.name_starts_with_query.cmp(&self.name_starts_with_query))
            .then_with(|| other.score.total_cmp(&self.score))
            .then_with(|| {
                if config.match_position_tier {
                    compare_position(self.match_position, other.match_position)
                } else {
                    Ordering::Equal
                }
            })
            .then_with(|| {
                if config.name_length_tier {
                    self.name_length.cmp(&other.name_length)
                } else {
                    Ordering::Equal
                }
            })
            .then_with(|| self.id.cmp(&other.id))
    }
}

fn compare_position(left: Option<usize>, right: Option<usize>) -> Ordering {
    match (left, right) {
        (Some(left), Some(right)) => left.cmp(&right),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use super::FuzzyRankKey;
    use crate::config::RankingConfig;
    use crate::model::unit::Unit;
    use std::cmp::Ordering;

    fn key(id: i64, name: &str, query: &str, score: f64) -> FuzzyRankKey {
        FuzzyRankKey::new(&Unit::new(id, name), &query.to_lowercase(), score)
    }

    #[test]
    fn equality_outranks_higher_similarity() {
        let config = RankingConfig::default();
        let equal = key(2, "School", "school", 0.3);
        let similar = key(1, "School 1", "school", 0.9);
        assert_eq!(equal.compare(&similar, &config), Ordering::Less);
    }

    #[test]
    fn prefix_outranks_similarity() {
        let config = RankingConfig::default();
        let prefix = key(1, "Schools of region", "school", 0.3);
        let inner = key(2, "Old school", "school", 0.9);
        assert_eq!(prefix.compare(&inner, &config), Ordering::Less);
    }

    #[test]
    fn earlier_position_then_shorter_name_then_id() {
        let config = RankingConfig::default();
        let early = key(5, "a school b", "school", 0.5);
        let late = key(4, "abc school", "school", 0.5);
        assert_eq!(early.compare(&late, &config), Ordering::Less);

        let short = key(9, "x school", "school", 0.5);
        let long = key(8, "x school xyz", "school", 0.5);
        assert_eq!(short.compare(&long, &config), Ordering::Less);

        let first = key(1, "x school", "school", 0.5);
        let second = key(2, "x school", "school", 0.5);
        assert_eq!(first.compare(&second, &config), Ordering::Less);
    }

    #[test]
    fn missing_literal_occurrence_sorts_last_within_tier() {
        let config = RankingConfig::default();
        let literal = key(2, "big school", "school", 0.5);
        let typo = key(1, "skool", "school", 0.5);
        assert_eq!(literal.match_position, Some(4));
        assert_eq!(typo.match_position, None);
        assert_eq!(literal.compare(&typo, &config), Ordering::Less);
    }

    #[test]
    fn disabled_tiers_fall_through_to_id() {
        let disabled = RankingConfig {
            match_position_tier: false,
            name_length_tier: false,
            ..RankingConfig::default()
        };
        let late = key(1, "xy school", "school", 0.5);
        let early = key(2, "x school with a long tail", "school", 0.5);
        assert_eq!(late.compare(&early, &RankingConfig::default()), Ordering::Greater);
        assert_eq!(late.compare(&early, &disabled), Ordering::Less);
    }

    #[test]
    fn position_counts_characters_not_bytes() {
        let key = key(1, "Школа 201", "201", 0.5);
        assert_eq!(key.match_position, Some(6));
    }
}
