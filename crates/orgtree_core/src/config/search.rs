use super::env::{parse_enabled_default_true, read_env_f64, read_env_usize};

const ENV_SIMILARITY_THRESHOLD: &str = "ORGTREE_SIMILARITY_THRESHOLD";
const ENV_SEARCH_DEFAULT_LIMIT: &str = "ORGTREE_SEARCH_DEFAULT_LIMIT";
const ENV_SEARCH_MAX_LIMIT: &str = "ORGTREE_SEARCH_MAX_LIMIT";
const ENV_RANK_MATCH_POSITION: &str = "ORGTREE_RANK_MATCH_POSITION";
const ENV_RANK_NAME_LENGTH: &str = "ORGTREE_RANK_NAME_LENGTH";

const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.2;
const DEFAULT_SEARCH_LIMIT: usize = 20;
const DEFAULT_SEARCH_MAX_LIMIT: usize = 100;

/// Smallest page size accepted by search.
pub const MIN_SEARCH_LIMIT: usize = 1;

/// Fuzzy tier candidate filter and tie-break tiers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RankingConfig {
    /// Names must score strictly above this value (0..=1) unless they
    /// contain the query literally.
    pub similarity_threshold: f64,
    /// Rank earlier literal occurrences of the query first.
    pub match_position_tier: bool,
    /// Rank shorter names first.
    pub name_length_tier: bool,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
            match_position_tier: true,
            name_length_tier: true,
        }
    }
}

impl RankingConfig {
    #[must_use]
    fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            similarity_threshold: read_env_f64(ENV_SIMILARITY_THRESHOLD)
                .map(|value| value.clamp(0.0, 1.0))
                .unwrap_or(defaults.similarity_threshold),
            match_position_tier: parse_enabled_default_true(
                std::env::var(ENV_RANK_MATCH_POSITION).ok().as_deref(),
            ),
            name_length_tier: parse_enabled_default_true(
                std::env::var(ENV_RANK_NAME_LENGTH).ok().as_deref(),
            ),
        }
    }
}

/// Search paging policy and ranking settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchConfig {
    pub ranking: RankingConfig,
    /// Page size applied when the caller does not provide one.
    pub default_limit: usize,
    /// Largest accepted page size.
    pub max_limit: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            ranking: RankingConfig::default(),
            default_limit: DEFAULT_SEARCH_LIMIT,
            max_limit: DEFAULT_SEARCH_MAX_LIMIT,
        }
    }
}

impl SearchConfig {
    #[must_use]
    pub(super) fn from_env() -> Self {
        let defaults = Self::default();
        let max_limit = read_env_usize(ENV_SEARCH_MAX_LIMIT, defaults.max_limit, MIN_SEARCH_LIMIT);
        let default_limit =
            read_env_usize(ENV_SEARCH_DEFAULT_LIMIT, defaults.default_limit, MIN_SEARCH_LIMIT)
                .min(max_limit);
        Self {
            ranking: RankingConfig::from_env(),
            default_limit,
            max_limit,
        }
    }

    /// Applies the page-size policy: missing -> default, then clamp to bounds.
    #[must_use]
    pub fn clamp_limit(&self, limit: Option<usize>) -> usize {
        limit
            .unwrap_or(self.default_limit)
            .clamp(MIN_SEARCH_LIMIT, self.max_limit.max(MIN_SEARCH_LIMIT))
    }

    /// Returns whether `limit` lies within the accepted bounds.
    #[must_use]
    pub fn limit_in_bounds(&self, limit: usize) -> bool {
        (MIN_SEARCH_LIMIT..=self.max_limit).contains(&limit)
    }
}

#[cfg(test)]
mod tests {
    use super::super::env::parse_enabled_default_true;
    use super::SearchConfig;

    #[test]
    fn default_config_uses_reference_policy() {
        let config = SearchConfig::default();
        assert_eq!(config.default_limit, 20);
        assert_eq!(config.max_limit, 100);
        assert!((config.ranking.similarity_threshold - 0.2).abs() < f64::EPSILON);
        assert!(config.ranking.match_position_tier);
        assert!(config.ranking.name_length_tier);
    }

    #[test]
    fn clamp_limit_applies_default_and_bounds() {
        let config = SearchConfig::default();
        assert_eq!(config.clamp_limit(None), 20);
        assert_eq!(config.clamp_limit(Some(0)), 1);
        assert_eq!(config.clamp_limit(Some(500)), 100);
        assert_eq!(config.clamp_limit(Some(42)), 42);
    }

    #[test]
    fn limit_bounds_are_inclusive() {
        let config = SearchConfig::default();
        assert!(config.limit_in_bounds(1));
        assert!(config.limit_in_bounds(100));
        assert!(!config.limit_in_bounds(0));
        assert!(!config.limit_in_bounds(101));
    }

    #[test]
    fn tier_switch_parser_defaults_to_enabled() {
        assert!(parse_enabled_default_true(None));
        assert!(parse_enabled_default_true(Some("on")));
        assert!(!parse_enabled_default_true(Some(" OFF ")));
        assert!(!parse_enabled_default_true(Some("0")));
    }
}
