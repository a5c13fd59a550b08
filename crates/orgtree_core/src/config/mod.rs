//! Runtime configuration for search ranking and tree rendering.
//!
//! # Responsibility
//! - Hold policy constants (similarity threshold, page bounds, separators).
//! - Allow environment overrides without touching call sites.
//!
//! # Invariants
//! - Defaults reproduce the reference ranking behavior.
//! - Invalid environment values fall back to defaults instead of failing.

mod env;
mod search;

pub use search::{RankingConfig, SearchConfig};

const ENV_BREADCRUMB_SEPARATOR: &str = "ORGTREE_BREADCRUMB_SEPARATOR";

/// Default separator between names in a breadcrumb path.
pub const DEFAULT_BREADCRUMB_SEPARATOR: &str = " / ";

/// Aggregated core configuration.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CoreConfig {
    pub search: SearchConfig,
    pub tree: TreeConfig,
}

impl CoreConfig {
    /// Builds configuration from `ORGTREE_*` environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            search: SearchConfig::from_env(),
            tree: TreeConfig::from_env(),
        }
    }
}

/// Tree materialization settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeConfig {
    /// Separator placed between names in breadcrumb paths.
    pub breadcrumb_separator: String,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            breadcrumb_separator: DEFAULT_BREADCRUMB_SEPARATOR.to_string(),
        }
    }
}

impl TreeConfig {
    #[must_use]
    fn from_env() -> Self {
        // Not trimmed: blanks around the separator are significant.
        let separator = std::env::var(ENV_BREADCRUMB_SEPARATOR)
            .ok()
            .filter(|value| !value.is_empty());
        Self {
            breadcrumb_separator: separator
                .unwrap_or_else(|| DEFAULT_BREADCRUMB_SEPARATOR.to_string()),
        }
    }
}
