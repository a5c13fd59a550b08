//! Ranked unit search.
//!
//! # Responsibility
//! - Match query text against unit identifiers (exact tier) and names
//!   (fuzzy tier, trigram similarity).
//! - Assemble both tiers into deterministic, paginated result pages.

pub mod assemble;
pub mod exact;
pub mod fuzzy;
pub mod rank;
pub mod trigram;
