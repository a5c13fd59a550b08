//! Core engine of the organizational unit registry.
//! Path resolution, tree slices, ranked search and snapshot export live here;
//! transports only parse input and render output.

pub mod config;
pub mod db;
pub mod export;
pub mod logging;
pub mod model;
pub mod repo;
pub mod search;
pub mod service;
pub mod tree;

pub use config::{CoreConfig, RankingConfig, SearchConfig, TreeConfig};
pub use db::{open_db, open_db_in_memory, DbError, DbResult};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::unit::{Unit, UnitId, UnitWithChildren};
pub use repo::unit_repo::{
    SqliteUnitRepository, UnitRepoError, UnitRepoResult, UnitRepository,
};
pub use search::assemble::{
    search_units, MatchTier, SearchError, SearchHit, SearchRequest, SearchResult,
};
pub use service::unit_service::{UnitService, UnitServiceError};
pub use tree::materialize::{materialize_tree, ExportRow, MaterializedTree, TreeNode};
pub use tree::{HierarchyDefect, TreeError, TreeResult};

/// Minimal health-check API.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
