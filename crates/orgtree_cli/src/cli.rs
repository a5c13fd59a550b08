use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "orgtree")]
#[command(about = "Organizational unit registry queries", version)]
pub struct Cli {
    /// SQLite database file; created and migrated when missing.
    #[arg(long, default_value = "orgtree.db")]
    pub db: PathBuf,

    /// Log level (trace|debug|info|warn|error); build default when omitted.
    #[arg(long)]
    pub log_level: Option<String>,

    /// Directory for rolling log files; logging stays off when omitted.
    #[arg(long)]
    pub log_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    Ping,
    /// Print the root-to-unit path.
    Path(UnitIdArg),
    /// List direct children, or roots without `--parent`.
    Children(ChildrenArgs),
    /// Print one unit with its direct children.
    Unit(UnitIdArg),
    Search(SearchArgs),
    /// Export the whole hierarchy as nested JSON or flat rows.
    Export(ExportArgs),
}

#[derive(Debug, Args)]
pub struct UnitIdArg {
    pub id: i64,
}

#[derive(Debug, Args)]
pub struct ChildrenArgs {
    #[arg(long)]
    pub parent: Option<i64>,
}

#[derive(Debug, Args)]
pub struct SearchArgs {
    #[arg(allow_hyphen_values = true)]
    pub query: String,
    /// Match identifiers and exact names only.
    #[arg(long, default_value_t = false)]
    pub exact: bool,
    #[arg(long)]
    pub limit: Option<usize>,
    #[arg(long)]
    pub offset: Option<usize>,
}

#[derive(Debug, Args)]
pub struct ExportArgs {
    /// Emit flat rows with breadcrumb paths instead of the nested tree.
    #[arg(long, default_value_t = false)]
    pub rows: bool,
    #[arg(long, default_value_t = false)]
    pub compact: bool,
}

#[cfg(test)]
mod tests {
    use super::{Cli, Commands, SearchArgs};
    use clap::Parser;

    #[test]
    fn search_parses_paging_and_exact_flags() {
        let cli = Cli::try_parse_from([
            "orgtree", "search", "201", "--exact", "--limit", "5", "--offset", "10",
        ])
        .expect("parse");
        match cli.command {
            Commands::Search(SearchArgs {
                query,
                exact,
                limit,
                offset,
            }) => {
                assert_eq!(query, "201");
                assert!(exact);
                assert_eq!(limit, Some(5));
                assert_eq!(offset, Some(10));
            }
            _ => panic!("expected search command"),
        }
    }

    #[test]
    fn children_without_parent_lists_roots() {
        let cli = Cli::try_parse_from(["orgtree", "--db", "units.db", "children"]).expect("parse");
        assert_eq!(cli.db.to_str(), Some("units.db"));
        match cli.command {
            Commands::Children(args) => assert_eq!(args.parent, None),
            _ => panic!("expected children command"),
        }
    }

    #[test]
    fn path_requires_numeric_id() {
        assert!(Cli::try_parse_from(["orgtree", "path", "abc"]).is_err());
    }
}
