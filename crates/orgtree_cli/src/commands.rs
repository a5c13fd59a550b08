use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::info;
use orgtree_core::{
    core_version, default_log_level, export, init_logging, open_db, ping, CoreConfig,
    SearchRequest, SqliteUnitRepository, UnitService,
};

use crate::cli::{Cli, Commands, ExportArgs, SearchArgs};

pub(crate) fn run(cli: Cli) -> Result<()> {
    if let Commands::Ping = cli.command {
        println!("orgtree_core ping={} version={}", ping(), core_version());
        return Ok(());
    }

    if let Some(log_dir) = &cli.log_dir {
        let level = cli.log_level.as_deref().unwrap_or(default_log_level());
        let log_dir = absolute_path(log_dir)?;
        init_logging(level, &log_dir.to_string_lossy()).context("failed to start logging")?;
    }

    let conn = open_db(&cli.db)
        .with_context(|| format!("failed to open database `{}`", cli.db.display()))?;
    let repo = SqliteUnitRepository::try_new(&conn).context("database is not a unit registry")?;
    let service = UnitService::with_config(repo, CoreConfig::from_env());
    info!(
        "event=cli_command module=cli status=start command={}",
        command_name(&cli.command)
    );

    match cli.command {
        Commands::Ping => {}
        Commands::Path(arg) => print_json(&service.resolve_path(arg.id)?)?,
        Commands::Children(args) => print_json(&service.list_children(args.parent)?)?,
        Commands::Unit(arg) => print_json(&service.get_unit(arg.id)?)?,
        Commands::Search(args) => run_search(&service, args)?,
        Commands::Export(args) => run_export(&service, &args)?,
    }
    Ok(())
}

fn run_search(service: &UnitService<SqliteUnitRepository<'_>>, args: SearchArgs) -> Result<()> {
    let request = SearchRequest::clamped(
        args.query,
        args.exact,
        args.limit,
        args.offset,
        &service.config().search,
    );
    print_json(&service.search(&request)?)
}

fn run_export(service: &UnitService<SqliteUnitRepository<'_>>, args: &ExportArgs) -> Result<()> {
    let tree = service.export_snapshot()?;
    let pretty = !args.compact;
    let rendered = if args.rows {
        export::to_rows_json(&tree, pretty)?
    } else {
        export::to_nested_json(&tree, pretty)?
    };
    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{rendered}")?;
    Ok(())
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    let mut stdout = io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, value)?;
    writeln!(stdout)?;
    Ok(())
}

fn absolute_path(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    let cwd = std::env::current_dir().context("failed to resolve current directory")?;
    Ok(cwd.join(path))
}

fn command_name(command: &Commands) -> &'static str {
    match command {
        Commands::Ping => "ping",
        Commands::Path(_) => "path",
        Commands::Children(_) => "children",
        Commands::Unit(_) => "unit",
        Commands::Search(_) => "search",
        Commands::Export(_) => "export",
    }
}
