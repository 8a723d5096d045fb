//! `pantry` command-line entry point.
//!
//! # Responsibility
//! - Create or migrate a pantry database file.
//! - Print per-entity counts and admin label listings.
//! - Keep output deterministic for scripting (`--json`).

use clap::{Parser, Subcommand};
use pantry_core::{
    core_version, default_log_level, init_logging, open_db, ping, AdminService, DbError,
    EntityKind, LoggingError, RepoError, SqliteAdminRepository,
};
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(name = "pantry", version, about = "Pantry order and inventory store")]
struct Cli {
    /// trace|debug|info|warn|error
    #[arg(long, global = true, env = "PANTRY_LOG_LEVEL")]
    log_level: Option<String>,
    /// Absolute directory for rolling log files. Logging is off when unset.
    #[arg(long, global = true, env = "PANTRY_LOG_DIR")]
    log_dir: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Create the database file or migrate it to the latest schema.
    Init {
        #[arg(long, env = "PANTRY_DB")]
        db: PathBuf,
    },
    /// Print row counts of every entity.
    Stats {
        #[arg(long, env = "PANTRY_DB")]
        db: PathBuf,
        #[arg(long)]
        json: bool,
    },
    /// Print display labels of one entity, e.g. `pantry list storage`.
    List {
        #[arg(value_parser = parse_entity)]
        entity: EntityKind,
        #[arg(long, env = "PANTRY_DB")]
        db: PathBuf,
        #[arg(long)]
        limit: Option<u32>,
        #[arg(long, default_value_t = 0)]
        offset: u32,
        #[arg(long)]
        json: bool,
    },
    /// Check core linkage.
    Ping,
}

#[derive(Debug)]
enum CliError {
    Logging(LoggingError),
    Db(DbError),
    Repo(RepoError),
    Json(serde_json::Error),
}

impl Display for CliError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Logging(err) => write!(f, "logging: {err}"),
            Self::Db(err) => write!(f, "database: {err}"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::Json(err) => write!(f, "json output: {err}"),
        }
    }
}

impl Error for CliError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Logging(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::Repo(err) => Some(err),
            Self::Json(err) => Some(err),
        }
    }
}

impl From<LoggingError> for CliError {
    fn from(value: LoggingError) -> Self {
        Self::Logging(value)
    }
}

impl From<DbError> for CliError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<RepoError> for CliError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

#[derive(Debug, Serialize)]
struct StatsRow {
    entity: EntityKind,
    name: &'static str,
    count: u64,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("event=cli_exit module=cli status=error");
            eprintln!("pantry: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    if let Some(log_dir) = cli.log_dir.as_deref() {
        let level = cli.log_level.as_deref().unwrap_or(default_log_level());
        init_logging(level, log_dir)?;
    }

    match cli.command {
        Command::Init { db } => {
            open_db(&db)?;
            println!("initialized {}", db.display());
        }
        Command::Stats { db, json } => {
            let conn = open_db(&db)?;
            let service = AdminService::new(SqliteAdminRepository::try_new(&conn)?);
            let rows: Vec<StatsRow> = service
                .entity_counts()?
                .into_iter()
                .map(|item| StatsRow {
                    entity: item.entity,
                    name: item.entity.verbose_name_plural(),
                    count: item.count,
                })
                .collect();
            if json {
                println!("{}", serde_json::to_string_pretty(&rows)?);
            } else {
                for row in rows {
                    println!("{}\t{}", row.name, row.count);
                }
            }
        }
        Command::List {
            entity,
            db,
            limit,
            offset,
            json,
        } => {
            let conn = open_db(&db)?;
            let service = AdminService::new(SqliteAdminRepository::try_new(&conn)?);
            let page = service.list_labels(entity, limit, offset)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&page.items)?);
            } else {
                for item in page.items {
                    println!("{}\t{}", item.uuid, item.label);
                }
            }
        }
        Command::Ping => {
            println!("pantry_core ping={}", ping());
            println!("pantry_core version={}", core_version());
        }
    }
    Ok(())
}

fn parse_entity(value: &str) -> Result<EntityKind, String> {
    EntityKind::from_key(value).ok_or_else(|| {
        let known: Vec<&str> = EntityKind::all().iter().map(|entity| entity.key()).collect();
        format!("unknown entity `{value}`; expected one of {}", known.join(", "))
    })
}
