//! Command-line arguments and the paths derived from them.

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result};
use clap::Parser;
use directories::BaseDirs;
use log::LevelFilter;

/// Folder name used beneath the user's home directory for application data.
const DATA_DIR_NAME: &str = ".retail-terminal";
const LOG_FILE_NAME: &str = "retail-terminal.log";
const EXPORT_DIR_NAME: &str = "exports";

#[derive(Debug, Parser)]
#[command(name = "retail-terminal")]
#[command(version, about = "Menu-driven retail client: stores, orders and manager reports")]
pub struct Cli {
    /// Database name, or a path to a SQLite file
    pub dbname: String,

    /// Database port (kept for the connection banner)
    pub port: u16,

    /// Database user name
    pub user: String,

    /// Directory holding databases, logs and exports
    #[arg(long, env = "RETAIL_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Populate an empty database with demo users, stores and products
    #[arg(long)]
    pub seed_demo: bool,

    /// Log level written to the log file
    #[arg(long, env = "RETAIL_LOG", default_value = "info")]
    pub log_level: String,
}

/// Resolved runtime settings.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub dbname: String,
    pub port: u16,
    pub user: String,
    pub data_dir: PathBuf,
    pub database_path: PathBuf,
    pub seed_demo: bool,
    pub log_level: LevelFilter,
}

impl AppConfig {
    pub fn from_cli(cli: Cli) -> Result<Self> {
        let data_dir = match cli.data_dir {
            Some(dir) => dir,
            None => default_data_dir()?,
        };
        let database_path = resolve_database_path(&data_dir, &cli.dbname);
        let log_level = cli
            .log_level
            .parse::<LevelFilter>()
            .map_err(|_| anyhow!("unknown log level '{}'", cli.log_level))?;

        Ok(Self {
            dbname: cli.dbname,
            port: cli.port,
            user: cli.user,
            data_dir,
            database_path,
            seed_demo: cli.seed_demo,
            log_level,
        })
    }

    pub fn log_path(&self) -> PathBuf {
        self.data_dir.join(LOG_FILE_NAME)
    }

    pub fn export_dir(&self) -> PathBuf {
        self.data_dir.join(EXPORT_DIR_NAME)
    }

    /// Human-readable connection string shown in the header and the log.
    pub fn connection_url(&self) -> String {
        format!(
            "sqlite://{}?port={}&user={}",
            self.database_path.display(),
            self.port,
            self.user
        )
    }
}

fn default_data_dir() -> Result<PathBuf> {
    let base_dirs = BaseDirs::new().ok_or_else(|| anyhow!("could not locate home directory"))?;
    Ok(base_dirs.home_dir().join(DATA_DIR_NAME))
}

/// A bare name lives in the data directory as `<name>.sqlite`; anything that
/// already looks like a path or a database file is used as given.
pub fn resolve_database_path(data_dir: &Path, dbname: &str) -> PathBuf {
    let looks_like_path = dbname.contains(std::path::MAIN_SEPARATOR)
        || dbname.contains('/')
        || dbname.ends_with(".sqlite")
        || dbname.ends_with(".db");

    if looks_like_path {
        PathBuf::from(dbname)
    } else {
        data_dir.join(format!("{dbname}.sqlite"))
    }
}
