//! Configuration.
//!
//! Loaded from `config.toml` in the platform config directory, then
//! overridden by command line flags. Every key is optional:
//!
//! ```toml
//! database = "/var/lib/ttt/ttt.db"
//! timeout = "5s"
//!
//! [[tracking]]
//! kind = "usage"
//! table = "table_usage"
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::cli::GlobalArgs;
use crate::error::ConfigError;
use crate::stat::StatKind;
use crate::store::sqlite;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    database: Option<PathBuf>,
    timeout: Option<String>,
    #[serde(default)]
    tracking: Vec<TrackingTable>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TrackingTable {
    pub kind: StatKind,
    pub table: String,
}

#[derive(Debug)]
pub struct Config {
    pub database: PathBuf,
    pub timeout: Duration,
    /// Kind to tracking table, built-ins first, file entries override them.
    pub tracking: Vec<(StatKind, String)>,
    pub verbose: bool,
}

impl Config {
    pub fn load(args: &GlobalArgs) -> Result<Self, ConfigError> {
        let file = match &args.config {
            Some(path) => read_file(path)?,
            None => match default_config_path() {
                Some(path) if path.exists() => read_file(&path)?,
                _ => FileConfig::default(),
            },
        };

        Self::build(file, args)
    }

    fn build(file: FileConfig, args: &GlobalArgs) -> Result<Self, ConfigError> {
        let database = match args.db.clone().or(file.database) {
            Some(path) => path,
            None => default_db_path()?,
        };

        let timeout = match args.timeout.as_deref().or(file.timeout.as_deref()) {
            Some(value) => parse_timeout(value)?,
            None => DEFAULT_TIMEOUT,
        };

        Ok(Config {
            database,
            timeout,
            tracking: merge_tracking(sqlite::default_tables(), file.tracking),
            verbose: args.verbose,
        })
    }
}

fn read_file(path: &Path) -> Result<FileConfig, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    parse_file(&contents, path)
}

fn parse_file(contents: &str, path: &Path) -> Result<FileConfig, ConfigError> {
    toml::from_str(contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn parse_timeout(value: &str) -> Result<Duration, ConfigError> {
    humantime::parse_duration(value).map_err(|source| ConfigError::Timeout {
        value: value.to_string(),
        source,
    })
}

fn merge_tracking(
    mut tables: Vec<(StatKind, String)>,
    overrides: Vec<TrackingTable>,
) -> Vec<(StatKind, String)> {
    for entry in overrides {
        match tables.iter_mut().find(|(kind, _)| *kind == entry.kind) {
            Some((_, table)) => *table = entry.table,
            None => tables.push((entry.kind, entry.table)),
        }
    }
    tables
}

/// ~/.config/tablestat/config.toml or platform equivalent
pub fn default_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "tablestat")
        .map(|dirs| dirs.config_dir().join("config.toml"))
}

/// ~/.local/share/tablestat/ttt.db or platform equivalent
pub fn default_db_path() -> Result<PathBuf, ConfigError> {
    directories::ProjectDirs::from("", "", "tablestat")
        .map(|dirs| dirs.data_dir().join("ttt.db"))
        .ok_or(ConfigError::NoDataDir)
}
