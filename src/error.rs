//! Error taxonomy.
//!
//! Two failures matter to callers and must never be confused:
//! - `ResolutionError`: a tracking store could not be queried, nothing was resolved
//! - `MissingStatisticError`: resolution worked but a statistic was never recorded

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use crate::stat::StatKind;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum KeyError {
    #[error("{field} must not be empty")]
    Empty { field: &'static str },
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("invalid tracking table name: '{0}'")]
    InvalidTable(String),

    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("could not decode column '{column}': {reason}")]
    Decode { column: String, reason: String },
}

#[derive(Debug, thiserror::Error)]
pub enum ResolutionCause {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("deadline of {} exceeded", format_deadline(.0))]
    DeadlineExceeded(Duration),
}

fn format_deadline(deadline: &Duration) -> humantime::FormattedDuration {
    humantime::format_duration(*deadline)
}

/// A per-kind query failed, so no snapshot set was produced.
#[derive(Debug, thiserror::Error)]
#[error("failed to resolve {kind} statistics: {cause}")]
pub struct ResolutionError {
    pub kind: StatKind,
    #[source]
    pub cause: ResolutionCause,
}

/// What a derived accessor needed but did not find.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Requirement {
    Kind(StatKind),
    DefinitionOrView,
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Requirement::Kind(kind) => write!(f, "{kind}"),
            Requirement::DefinitionOrView => f.write_str("definition-or-view"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("no {required} statistic recorded")]
pub struct MissingStatisticError {
    pub required: Requirement,
}

impl MissingStatisticError {
    pub fn kind(kind: StatKind) -> Self {
        MissingStatisticError { required: Requirement::Kind(kind) }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid timeout '{value}': {source}")]
    Timeout {
        value: String,
        #[source]
        source: humantime::DurationError,
    },

    #[error("could not determine data directory")]
    NoDataDir,
}

/// Everything the binary can fail with.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Key(#[from] KeyError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    #[error("could not render JSON report: {0}")]
    Json(#[from] serde_json::Error),
}
