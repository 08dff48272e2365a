//! Latest collected statistics of tracked MySQL tables.
//!
//! A collector (not part of this crate) periodically records per-table
//! statistics into one tracking store per kind. This crate resolves, for a
//! single server/database/table, the most recent record of every registered
//! kind and derives size, type and create statement from them.
//!
//! ```no_run
//! use tablestat::{store::sqlite, ResourceKey, Table};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let conn = sqlite::open("ttt.db".as_ref(), std::time::Duration::from_secs(5))?;
//! let registry = sqlite::registry(&conn, &sqlite::default_tables())?;
//! let table = Table::find(&registry, &ResourceKey::new("db1", "sales", "orders")?)?;
//! println!("{:?} {:?}", table.classify(), table.size());
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod key;
pub mod logging;
pub mod report;
pub mod resolve;
pub mod stat;
pub mod store;
pub mod table;
pub mod util;

pub use error::{Error, MissingStatisticError, ResolutionError};
pub use key::ResourceKey;
pub use resolve::{ResourceSnapshotSet, Resolver, RunScope};
pub use stat::{Payload, Snapshot, StatKind};
pub use store::{TrackingRegistry, TrackingStore};
pub use table::{Table, TableType};
