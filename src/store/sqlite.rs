//! SQLite tracking tables.
//!
//! The collector writes one table per statistic kind, each with the columns
//! id, server, database_name, table_name, run_time plus the kind's own:
//! - volume: size
//! - definition, view: create_syntax
//! - custom kinds: anything, returned as raw columns
//!
//! "Latest" means highest id, i.e. the last row the collector inserted.
//! The schema is owned by the collector; nothing here creates or alters it.

use std::path::Path;
use std::rc::Rc;
use std::time::Duration;

use rusqlite::types::ValueRef;
use rusqlite::{params, Connection, OpenFlags, OptionalExtension, Row, Statement};
use tracing::{debug, info};

use super::{TrackingRegistry, TrackingStore};
use crate::error::StoreError;
use crate::key::ResourceKey;
use crate::stat::{Ddl, Payload, Snapshot, StatKind, VolumeStat};

const KEY_COLUMNS: [&str; 5] = ["id", "server", "database_name", "table_name", "run_time"];

/// Open the tracking database read-only. Open once per command and share
/// the handle across all stores.
pub fn open(path: &Path, busy_timeout: Duration) -> Result<Rc<Connection>, StoreError> {
    let conn = Connection::open_with_flags(
        path,
        OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )?;
    conn.busy_timeout(busy_timeout)?;
    info!(path = %path.display(), "opened tracking database");
    Ok(Rc::new(conn))
}

/// Build a registry with one store per (kind, table) pair.
pub fn registry(
    conn: &Rc<Connection>,
    tables: &[(StatKind, String)],
) -> Result<TrackingRegistry, StoreError> {
    let mut registry = TrackingRegistry::new();
    for (kind, table) in tables {
        registry.register(Box::new(SqliteStore::new(Rc::clone(conn), kind.clone(), table)?));
    }
    Ok(registry)
}

/// Tables the collector writes for the built-in kinds.
pub fn default_tables() -> Vec<(StatKind, String)> {
    [StatKind::Volume, StatKind::Definition, StatKind::View]
        .into_iter()
        .map(|kind| {
            let table = kind.default_table();
            (kind, table)
        })
        .collect()
}

pub struct SqliteStore {
    conn: Rc<Connection>,
    kind: StatKind,
    table: String,
}

impl SqliteStore {
    pub fn new(conn: Rc<Connection>, kind: StatKind, table: &str) -> Result<Self, StoreError> {
        if !is_identifier(table) {
            return Err(StoreError::InvalidTable(table.to_string()));
        }

        Ok(SqliteStore {
            conn,
            kind,
            table: table.to_string(),
        })
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    fn select(&self, extra_filter: &str) -> String {
        format!(
            "SELECT * FROM \"{}\"
             WHERE server = ?1 AND database_name = ?2 AND table_name = ?3{extra_filter}
             ORDER BY id DESC
             LIMIT 1",
            self.table
        )
    }

    fn query_one(
        &self,
        stmt: &mut Statement<'_>,
        params: impl rusqlite::Params,
    ) -> Result<Option<Snapshot>, StoreError> {
        let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
        let mut rows = stmt.query(params)?;

        match rows.next()? {
            Some(row) => Ok(Some(self.snapshot_from_row(row, &columns)?)),
            None => Ok(None),
        }
    }

    fn snapshot_from_row(&self, row: &Row, columns: &[String]) -> Result<Snapshot, StoreError> {
        let payload = match &self.kind {
            StatKind::Volume => Payload::Volume(VolumeStat {
                size: decode_size(row.get("size")?)?,
            }),
            StatKind::Definition => Payload::Definition(Ddl {
                create_syntax: row.get("create_syntax")?,
            }),
            StatKind::View => Payload::View(Ddl {
                create_syntax: row.get("create_syntax")?,
            }),
            StatKind::Other(_) => Payload::Other {
                columns: raw_columns(row, columns)?,
            },
        };

        Ok(Snapshot {
            id: row.get("id")?,
            run_time: row.get("run_time")?,
            payload,
        })
    }
}

impl TrackingStore for SqliteStore {
    fn kind(&self) -> StatKind {
        self.kind.clone()
    }

    fn source(&self) -> String {
        self.table.clone()
    }

    fn find_latest(&self, key: &ResourceKey) -> Result<Option<Snapshot>, StoreError> {
        debug!(table = %self.table, %key, "querying latest record");
        let mut stmt = self.conn.prepare_cached(&self.select(""))?;
        self.query_one(&mut stmt, params![key.server(), key.database(), key.table()])
    }

    fn find_in_run(&self, key: &ResourceKey, run_time: i64) -> Result<Option<Snapshot>, StoreError> {
        debug!(table = %self.table, %key, run_time, "querying record in run");
        let mut stmt = self.conn.prepare_cached(&self.select(" AND run_time = ?4"))?;
        self.query_one(
            &mut stmt,
            params![key.server(), key.database(), key.table(), run_time],
        )
    }

    fn last_run(&self) -> Result<Option<i64>, StoreError> {
        let sql = format!("SELECT MAX(run_time) FROM \"{}\"", self.table);
        let last = self.conn
            .query_row(&sql, [], |row| row.get::<_, Option<i64>>(0))
            .optional()?
            .flatten();
        Ok(last)
    }
}

/// NULL stays absent; a negative size is corrupt, not zero.
fn decode_size(size: Option<i64>) -> Result<Option<u64>, StoreError> {
    size.map(|bytes| {
        u64::try_from(bytes).map_err(|_| StoreError::Decode {
            column: "size".to_string(),
            reason: format!("negative size {bytes}"),
        })
    })
    .transpose()
}

fn raw_columns(
    row: &Row,
    columns: &[String],
) -> Result<serde_json::Map<String, serde_json::Value>, StoreError> {
    let mut map = serde_json::Map::new();

    for (idx, name) in columns.iter().enumerate() {
        if KEY_COLUMNS.contains(&name.as_str()) {
            continue;
        }

        let value = match row.get_ref(idx)? {
            ValueRef::Null => serde_json::Value::Null,
            ValueRef::Integer(i) => serde_json::Value::from(i),
            ValueRef::Real(f) => serde_json::Value::from(f),
            ValueRef::Text(bytes) => {
                let text = std::str::from_utf8(bytes).map_err(|e| StoreError::Decode {
                    column: name.clone(),
                    reason: e.to_string(),
                })?;
                serde_json::Value::String(text.to_string())
            }
            ValueRef::Blob(bytes) => serde_json::Value::from(bytes.to_vec()),
        };

        map.insert(name.clone(), value);
    }

    Ok(map)
}

/// Table names are interpolated into SQL, so only plain identifiers pass.
fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
