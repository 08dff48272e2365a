//! Rendering of resolved table statistics.
//!
//! Missing statistics are shown as "unknown"; they are expected and never
//! turn into a failed command.

pub mod json;
pub mod table;

use serde::Serialize;

use crate::key::ResourceKey;
use crate::resolve::ResourceSnapshotSet;
use crate::table::{Table, TableType};

pub fn print(resolved: &Table, json_output: bool) -> serde_json::Result<()> {
    if json_output {
        println!("{}", json::render(resolved)?);
    } else {
        print!("{}", table::render(resolved));
    }
    Ok(())
}

/// Everything a report shows, with derived values already worked out.
#[derive(Serialize)]
pub struct TableReport<'a> {
    pub key: &'a ResourceKey,
    #[serde(rename = "type")]
    pub table_type: TableType,
    pub size: Option<u64>,
    pub create_statement: Option<&'a str>,
    pub stats: &'a ResourceSnapshotSet,
}

impl<'a> TableReport<'a> {
    pub fn new(table: &'a Table) -> Self {
        TableReport {
            key: table.key(),
            table_type: table.classify(),
            size: table.size().ok(),
            create_statement: table.create_statement().ok(),
            stats: table.stats(),
        }
    }
}
