//! JSON output for scripting and piping.

use super::TableReport;
use crate::table::Table;

pub fn render(table: &Table) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&TableReport::new(table))
}
