//! Plain text rendering.
//!
//! Layout:
//! - header with the table key
//! - derived values: type and size
//! - one line per registered kind with the run time of its latest record
//! - the create statement, when one was recorded

use super::TableReport;
use crate::table::Table;
use crate::util::{format_bytes, format_run_time};

const RULE_WIDTH: usize = 60;

pub fn render(table: &Table) -> String {
    let report = TableReport::new(table);
    let mut output = String::new();

    output.push_str(&format!("{}\n", report.key));
    output.push_str(&"-".repeat(RULE_WIDTH));
    output.push('\n');

    output.push_str(&format!("  {:14} {}\n", "type", report.table_type.as_str()));
    let size = report.size
        .map(format_bytes)
        .unwrap_or_else(|| "unknown".to_string());
    output.push_str(&format!("  {:14} {}\n", "size", size));

    output.push_str(&"-".repeat(RULE_WIDTH));
    output.push('\n');

    for (kind, snapshot) in report.stats.iter() {
        match snapshot {
            Some(s) => output.push_str(&format!(
                "  {:14} {}  #{}\n",
                truncate(kind.as_str(), 14),
                format_run_time(s.run_time),
                s.id
            )),
            None => output.push_str(&format!("  {:14} not recorded\n", truncate(kind.as_str(), 14))),
        }
    }

    if let Some(ddl) = report.create_statement {
        output.push_str(&"-".repeat(RULE_WIDTH));
        output.push('\n');
        output.push_str(ddl.trim_end());
        output.push('\n');
    }

    output
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max_len - 3).collect();
        format!("{truncated}...")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::ResourceKey;
    use crate::stat::{Payload, StatKind};
    use crate::store::memory::MemoryStore;
    use crate::store::TrackingRegistry;

    fn key() -> ResourceKey {
        ResourceKey::new("db1", "sales", "orders").unwrap()
    }

    #[test]
    fn base_table_report() {
        let registry = TrackingRegistry::new()
            .with(MemoryStore::new(StatKind::Volume)
                .with_record(&key(), 0, Payload::volume(2048)))
            .with(MemoryStore::new(StatKind::Definition)
                .with_record(&key(), 0, Payload::definition("CREATE TABLE orders (...)\n")))
            .with(MemoryStore::new(StatKind::View));
        let output = render(&Table::find(&registry, &key()).unwrap());

        assert!(output.starts_with("db1:sales.orders\n"));
        assert!(output.contains("type           base"));
        assert!(output.contains("size           2.0 KB"));
        assert!(output.contains("volume         1970-01-01 00:00:00  #1"));
        assert!(output.contains("view           not recorded"));
        assert!(output.ends_with("CREATE TABLE orders (...)\n"));
    }

    #[test]
    fn unknown_table_report_has_no_ddl() {
        let registry = TrackingRegistry::new().with(MemoryStore::new(StatKind::Volume));
        let output = render(&Table::find(&registry, &key()).unwrap());

        assert!(output.contains("type           unknown"));
        assert!(output.contains("size           unknown"));
        assert!(!output.contains("CREATE"));
    }

    #[test]
    fn long_kind_names_truncated() {
        assert_eq!(truncate("volume", 14), "volume");
        assert_eq!(truncate("index_statistics", 14), "index_stati...");
    }
}
