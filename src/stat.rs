//! Statistic kinds and the records collected for them.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Category of tracked table statistic.
///
/// The three built-in kinds have dedicated payloads; any other name a
/// registry declares is carried as `Other`. Kinds are built from names with
/// `StatKind::from`, so a built-in name always maps to its own variant.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum StatKind {
    Volume,
    Definition,
    View,
    Other(CustomKind),
}

/// Name of a registry-declared kind. Never one of the built-in names.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CustomKind(String);

impl CustomKind {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl StatKind {
    pub fn as_str(&self) -> &str {
        match self {
            StatKind::Volume => "volume",
            StatKind::Definition => "definition",
            StatKind::View => "view",
            StatKind::Other(name) => name.as_str(),
        }
    }

    /// Tracking table the collector writes this kind to by default.
    pub fn default_table(&self) -> String {
        match self {
            StatKind::Volume => "table_volumes".to_string(),
            StatKind::Definition => "table_definitions".to_string(),
            StatKind::View => "table_views".to_string(),
            StatKind::Other(name) => format!("table_{}", name.as_str()),
        }
    }
}

impl From<&str> for StatKind {
    fn from(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "volume" => StatKind::Volume,
            "definition" => StatKind::Definition,
            "view" => StatKind::View,
            other => StatKind::Other(CustomKind(other.to_string())),
        }
    }
}

impl From<String> for StatKind {
    fn from(name: String) -> Self {
        StatKind::from(name.as_str())
    }
}

impl From<StatKind> for String {
    fn from(kind: StatKind) -> Self {
        kind.as_str().to_string()
    }
}

impl fmt::Display for StatKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct VolumeStat {
    /// Bytes as recorded by the collector, `None` when the column was NULL.
    pub size: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Ddl {
    pub create_syntax: Option<String>,
}

/// Kind-specific content of a snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Payload {
    Volume(VolumeStat),
    Definition(Ddl),
    View(Ddl),
    Other { columns: serde_json::Map<String, serde_json::Value> },
}

impl Payload {
    pub fn volume(size: u64) -> Self {
        Payload::Volume(VolumeStat { size: Some(size) })
    }

    pub fn definition(create_syntax: impl Into<String>) -> Self {
        Payload::Definition(Ddl { create_syntax: Some(create_syntax.into()) })
    }

    pub fn view(create_syntax: impl Into<String>) -> Self {
        Payload::View(Ddl { create_syntax: Some(create_syntax.into()) })
    }
}

/// One recorded observation of a statistic for a table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub id: i64,
    /// Unix seconds of the collection run that produced this record.
    pub run_time: i64,
    pub payload: Payload,
}

impl Snapshot {
    pub fn volume(&self) -> Option<&VolumeStat> {
        match &self.payload {
            Payload::Volume(stat) => Some(stat),
            _ => None,
        }
    }

    /// DDL carried by definition and view records, if one was stored.
    pub fn create_syntax(&self) -> Option<&str> {
        match &self.payload {
            Payload::Definition(ddl) | Payload::View(ddl) => ddl.create_syntax.as_deref(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_names_round_trip_through_strings() {
        for kind in [StatKind::Volume, StatKind::Definition, StatKind::View] {
            assert_eq!(StatKind::from(kind.as_str()), kind);
        }
        assert_eq!(StatKind::from("Volume "), StatKind::Volume);
        assert_eq!(StatKind::from("privileges").as_str(), "privileges");
        assert!(matches!(StatKind::from("privileges"), StatKind::Other(_)));
    }

    #[test]
    fn default_tables_follow_collector_naming() {
        assert_eq!(StatKind::Volume.default_table(), "table_volumes");
        assert_eq!(StatKind::View.default_table(), "table_views");
        assert_eq!(StatKind::from("usage").default_table(), "table_usage");
    }

    #[test]
    fn create_syntax_only_on_ddl_payloads() {
        let view = Snapshot {
            id: 1,
            run_time: 0,
            payload: Payload::view("CREATE VIEW v AS SELECT 1"),
        };
        let volume = Snapshot { id: 2, run_time: 0, payload: Payload::volume(5) };

        assert_eq!(view.create_syntax(), Some("CREATE VIEW v AS SELECT 1"));
        assert_eq!(volume.create_syntax(), None);
        assert_eq!(volume.volume(), Some(&VolumeStat { size: Some(5) }));
    }

    #[test]
    fn null_ddl_is_absent_syntax() {
        let definition = Snapshot {
            id: 1,
            run_time: 0,
            payload: Payload::Definition(Ddl { create_syntax: None }),
        };
        assert_eq!(definition.create_syntax(), None);
    }

    #[test]
    fn builtin_names_never_become_custom_kinds() {
        for name in ["volume", "DEFINITION", " view "] {
            assert!(!matches!(StatKind::from(name), StatKind::Other(_)));
        }

        let json = serde_json::json!({ "kinds": ["volume", "usage"] });
        let kinds: Vec<StatKind> = serde_json::from_value(json["kinds"].clone()).unwrap();
        assert_eq!(kinds[0], StatKind::Volume);
        assert_eq!(kinds[1], StatKind::from("usage"));
    }

    #[test]
    fn kind_serializes_as_its_name() {
        let json = serde_json::to_string(&StatKind::Definition).unwrap();
        assert_eq!(json, "\"definition\"");
    }
}
