use std::fmt;

use serde::Serialize;

use crate::error::KeyError;

/// Identifies one table on one tracked server.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ResourceKey {
    server: String,
    database: String,
    table: String,
}

impl ResourceKey {
    pub fn new(
        server: impl Into<String>,
        database: impl Into<String>,
        table: impl Into<String>,
    ) -> Result<Self, KeyError> {
        let key = ResourceKey {
            server: server.into(),
            database: database.into(),
            table: table.into(),
        };

        for (field, value) in [
            ("server", &key.server),
            ("database", &key.database),
            ("table", &key.table),
        ] {
            if value.trim().is_empty() {
                return Err(KeyError::Empty { field });
            }
        }

        Ok(key)
    }

    pub fn server(&self) -> &str {
        &self.server
    }

    pub fn database(&self) -> &str {
        &self.database
    }

    pub fn table(&self) -> &str {
        &self.table
    }
}

impl fmt::Display for ResourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}.{}", self.server, self.database, self.table)
    }
}
