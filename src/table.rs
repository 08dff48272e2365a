//! Read-only view over the resolved statistics of one table.

use serde::Serialize;

use crate::error::{MissingStatisticError, Requirement, ResolutionError};
use crate::key::ResourceKey;
use crate::resolve::{ResourceSnapshotSet, Resolver};
use crate::stat::{Snapshot, StatKind};
use crate::store::TrackingRegistry;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TableType {
    Base,
    View,
    Unknown,
}

impl TableType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TableType::Base => "base",
            TableType::View => "view",
            TableType::Unknown => "unknown",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    stats: ResourceSnapshotSet,
}

impl Table {
    /// Resolve the latest statistics of `key` from every registered store.
    pub fn find(registry: &TrackingRegistry, key: &ResourceKey) -> Result<Self, ResolutionError> {
        Self::find_with(&Resolver::new(registry), key)
    }

    pub fn find_with(resolver: &Resolver<'_>, key: &ResourceKey) -> Result<Self, ResolutionError> {
        resolver.resolve(key).map(Table::new)
    }

    pub fn new(stats: ResourceSnapshotSet) -> Self {
        Table { stats }
    }

    pub fn key(&self) -> &ResourceKey {
        self.stats.key()
    }

    pub fn stats(&self) -> &ResourceSnapshotSet {
        &self.stats
    }

    pub fn volume_snapshot(&self) -> Option<&Snapshot> {
        self.stats.get(&StatKind::Volume)
    }

    /// Size in bytes as recorded on the latest volume snapshot.
    pub fn size(&self) -> Result<u64, MissingStatisticError> {
        self.volume_snapshot()
            .and_then(Snapshot::volume)
            .and_then(|volume| volume.size)
            .ok_or_else(|| MissingStatisticError::kind(StatKind::Volume))
    }

    /// A definition record always wins, even when a view record exists too.
    pub fn classify(&self) -> TableType {
        let definition = self.stats.get(&StatKind::Definition).is_some();
        let view = self.stats.get(&StatKind::View).is_some();

        match (definition, view) {
            (true, _) => TableType::Base,
            (false, true) => TableType::View,
            (false, false) => TableType::Unknown,
        }
    }

    pub fn create_statement(&self) -> Result<&str, MissingStatisticError> {
        let kind = match self.classify() {
            TableType::Base => StatKind::Definition,
            TableType::View => StatKind::View,
            TableType::Unknown => {
                return Err(MissingStatisticError { required: Requirement::DefinitionOrView });
            }
        };

        self.stats
            .get(&kind)
            .and_then(Snapshot::create_syntax)
            .ok_or(MissingStatisticError::kind(kind))
    }
}
