//! Tracking stores.
//!
//! Each statistic kind lives in its own store with its own schema. The
//! registry maps kinds to stores and is handed to the resolver, which
//! queries every registered kind independently.
//!
//! Backends:
//! - sqlite: tracking tables written by the collector
//! - memory: in-process records, for embedding and tests

pub mod memory;
pub mod sqlite;

use std::collections::BTreeMap;

use crate::error::StoreError;
use crate::key::ResourceKey;
use crate::stat::{Snapshot, StatKind};

/// Historical records of one statistic kind.
pub trait TrackingStore {
    fn kind(&self) -> StatKind;

    /// Human-readable location of the records (table name, "memory", ...).
    fn source(&self) -> String;

    /// Most recent record for the key, by whatever order the store defines.
    fn find_latest(&self, key: &ResourceKey) -> Result<Option<Snapshot>, StoreError>;

    /// Record for the key collected in exactly the given run.
    fn find_in_run(&self, key: &ResourceKey, run_time: i64) -> Result<Option<Snapshot>, StoreError>;

    /// Time of the last collection run recorded in this store, if any.
    fn last_run(&self) -> Result<Option<i64>, StoreError>;
}

#[derive(Default)]
pub struct TrackingRegistry {
    stores: BTreeMap<StatKind, Box<dyn TrackingStore>>,
}

impl TrackingRegistry {
    pub fn new() -> Self {
        TrackingRegistry::default()
    }

    /// Adds a store under its own kind, replacing any store already
    /// registered for that kind.
    pub fn register(&mut self, store: Box<dyn TrackingStore>) -> Option<Box<dyn TrackingStore>> {
        self.stores.insert(store.kind(), store)
    }

    pub fn with(mut self, store: impl TrackingStore + 'static) -> Self {
        self.register(Box::new(store));
        self
    }

    pub fn registered_kinds(&self) -> Vec<StatKind> {
        self.stores.keys().cloned().collect()
    }

    pub fn get(&self, kind: &StatKind) -> Option<&dyn TrackingStore> {
        self.stores.get(kind).map(|store| store.as_ref())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&StatKind, &dyn TrackingStore)> {
        self.stores.iter().map(|(kind, store)| (kind, store.as_ref()))
    }

    pub fn len(&self) -> usize {
        self.stores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stores.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use memory::MemoryStore;

    #[test]
    fn kinds_listed_in_order() {
        let registry = TrackingRegistry::new()
            .with(MemoryStore::new(StatKind::View))
            .with(MemoryStore::new(StatKind::Volume))
            .with(MemoryStore::new(StatKind::Definition));

        assert_eq!(
            registry.registered_kinds(),
            vec![StatKind::Volume, StatKind::Definition, StatKind::View]
        );
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn registering_same_kind_replaces_store() {
        let mut registry = TrackingRegistry::new();
        assert!(registry.register(Box::new(MemoryStore::new(StatKind::Volume))).is_none());
        let replaced = registry.register(Box::new(MemoryStore::new(StatKind::Volume)));

        assert!(replaced.is_some());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn empty_registry_has_no_kinds() {
        let registry = TrackingRegistry::new();
        assert!(registry.is_empty());
        assert!(registry.get(&StatKind::Volume).is_none());
    }
}
