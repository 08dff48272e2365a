//! Latest-snapshot resolution.
//!
//! For one table, asks every registered store for its most recent record
//! and collects the answers into a `ResourceSnapshotSet`. Any failing
//! store aborts the whole resolution.

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::{debug, warn};

use crate::error::{ResolutionCause, ResolutionError, StoreError};
use crate::key::ResourceKey;
use crate::stat::{Snapshot, StatKind};
use crate::store::{TrackingRegistry, TrackingStore};

/// Which record counts as "latest" for a kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunScope {
    /// Most recent record in the store, whatever run produced it.
    #[default]
    Latest,
    /// Only the record from the store's last collection run.
    LastRun,
}

/// Latest snapshot per registered kind for one table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResourceSnapshotSet {
    key: ResourceKey,
    snapshots: BTreeMap<StatKind, Option<Snapshot>>,
}

impl ResourceSnapshotSet {
    pub fn new(key: ResourceKey, snapshots: BTreeMap<StatKind, Option<Snapshot>>) -> Self {
        ResourceSnapshotSet { key, snapshots }
    }

    pub fn key(&self) -> &ResourceKey {
        &self.key
    }

    /// `None` both when the kind has no record and when it is not
    /// registered; use `contains_kind` to tell them apart.
    pub fn get(&self, kind: &StatKind) -> Option<&Snapshot> {
        self.snapshots.get(kind).and_then(Option::as_ref)
    }

    pub fn contains_kind(&self, kind: &StatKind) -> bool {
        self.snapshots.contains_key(kind)
    }

    pub fn kinds(&self) -> impl Iterator<Item = &StatKind> {
        self.snapshots.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&StatKind, Option<&Snapshot>)> {
        self.snapshots.iter().map(|(kind, snapshot)| (kind, snapshot.as_ref()))
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}

pub struct Resolver<'r> {
    registry: &'r TrackingRegistry,
    scope: RunScope,
    timeout: Option<Duration>,
}

impl<'r> Resolver<'r> {
    pub fn new(registry: &'r TrackingRegistry) -> Self {
        Resolver {
            registry,
            scope: RunScope::Latest,
            timeout: None,
        }
    }

    pub fn with_scope(mut self, scope: RunScope) -> Self {
        self.scope = scope;
        self
    }

    /// Bound the whole resolution. Checked before and after each per-kind query.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn resolve(&self, key: &ResourceKey) -> Result<ResourceSnapshotSet, ResolutionError> {
        let start = Instant::now();
        let mut snapshots = BTreeMap::new();

        for (kind, store) in self.registry.iter() {
            self.check_deadline(start, key, kind)?;

            let snapshot = self.resolve_kind(store, key).map_err(|e| ResolutionError {
                kind: kind.clone(),
                cause: ResolutionCause::Store(e),
            })?;

            // a query that returned late still blows the budget
            self.check_deadline(start, key, kind)?;

            debug!(%key, %kind, found = snapshot.is_some(), "resolved statistic");
            snapshots.insert(kind.clone(), snapshot);
        }

        debug!(%key, kinds = snapshots.len(), elapsed_ms = start.elapsed().as_millis() as u64, "resolution complete");
        Ok(ResourceSnapshotSet::new(key.clone(), snapshots))
    }

    fn check_deadline(
        &self,
        start: Instant,
        key: &ResourceKey,
        kind: &StatKind,
    ) -> Result<(), ResolutionError> {
        match self.timeout {
            Some(timeout) if start.elapsed() > timeout => {
                warn!(%key, %kind, "resolution deadline exceeded");
                Err(ResolutionError {
                    kind: kind.clone(),
                    cause: ResolutionCause::DeadlineExceeded(timeout),
                })
            }
            _ => Ok(()),
        }
    }

    fn resolve_kind(
        &self,
        store: &dyn TrackingStore,
        key: &ResourceKey,
    ) -> Result<Option<Snapshot>, StoreError> {
        match self.scope {
            RunScope::Latest => store.find_latest(key),
            RunScope::LastRun => match store.last_run()? {
                Some(run_time) => store.find_in_run(key, run_time),
                None => Ok(None),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stat::Payload;
    use crate::store::memory::MemoryStore;

    fn key() -> ResourceKey {
        ResourceKey::new("db1", "sales", "orders").unwrap()
    }

    fn volume(size: u64) -> Payload {
        Payload::volume(size)
    }

    fn registry() -> TrackingRegistry {
        TrackingRegistry::new()
            .with(MemoryStore::new(StatKind::Volume).with_record(&key(), 100, volume(1000)))
            .with(MemoryStore::new(StatKind::Definition).with_record(
                &key(),
                100,
                Payload::definition("CREATE TABLE orders (...)"),
            ))
            .with(MemoryStore::new(StatKind::View))
    }

    #[test]
    fn one_entry_per_registered_kind() {
        let registry = registry();
        let set = Resolver::new(&registry).resolve(&key()).unwrap();

        let kinds: Vec<_> = set.kinds().cloned().collect();
        assert_eq!(kinds, registry.registered_kinds());
        assert!(set.contains_kind(&StatKind::View));
        assert!(set.get(&StatKind::View).is_none());
        assert_eq!(set.get(&StatKind::Volume).unwrap().volume().unwrap().size, Some(1000));
    }

    #[test]
    fn unregistered_kind_is_not_contained() {
        let registry = TrackingRegistry::new().with(MemoryStore::new(StatKind::Volume));
        let set = Resolver::new(&registry).resolve(&key()).unwrap();

        assert_eq!(set.len(), 1);
        assert!(!set.contains_kind(&StatKind::Definition));
    }

    #[test]
    fn empty_registry_resolves_to_empty_set() {
        let registry = TrackingRegistry::new();
        let set = Resolver::new(&registry).resolve(&key()).unwrap();
        assert!(set.is_empty());
    }

    #[test]
    fn resolving_twice_gives_equal_sets() {
        let registry = registry();
        let resolver = Resolver::new(&registry);
        assert_eq!(resolver.resolve(&key()).unwrap(), resolver.resolve(&key()).unwrap());
    }

    #[test]
    fn failing_store_aborts_resolution() {
        let view = MemoryStore::new(StatKind::View);
        let view_queries = view.query_counter();
        let registry = TrackingRegistry::new()
            .with(MemoryStore::new(StatKind::Volume).offline("connection refused"))
            .with(view);

        let err = Resolver::new(&registry).resolve(&key()).unwrap_err();

        assert_eq!(err.kind, StatKind::Volume);
        assert!(matches!(err.cause, ResolutionCause::Store(_)));
        // volume sorts first, so nothing after it was queried
        assert_eq!(view_queries.get(), 0);
    }

    struct SlowStore(Duration);

    impl TrackingStore for SlowStore {
        fn kind(&self) -> StatKind {
            StatKind::Volume
        }

        fn source(&self) -> String {
            "slow".to_string()
        }

        fn find_latest(&self, _key: &ResourceKey) -> Result<Option<Snapshot>, StoreError> {
            std::thread::sleep(self.0);
            Ok(None)
        }

        fn find_in_run(&self, key: &ResourceKey, _run_time: i64) -> Result<Option<Snapshot>, StoreError> {
            self.find_latest(key)
        }

        fn last_run(&self) -> Result<Option<i64>, StoreError> {
            Ok(None)
        }
    }

    #[test]
    fn deadline_stops_remaining_queries() {
        let definition = MemoryStore::new(StatKind::Definition);
        let queries = definition.query_counter();
        let registry = TrackingRegistry::new()
            .with(SlowStore(Duration::from_millis(30)))
            .with(definition);

        let err = Resolver::new(&registry)
            .with_timeout(Duration::from_millis(5))
            .resolve(&key())
            .unwrap_err();

        assert_eq!(err.kind, StatKind::Volume);
        assert!(matches!(err.cause, ResolutionCause::DeadlineExceeded(_)));
        assert_eq!(queries.get(), 0);
    }

    #[test]
    fn single_slow_store_exceeds_deadline() {
        let registry = TrackingRegistry::new().with(SlowStore(Duration::from_millis(30)));

        let err = Resolver::new(&registry)
            .with_timeout(Duration::from_millis(5))
            .resolve(&key())
            .unwrap_err();

        assert_eq!(err.kind, StatKind::Volume);
        assert!(matches!(err.cause, ResolutionCause::DeadlineExceeded(d) if d == Duration::from_millis(5)));
    }

    #[test]
    fn generous_deadline_resolves_normally() {
        let registry = registry();
        let set = Resolver::new(&registry)
            .with_timeout(Duration::from_secs(60))
            .resolve(&key())
            .unwrap();
        assert_eq!(set.len(), 3);
    }

    #[test]
    fn last_run_scope_ignores_stale_records() {
        let other = ResourceKey::new("db1", "sales", "customers").unwrap();
        let registry = TrackingRegistry::new().with(
            MemoryStore::new(StatKind::Volume)
                .with_record(&key(), 100, volume(1000))
                .with_record(&other, 200, volume(5)),
        );

        let latest = Resolver::new(&registry).resolve(&key()).unwrap();
        let last_run = Resolver::new(&registry)
            .with_scope(RunScope::LastRun)
            .resolve(&key())
            .unwrap();

        assert!(latest.get(&StatKind::Volume).is_some());
        assert!(last_run.contains_kind(&StatKind::Volume));
        assert!(last_run.get(&StatKind::Volume).is_none());
    }
}
