//! In-process tracking store.
//!
//! Records are kept in insertion order; "latest" is the last one pushed
//! for a key. A store can be switched offline to simulate an unreachable
//! backend.

use std::cell::Cell;
use std::rc::Rc;

use crate::error::StoreError;
use crate::key::ResourceKey;
use crate::stat::{Payload, Snapshot, StatKind};

#[derive(Debug)]
pub struct MemoryStore {
    kind: StatKind,
    records: Vec<(ResourceKey, Snapshot)>,
    offline: Option<String>,
    queries: Rc<Cell<usize>>,
}

impl MemoryStore {
    pub fn new(kind: StatKind) -> Self {
        MemoryStore {
            kind,
            records: Vec::new(),
            offline: None,
            queries: Rc::new(Cell::new(0)),
        }
    }

    /// Appends a record. Ids are assigned in insertion order.
    pub fn record(&mut self, key: &ResourceKey, run_time: i64, payload: Payload) -> i64 {
        let id = self.records.len() as i64 + 1;
        self.records.push((key.clone(), Snapshot { id, run_time, payload }));
        id
    }

    pub fn with_record(mut self, key: &ResourceKey, run_time: i64, payload: Payload) -> Self {
        self.record(key, run_time, payload);
        self
    }

    /// Every query fails with `StoreError::Unavailable` carrying the reason.
    pub fn offline(mut self, reason: impl Into<String>) -> Self {
        self.offline = Some(reason.into());
        self
    }

    /// Number of queries served, failed ones included.
    pub fn queries(&self) -> usize {
        self.queries.get()
    }

    /// Shared handle on the query count, still readable after the store
    /// has been moved into a registry.
    pub fn query_counter(&self) -> Rc<Cell<usize>> {
        Rc::clone(&self.queries)
    }

    fn check_online(&self) -> Result<(), StoreError> {
        self.queries.set(self.queries.get() + 1);
        match &self.offline {
            Some(reason) => Err(StoreError::Unavailable(reason.clone())),
            None => Ok(()),
        }
    }
}

impl super::TrackingStore for MemoryStore {
    fn kind(&self) -> StatKind {
        self.kind.clone()
    }

    fn source(&self) -> String {
        "memory".to_string()
    }

    fn find_latest(&self, key: &ResourceKey) -> Result<Option<Snapshot>, StoreError> {
        self.check_online()?;
        Ok(self.records.iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, snapshot)| snapshot.clone()))
    }

    fn find_in_run(&self, key: &ResourceKey, run_time: i64) -> Result<Option<Snapshot>, StoreError> {
        self.check_online()?;
        Ok(self.records.iter()
            .rev()
            .find(|(k, s)| k == key && s.run_time == run_time)
            .map(|(_, snapshot)| snapshot.clone()))
    }

    fn last_run(&self) -> Result<Option<i64>, StoreError> {
        self.check_online()?;
        Ok(self.records.iter().map(|(_, s)| s.run_time).max())
    }
}
