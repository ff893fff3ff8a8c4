use bytes::Bytes;
use std::sync::Arc;

use super::engine::StorageEngine;
use super::lifecycle::NodeLifecycle;
use crate::cluster::types::{NodeOutcome, Operation};
use crate::entity::{self, StoredRecord};
use crate::error::{EntityError, Result};

/// Record-level view of the local engine.
///
/// Every call checks the lifecycle first and fails with `Unavailable` without
/// touching storage when the node is not running.
pub struct LocalStore {
    engine: Arc<dyn StorageEngine>,
    lifecycle: Arc<NodeLifecycle>,
}

impl LocalStore {
    pub fn new(engine: Arc<dyn StorageEngine>, lifecycle: Arc<NodeLifecycle>) -> Self {
        Self { engine, lifecycle }
    }

    pub fn lifecycle(&self) -> &Arc<NodeLifecycle> {
        &self.lifecycle
    }

    fn ensure_accessible(&self) -> Result<()> {
        if self.lifecycle.is_accepting() {
            Ok(())
        } else {
            Err(EntityError::Unavailable)
        }
    }

    /// Current record for `key`, tombstones included.
    pub fn get_record(&self, key: &str) -> Result<Option<StoredRecord>> {
        self.ensure_accessible()?;
        match self.engine.get(key.as_bytes())? {
            Some(raw) => Ok(Some(entity::decode(&raw)?)),
            None => Ok(None),
        }
    }

    pub fn put_value(&self, key: &str, value: Bytes) -> Result<()> {
        self.ensure_accessible()?;
        let record = StoredRecord::live(value);
        self.engine.put(key.as_bytes(), record.to_bytes())
    }

    /// Rewrites the record for `key` as a tombstone.
    ///
    /// Fails with `NotFound` if the key was never written. Marking an existing
    /// tombstone again succeeds.
    pub fn mark_deleted(&self, key: &str) -> Result<()> {
        self.ensure_accessible()?;
        self.engine.update(key.as_bytes(), &mut |current: Option<&[u8]>| match current {
            Some(raw) => Ok(entity::decode(raw)?.into_tombstone().to_bytes()),
            None => Err(EntityError::NotFound),
        })
    }

    /// Runs one operation against local storage only.
    ///
    /// A delete of a never-written key reports `Absent` rather than failing,
    /// so callers can decide whether that counts as success.
    pub fn execute(&self, key: &str, op: &Operation) -> Result<NodeOutcome> {
        match op {
            Operation::Get => Ok(match self.get_record(key)? {
                None => NodeOutcome::Absent,
                Some(record) if record.tombstone => NodeOutcome::Deleted,
                Some(record) => NodeOutcome::Present {
                    value: record.value,
                    timestamp: record.timestamp,
                },
            }),
            Operation::Put(value) => {
                self.put_value(key, value.clone())?;
                Ok(NodeOutcome::Ack)
            }
            Operation::Delete => match self.mark_deleted(key) {
                Ok(()) => Ok(NodeOutcome::Ack),
                Err(EntityError::NotFound) => Ok(NodeOutcome::Absent),
                Err(e) => Err(e),
            },
        }
    }

    pub fn entry_count(&self) -> Result<usize> {
        self.engine.len()
    }
}
