//! File-backed engine on top of redb.
//!
//! One database file per node, one table of raw record bytes. Every write is
//! its own committed transaction, so a record that was acknowledged survives
//! a restart.

use redb::{Database, ReadableTable, ReadableTableMetadata, TableDefinition};
use std::fmt::Display;
use std::path::Path;

use super::engine::{StorageEngine, UpdateFn};
use crate::error::{EntityError, Result};

const DB_FILENAME: &str = "entities.redb";
const ENTITIES: TableDefinition<&[u8], &[u8]> = TableDefinition::new("entities");

fn storage_error(e: impl Display) -> EntityError {
    EntityError::Storage(e.to_string())
}

pub struct DiskEngine {
    db: Database,
}

impl DiskEngine {
    /// Opens the store in `dir`, creating the directory and database file if
    /// needed.
    pub fn open(dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(dir).map_err(storage_error)?;
        let path = dir.join(DB_FILENAME);
        let db = Database::create(&path).map_err(storage_error)?;

        // Read transactions fail on a table that was never created.
        let txn = db.begin_write().map_err(storage_error)?;
        txn.open_table(ENTITIES).map_err(storage_error)?;
        txn.commit().map_err(storage_error)?;

        tracing::info!("Opened entity store at {}", path.display());
        Ok(Self { db })
    }
}

impl StorageEngine for DiskEngine {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        let txn = self.db.begin_read().map_err(storage_error)?;
        let table = txn.open_table(ENTITIES).map_err(storage_error)?;
        let value = table
            .get(key)
            .map_err(storage_error)?
            .map(|guard| guard.value().to_vec());
        Ok(value)
    }

    fn put(&self, key: &[u8], value: Vec<u8>) -> Result<()> {
        let txn = self.db.begin_write().map_err(storage_error)?;
        {
            let mut table = txn.open_table(ENTITIES).map_err(storage_error)?;
            table.insert(key, value.as_slice()).map_err(storage_error)?;
        }
        txn.commit().map_err(storage_error)
    }

    /// redb admits one write transaction at a time, which serializes this
    /// against every other write.
    fn update(&self, key: &[u8], f: &mut UpdateFn<'_>) -> Result<()> {
        let txn = self.db.begin_write().map_err(storage_error)?;
        let applied = {
            let mut table = txn.open_table(ENTITIES).map_err(storage_error)?;
            let current = table
                .get(key)
                .map_err(storage_error)?
                .map(|guard| guard.value().to_vec());
            match f(current.as_deref()) {
                Ok(next) => table
                    .insert(key, next.as_slice())
                    .map(|_| ())
                    .map_err(storage_error),
                Err(e) => Err(e),
            }
        };

        match applied {
            Ok(()) => txn.commit().map_err(storage_error),
            Err(e) => {
                txn.abort().map_err(storage_error)?;
                Err(e)
            }
        }
    }

    fn len(&self) -> Result<usize> {
        let txn = self.db.begin_read().map_err(storage_error)?;
        let table = txn.open_table(ENTITIES).map_err(storage_error)?;
        let len = table.len().map_err(storage_error)?;
        usize::try_from(len).map_err(storage_error)
    }
}
