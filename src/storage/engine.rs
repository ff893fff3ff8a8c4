use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use crate::error::Result;

/// Closure applied by [`StorageEngine::update`] to the current value of a key.
///
/// Returning `Err` aborts the update and leaves the stored value untouched.
pub type UpdateFn<'a> = dyn FnMut(Option<&[u8]>) -> Result<Vec<u8>> + 'a;

/// Opaque key -> bytes store underneath a node.
///
/// Implementations must make [`update`](StorageEngine::update) atomic with
/// respect to any other call touching the same key.
pub trait StorageEngine: Send + Sync + 'static {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>>;

    fn put(&self, key: &[u8], value: Vec<u8>) -> Result<()>;

    /// Atomic read-modify-write of a single key.
    fn update(&self, key: &[u8], f: &mut UpdateFn<'_>) -> Result<()>;

    /// Number of keys held, tombstones included.
    fn len(&self) -> Result<usize>;

    fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
}

/// In-memory engine.
///
/// Per-key atomicity comes from the shard lock DashMap holds while an entry
/// guard is alive.
#[derive(Default)]
pub struct MemoryEngine {
    data: DashMap<Vec<u8>, Vec<u8>>,
}

impl MemoryEngine {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StorageEngine for MemoryEngine {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        Ok(self.data.get(key).map(|entry| entry.value().clone()))
    }

    fn put(&self, key: &[u8], value: Vec<u8>) -> Result<()> {
        self.data.insert(key.to_vec(), value);
        Ok(())
    }

    fn update(&self, key: &[u8], f: &mut UpdateFn<'_>) -> Result<()> {
        match self.data.entry(key.to_vec()) {
            Entry::Occupied(mut entry) => {
                let next = f(Some(entry.get().as_slice()))?;
                entry.insert(next);
            }
            Entry::Vacant(entry) => {
                let next = f(None)?;
                entry.insert(next);
            }
        }
        Ok(())
    }

    fn len(&self) -> Result<usize> {
        Ok(self.data.len())
    }
}
