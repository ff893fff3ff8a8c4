//! Local Storage Module
//!
//! Everything a node needs to serve entity operations from its own disk/memory,
//! without talking to peers.
//!
//! ## Core Concepts
//! - **Engine**: `StorageEngine` is the opaque key -> bytes store. It offers plain
//!   `get`/`put` plus an atomic single-key read-modify-write. `MemoryEngine` keeps
//!   everything in a DashMap; `DiskEngine` persists to a redb file in the node's
//!   data directory.
//! - **Lifecycle**: `NodeLifecycle` records whether the node is accepting requests.
//! - **Adapter**: `LocalStore` speaks in decoded `StoredRecord`s and refuses to touch
//!   the engine while the node is not running.

pub mod disk;
pub mod engine;
pub mod lifecycle;
pub mod local;

pub use disk::DiskEngine;
pub use engine::{MemoryEngine, StorageEngine};
pub use lifecycle::{LifecycleState, NodeLifecycle};
pub use local::LocalStore;
