//! Replication Module
//!
//! Coordinates one client operation across a fixed set of replicas.
//!
//! ## Core Concepts
//! - **Topology**: The ordered, immutable list of node addresses this node knows.
//!   The first `node_count` members serve a request, in configured order.
//! - **Node Client**: Calls a peer's entity endpoint with the bypass marker set, so
//!   the peer answers from its own storage and never fans out again.
//! - **Coordinator**: Fans the operation out (local store for self, node client for
//!   peers), tallies the outcomes against the request's `ReplicaSpec`, and returns
//!   a single verdict. Unreachable peers abstain; they never vote.

pub mod client;
pub mod coordinator;
pub mod protocol;
pub mod topology;
pub mod types;

pub use client::{HttpNodeClient, NodeClient};
pub use coordinator::ReplicationCoordinator;
pub use topology::{NodeAddress, Topology, TopologyError};
pub use types::{NodeOutcome, Operation, ReadReconciliation};
