//! Replicated Entity Storage Node
//!
//! This library crate holds everything a node needs; the binary (`main.rs`)
//! only parses configuration and serves the router.
//!
//! ## Architecture Modules
//!
//! - **`entity`**: The on-disk record layout. A value followed by its write
//!   timestamp and a tombstone flag.
//! - **`replica`**: Parsing of the per-request `ack/from` replica requirement.
//! - **`storage`**: The node-local store. A pluggable byte engine, the node
//!   lifecycle gate, and the record-aware `LocalStore` on top.
//! - **`cluster`**: Static topology, the peer client, and the
//!   `ReplicationCoordinator` that fans an operation out and tallies a quorum.
//! - **`server`**: The axum routes and the mapping of outcomes to status codes.
//! - **`config`**: Command line and environment configuration.

pub mod cluster;
pub mod config;
pub mod entity;
pub mod error;
pub mod replica;
pub mod server;
pub mod storage;
