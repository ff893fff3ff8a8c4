//! Replica Requirements
//!
//! Every client request carries (explicitly or by default) a `ReplicaSpec`:
//! how many topology members to contact and how many of them must answer.

pub mod spec;

pub use spec::ReplicaSpec;
