//! Entity Record Module
//!
//! Defines the on-disk shape of a stored entity and the codec that maps it to a
//! single byte blob.
//!
//! ## Record Layout
//! ```text
//! +----------------------+---------------------------+---------------+
//! | value (0..n bytes)   | timestamp (8 bytes, BE)   | tombstone (1) |
//! +----------------------+---------------------------+---------------+
//! ```
//! The trailer has a fixed width, so the value needs no length prefix: it is
//! simply everything in front of the trailer.

pub mod record;

pub use record::{StoredRecord, Timestamp, TRAILER_LEN, decode, encode};
