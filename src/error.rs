//! Error type shared by every layer of the node.
//!
//! Each variant corresponds to one failure class a client can observe (or, for
//! `Transport`, one the coordinator folds into its tally as an abstention).

/// Failure of an entity operation, local or coordinated.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum EntityError {
    /// Malformed client input: missing id, bad replica spec.
    #[error("bad request: {0}")]
    BadRequest(String),
    /// Key absent, or resolved as tombstoned.
    #[error("entity not found")]
    NotFound,
    /// Too few replicas answered (reads) or acknowledged (writes).
    #[error("quorum unmet: {acks} of {required} required replicas")]
    QuorumUnmet { acks: usize, required: usize },
    /// Peer timed out, was unreachable, or answered with an unexpected status.
    #[error("transport error: {0}")]
    Transport(String),
    /// The local node is not accepting requests.
    #[error("node is not accepting requests")]
    Unavailable,
    /// Stored bytes could not be decoded into a record.
    #[error("corrupt record: {0}")]
    CorruptRecord(String),
    /// The storage engine itself failed.
    #[error("storage error: {0}")]
    Storage(String),
}

pub type Result<T, E = EntityError> = std::result::Result<T, E>;
