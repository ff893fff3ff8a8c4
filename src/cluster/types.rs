use bytes::Bytes;
use std::str::FromStr;

use crate::entity::Timestamp;

/// Entity operation, as fanned out to one replica.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    Get,
    Put(Bytes),
    Delete,
}

impl Operation {
    pub fn name(&self) -> &'static str {
        match self {
            Operation::Get => "GET",
            Operation::Put(_) => "PUT",
            Operation::Delete => "DELETE",
        }
    }
}

/// What a single replica reported for one operation.
///
/// Transport failures are not an outcome; they travel as `Err` and count as an
/// abstention.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeOutcome {
    /// A live record exists.
    Present { value: Bytes, timestamp: Timestamp },
    /// The replica has never seen the key.
    Absent,
    /// The replica holds a tombstone for the key.
    Deleted,
    /// A write (PUT or DELETE) was applied.
    Ack,
}

/// How a GET picks a value when several replicas report `Present`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReadReconciliation {
    /// The record with the greatest write timestamp wins; ties go to the later
    /// arrival.
    #[default]
    NewestTimestamp,
    /// Whichever `Present` arrives last wins, regardless of timestamps.
    LastObserved,
}

impl FromStr for ReadReconciliation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "newest" | "newest-timestamp" => Ok(ReadReconciliation::NewestTimestamp),
            "last-observed" => Ok(ReadReconciliation::LastObserved),
            other => Err(format!(
                "unknown read reconciliation '{}', expected 'newest' or 'last-observed'",
                other
            )),
        }
    }
}
