use bytes::{BufMut, Bytes, BytesMut};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::{EntityError, Result};

const TIMESTAMP_LEN: usize = 8;
const TOMBSTONE_LIVE: u8 = 0x00;
const TOMBSTONE_DELETED: u8 = 0x01;

/// Width of the fixed trailer appended after the value.
pub const TRAILER_LEN: usize = TIMESTAMP_LEN + 1;

/// Wall-clock write time, in nanoseconds since the Unix epoch.
///
/// Taken from the node's clock at write time, so it is only "monotonic-ish":
/// two nodes with skewed clocks may order concurrent writes differently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Timestamp(pub u64);

impl Timestamp {
    pub fn now() -> Self {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos();
        Self(u64::try_from(nanos).unwrap_or(u64::MAX))
    }

    pub fn as_nanos(&self) -> u64 {
        self.0
    }
}

/// A single entity as persisted by one node.
///
/// Deletion never removes the record; it is rewritten with `tombstone = true`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredRecord {
    pub value: Bytes,
    pub timestamp: Timestamp,
    pub tombstone: bool,
}

impl StoredRecord {
    /// A live record stamped with the current time.
    pub fn live(value: Bytes) -> Self {
        Self {
            value,
            timestamp: Timestamp::now(),
            tombstone: false,
        }
    }

    /// The same record turned into a tombstone, stamped with the delete time.
    pub fn into_tombstone(self) -> Self {
        Self {
            value: self.value,
            timestamp: Timestamp::now(),
            tombstone: true,
        }
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        encode(&self.value, self.timestamp, self.tombstone)
    }
}

/// Encodes `value ++ timestamp(8, BE) ++ tombstone(1)`.
pub fn encode(value: &[u8], timestamp: Timestamp, tombstone: bool) -> Vec<u8> {
    let mut buf = BytesMut::with_capacity(value.len() + TRAILER_LEN);
    buf.put_slice(value);
    buf.put_u64(timestamp.as_nanos());
    buf.put_u8(if tombstone {
        TOMBSTONE_DELETED
    } else {
        TOMBSTONE_LIVE
    });
    buf.to_vec()
}

/// Decodes a blob produced by [`encode`].
pub fn decode(raw: &[u8]) -> Result<StoredRecord> {
    if raw.len() < TRAILER_LEN {
        return Err(EntityError::CorruptRecord(format!(
            "{} bytes, trailer alone needs {}",
            raw.len(),
            TRAILER_LEN
        )));
    }

    let (value, trailer) = raw.split_at(raw.len() - TRAILER_LEN);
    let (ts_bytes, flag) = trailer.split_at(TIMESTAMP_LEN);

    let ts: [u8; TIMESTAMP_LEN] = ts_bytes
        .try_into()
        .map_err(|_| EntityError::CorruptRecord("short timestamp".into()))?;

    let tombstone = match flag[0] {
        TOMBSTONE_LIVE => false,
        TOMBSTONE_DELETED => true,
        other => {
            return Err(EntityError::CorruptRecord(format!(
                "unknown tombstone flag {:#04x}",
                other
            )));
        }
    };

    Ok(StoredRecord {
        value: Bytes::copy_from_slice(value),
        timestamp: Timestamp(u64::from_be_bytes(ts)),
        tombstone,
    })
}
