use crate::error::{EntityError, Result};

/// Per-request `(ack_count, node_count)` pair.
///
/// Invariant: `0 < ack_count <= node_count`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplicaSpec {
    ack_count: usize,
    node_count: usize,
}

impl ReplicaSpec {
    pub fn new(ack_count: usize, node_count: usize) -> Result<Self> {
        if ack_count == 0 {
            return Err(EntityError::BadRequest("ack count must be positive".into()));
        }
        if ack_count > node_count {
            return Err(EntityError::BadRequest(format!(
                "ack count {} exceeds node count {}",
                ack_count, node_count
            )));
        }
        Ok(Self {
            ack_count,
            node_count,
        })
    }

    /// Majority of the topology, capped at its size.
    pub fn default_for(topology_size: usize) -> Self {
        Self {
            ack_count: topology_size.min(topology_size / 2 + 1),
            node_count: topology_size,
        }
    }

    /// Resolves the replica requirement of one request.
    ///
    /// `bypass` marks a call coming from a peer that is coordinating its own
    /// quorum; such calls run against local storage only and yield `None`.
    pub fn parse(raw: Option<&str>, topology_size: usize, bypass: bool) -> Result<Option<Self>> {
        if bypass {
            return Ok(None);
        }

        let raw = match raw {
            Some(raw) if !raw.is_empty() => raw,
            _ => return Ok(Some(Self::default_for(topology_size))),
        };

        let (ack, total) = raw.split_once('/').ok_or_else(|| {
            EntityError::BadRequest(format!("replicas '{}' is not ACK/TOTAL", raw))
        })?;

        let ack_count = parse_count(ack, raw)?;
        let node_count = parse_count(total, raw)?;

        let spec = Self::new(ack_count, node_count)?;
        if node_count > topology_size {
            return Err(EntityError::BadRequest(format!(
                "replicas '{}' asks for {} nodes, topology has {}",
                raw, node_count, topology_size
            )));
        }

        Ok(Some(spec))
    }

    pub fn ack_count(&self) -> usize {
        self.ack_count
    }

    pub fn node_count(&self) -> usize {
        self.node_count
    }
}

/// Plain ASCII digits only; `usize::from_str` would also take a leading `+`.
fn parse_count(part: &str, raw: &str) -> Result<usize> {
    if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
        return Err(EntityError::BadRequest(format!(
            "replicas '{}': '{}' is not a count",
            raw, part
        )));
    }
    part.parse::<usize>()
        .map_err(|e| EntityError::BadRequest(format!("replicas '{}': {}", raw, e)))
}
