use bytes::Bytes;
use reqwest::StatusCode;
use std::future::Future;
use std::time::Duration;

use super::protocol::{ENDPOINT_ENTITY, HEADER_BYPASS, HEADER_TIMESTAMP, HEADER_TOMBSTONE, PARAM_ID};
use super::topology::NodeAddress;
use super::types::{NodeOutcome, Operation};
use crate::entity::Timestamp;
use crate::error::{EntityError, Result};

/// Invokes a peer's entity operation.
///
/// Every call must reach the peer with the bypass marker set and must finish
/// within a bounded time. Timeouts, connection failures and unexpected
/// responses come back as `EntityError::Transport`.
pub trait NodeClient: Send + Sync + 'static {
    fn send(
        &self,
        node: &NodeAddress,
        key: &str,
        op: &Operation,
    ) -> impl Future<Output = Result<NodeOutcome>> + Send;
}

/// HTTP peer client.
///
/// One pooled `reqwest::Client` serves every peer; connections are reused
/// across requests.
#[derive(Clone)]
pub struct HttpNodeClient {
    http_client: reqwest::Client,
    timeout: Duration,
}

impl HttpNodeClient {
    pub fn new(timeout: Duration) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .connect_timeout(timeout)
            .timeout(timeout)
            .build()
            .map_err(|e| EntityError::Transport(e.to_string()))?;
        Ok(Self {
            http_client,
            timeout,
        })
    }
}

impl NodeClient for HttpNodeClient {
    async fn send(&self, node: &NodeAddress, key: &str, op: &Operation) -> Result<NodeOutcome> {
        let url = format!("{}{}", node.as_str(), ENDPOINT_ENTITY);

        let request = match op {
            Operation::Get => self.http_client.get(url),
            Operation::Put(value) => self.http_client.put(url).body(value.clone()),
            Operation::Delete => self.http_client.delete(url),
        };

        let response = request
            .query(&[(PARAM_ID, key)])
            .header(HEADER_BYPASS, "true")
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| EntityError::Transport(format!("{} {}: {}", op.name(), node, e)))?;

        let status = response.status();
        match (op, status) {
            (Operation::Get, StatusCode::OK) => {
                // Without a usable timestamp the value cannot be reconciled.
                let timestamp = response
                    .headers()
                    .get(HEADER_TIMESTAMP)
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.parse::<u64>().ok())
                    .map(Timestamp)
                    .ok_or_else(|| {
                        EntityError::Transport(format!(
                            "GET {} answered without a valid {} header",
                            node, HEADER_TIMESTAMP
                        ))
                    })?;
                let value: Bytes = response
                    .bytes()
                    .await
                    .map_err(|e| EntityError::Transport(format!("GET {} body: {}", node, e)))?;
                Ok(NodeOutcome::Present { value, timestamp })
            }
            (Operation::Get, StatusCode::NOT_FOUND) => {
                let tombstone = response
                    .headers()
                    .get(HEADER_TOMBSTONE)
                    .is_some_and(|v| v.as_bytes() == b"true");
                if tombstone {
                    Ok(NodeOutcome::Deleted)
                } else {
                    Ok(NodeOutcome::Absent)
                }
            }
            (Operation::Put(_), StatusCode::CREATED) => Ok(NodeOutcome::Ack),
            (Operation::Delete, StatusCode::ACCEPTED) => Ok(NodeOutcome::Ack),
            (Operation::Delete, StatusCode::NOT_FOUND) => Ok(NodeOutcome::Absent),
            (_, status) => Err(EntityError::Transport(format!(
                "{} {} answered {}",
                op.name(),
                node,
                status
            ))),
        }
    }
}
