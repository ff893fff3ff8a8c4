use bytes::Bytes;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::Instrument;
use uuid::Uuid;

use super::client::NodeClient;
use super::topology::{NodeAddress, Topology};
use super::types::{NodeOutcome, Operation, ReadReconciliation};
use crate::entity::Timestamp;
use crate::error::{EntityError, Result};
use crate::replica::ReplicaSpec;
use crate::storage::LocalStore;

/// One replica's answer, as delivered to the tally loop.
struct Reply {
    node: NodeAddress,
    outcome: Result<NodeOutcome>,
}

/// Runs one client operation across the replicas selected by a `ReplicaSpec`.
///
/// Stateless between requests: each call is a single round of fan-out and a
/// tally over whatever came back.
pub struct ReplicationCoordinator<C> {
    topology: Arc<Topology>,
    local: Arc<LocalStore>,
    client: Arc<C>,
    reconciliation: ReadReconciliation,
}

impl<C: NodeClient> ReplicationCoordinator<C> {
    pub fn new(
        topology: Arc<Topology>,
        local: Arc<LocalStore>,
        client: Arc<C>,
        reconciliation: ReadReconciliation,
    ) -> Self {
        Self {
            topology,
            local,
            client,
            reconciliation,
        }
    }

    pub fn client(&self) -> &Arc<C> {
        &self.client
    }

    /// Quorum read.
    ///
    /// A tombstone seen on any responding replica wins over live values.
    pub async fn get(&self, key: &str, spec: ReplicaSpec) -> Result<Bytes> {
        let span = op_span(&Operation::Get, key, spec);
        self.tally_read(key, spec).instrument(span).await
    }

    /// Quorum write. Already-applied writes are not rolled back on shortfall.
    pub async fn put(&self, key: &str, value: Bytes, spec: ReplicaSpec) -> Result<()> {
        let op = Operation::Put(value);
        let span = op_span(&op, key, spec);
        self.tally_write(key, op, spec).instrument(span).await
    }

    /// Quorum delete. A replica that never held the key counts as a success.
    pub async fn delete(&self, key: &str, spec: ReplicaSpec) -> Result<()> {
        let op = Operation::Delete;
        let span = op_span(&op, key, spec);
        self.tally_write(key, op, spec).instrument(span).await
    }

    /// Starts one task per selected replica and returns the channel their
    /// replies arrive on, plus how many replies to expect.
    ///
    /// The tasks are detached: if the tally finishes early, calls still in
    /// flight run to completion so peers are never left half-way.
    fn dispatch(&self, key: &str, op: Operation, spec: ReplicaSpec) -> (mpsc::Receiver<Reply>, usize) {
        let targets = self.topology.select(spec.node_count());
        let (tx, rx) = mpsc::channel(targets.len().max(1));

        for node in targets {
            let tx = tx.clone();
            let node = node.clone();
            let key = key.to_string();
            let op = op.clone();

            if self.topology.is_local(&node) {
                let local = self.local.clone();
                tokio::spawn(
                    async move {
                        let outcome = local.execute(&key, &op);
                        let _ = tx.send(Reply { node, outcome }).await;
                    }
                    .in_current_span(),
                );
            } else {
                let client = self.client.clone();
                tokio::spawn(
                    async move {
                        let outcome = client.send(&node, &key, &op).await;
                        let _ = tx.send(Reply { node, outcome }).await;
                    }
                    .in_current_span(),
                );
            }
        }

        (rx, targets.len())
    }

    async fn tally_write(&self, key: &str, op: Operation, spec: ReplicaSpec) -> Result<()> {
        let required = spec.ack_count();
        let (mut rx, mut pending) = self.dispatch(key, op, spec);
        let mut acks = 0;

        // Stop as soon as the verdict cannot change either way.
        while acks < required && acks + pending >= required {
            let Some(reply) = rx.recv().await else {
                break;
            };
            pending -= 1;

            match reply.outcome {
                Ok(NodeOutcome::Ack) | Ok(NodeOutcome::Absent) => {
                    tracing::debug!(node = %reply.node, "replica acknowledged");
                    acks += 1;
                }
                Ok(other) => {
                    tracing::warn!(node = %reply.node, outcome = ?other, "unexpected write outcome");
                }
                Err(e) => {
                    tracing::warn!(node = %reply.node, error = %e, "replica abstained");
                }
            }
        }

        if acks >= required {
            Ok(())
        } else {
            tracing::warn!(acks, required, "write quorum unmet");
            Err(EntityError::QuorumUnmet { acks, required })
        }
    }

    async fn tally_read(&self, key: &str, spec: ReplicaSpec) -> Result<Bytes> {
        let required = spec.ack_count();
        let (mut rx, mut pending) = self.dispatch(key, Operation::Get, spec);

        let mut responses = 0;
        let mut deleted = false;
        let mut chosen: Option<(Bytes, Timestamp)> = None;

        while pending > 0 && responses + pending >= required && !(deleted && responses >= required) {
            let Some(reply) = rx.recv().await else {
                break;
            };
            pending -= 1;

            match reply.outcome {
                Ok(NodeOutcome::Present { value, timestamp }) => {
                    tracing::debug!(node = %reply.node, ts = timestamp.as_nanos(), "replica has value");
                    responses += 1;
                    chosen = Some(self.reconcile(chosen, value, timestamp));
                }
                Ok(NodeOutcome::Absent) => {
                    tracing::debug!(node = %reply.node, "replica has no value");
                    responses += 1;
                }
                Ok(NodeOutcome::Deleted) => {
                    tracing::debug!(node = %reply.node, "replica has tombstone");
                    responses += 1;
                    deleted = true;
                }
                Ok(NodeOutcome::Ack) => {
                    tracing::warn!(node = %reply.node, "unexpected ack on read");
                }
                Err(e) => {
                    tracing::warn!(node = %reply.node, error = %e, "replica abstained");
                }
            }
        }

        if responses < required {
            tracing::warn!(responses, required, "read quorum unmet");
            return Err(EntityError::QuorumUnmet {
                acks: responses,
                required,
            });
        }
        if deleted {
            return Err(EntityError::NotFound);
        }
        chosen.map(|(value, _)| value).ok_or(EntityError::NotFound)
    }

    fn reconcile(
        &self,
        current: Option<(Bytes, Timestamp)>,
        value: Bytes,
        timestamp: Timestamp,
    ) -> (Bytes, Timestamp) {
        match (self.reconciliation, current) {
            (ReadReconciliation::NewestTimestamp, Some((kept, kept_ts))) if kept_ts > timestamp => {
                (kept, kept_ts)
            }
            _ => (value, timestamp),
        }
    }
}

fn op_span(op: &Operation, key: &str, spec: ReplicaSpec) -> tracing::Span {
    tracing::info_span!(
        "replicate",
        op = op.name(),
        key = %key,
        ack = spec.ack_count(),
        from = spec.node_count(),
        op_id = %Uuid::new_v4(),
    )
}
