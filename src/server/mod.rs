//! HTTP Surface
//!
//! Wires the node's services into an axum `Router`.
//!
//! ## Route Table
//! | Path          | Method | Handler                |
//! |---------------|--------|------------------------|
//! | `/v0/status`  | GET    | `handle_status`        |
//! | `/v0/entity`  | GET    | `handle_get_entity`    |
//! | `/v0/entity`  | PUT    | `handle_put_entity`    |
//! | `/v0/entity`  | DELETE | `handle_delete_entity` |
//!
//! Any other method on a known path, HEAD included, is answered with
//! `405 Method Not Allowed`.

pub mod handlers;

use axum::extract::Extension;
use axum::routing::get;
use axum::Router;
use std::sync::Arc;

use crate::cluster::protocol::{ENDPOINT_ENTITY, ENDPOINT_STATUS};
use crate::cluster::{NodeClient, ReadReconciliation, ReplicationCoordinator, Topology};
use crate::storage::{LocalStore, NodeLifecycle, StorageEngine};
use handlers::{
    handle_delete_entity, handle_get_entity, handle_method_not_allowed, handle_put_entity,
    handle_status,
};

/// Everything one node needs to answer requests.
pub struct NodeService<C> {
    pub topology: Arc<Topology>,
    pub local: Arc<LocalStore>,
    pub coordinator: ReplicationCoordinator<C>,
}

impl<C: NodeClient> NodeService<C> {
    pub fn new(
        topology: Topology,
        engine: Arc<dyn StorageEngine>,
        client: C,
        reconciliation: ReadReconciliation,
    ) -> Arc<Self> {
        let topology = Arc::new(topology);
        let lifecycle = Arc::new(NodeLifecycle::new());
        let local = Arc::new(LocalStore::new(engine, lifecycle));
        let coordinator =
            ReplicationCoordinator::new(topology.clone(), local.clone(), Arc::new(client), reconciliation);

        Arc::new(Self {
            topology,
            local,
            coordinator,
        })
    }

    pub fn lifecycle(&self) -> &NodeLifecycle {
        self.local.lifecycle()
    }
}

pub fn router<C: NodeClient>(service: Arc<NodeService<C>>) -> Router {
    Router::new()
        .route(
            ENDPOINT_STATUS,
            get(handle_status::<C>).head(handle_method_not_allowed),
        )
        .route(
            ENDPOINT_ENTITY,
            get(handle_get_entity::<C>)
                .head(handle_method_not_allowed)
                .put(handle_put_entity::<C>)
                .delete(handle_delete_entity::<C>),
        )
        .layer(Extension(service))
}

#[cfg(test)]
mod tests;
