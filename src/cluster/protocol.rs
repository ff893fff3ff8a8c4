//! Entity HTTP Protocol
//!
//! Paths, query parameters and headers shared by the node's HTTP handlers and
//! the peer client that calls them.

use serde::Deserialize;

// --- API Endpoints ---

/// Liveness probe: `200 ok` while the node is running.
pub const ENDPOINT_STATUS: &str = "/v0/status";
/// Entity CRUD; methods GET, PUT and DELETE.
pub const ENDPOINT_ENTITY: &str = "/v0/entity";

// --- Query parameters ---

pub const PARAM_ID: &str = "id";
pub const PARAM_REPLICAS: &str = "replicas";

// --- Headers ---

/// Set by a coordinating node on every peer call: answer from local storage
/// only and do not replicate further.
pub const HEADER_BYPASS: &str = "x-replica-bypass";
/// Write time (nanoseconds) of the record returned by a bypass GET.
pub const HEADER_TIMESTAMP: &str = "x-entity-timestamp";
/// Present with value `true` on a bypass GET 404 caused by a tombstone.
pub const HEADER_TOMBSTONE: &str = "x-entity-tombstone";

/// Query string of `/v0/entity`.
#[derive(Debug, Default, Deserialize)]
pub struct EntityParams {
    /// Entity key; required and non-empty.
    pub id: Option<String>,
    /// Optional `ACK/TOTAL` replica requirement.
    pub replicas: Option<String>,
}
