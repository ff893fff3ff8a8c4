use axum::{
    body::Bytes,
    extract::{Extension, Query},
    http::{HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use std::sync::Arc;

use super::NodeService;
use crate::cluster::protocol::{EntityParams, HEADER_BYPASS, HEADER_TIMESTAMP, HEADER_TOMBSTONE};
use crate::cluster::{NodeClient, NodeOutcome, Operation};
use crate::error::EntityError;
use crate::replica::ReplicaSpec;

/// Maps a failed operation onto the client-visible status.
pub fn error_response(err: EntityError) -> Response {
    let status = match &err {
        EntityError::BadRequest(_) => StatusCode::BAD_REQUEST,
        EntityError::NotFound => StatusCode::NOT_FOUND,
        EntityError::QuorumUnmet { .. } | EntityError::Unavailable => StatusCode::GATEWAY_TIMEOUT,
        EntityError::Transport(_) => StatusCode::BAD_GATEWAY,
        EntityError::CorruptRecord(_) | EntityError::Storage(_) => {
            tracing::error!("Entity operation failed: {}", err);
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    (status, err.to_string()).into_response()
}

/// Validated request: the key plus its replica requirement (`None` = local only).
struct EntityRequest {
    key: String,
    spec: Option<ReplicaSpec>,
}

fn parse_request<C: NodeClient>(
    service: &NodeService<C>,
    headers: &HeaderMap,
    params: EntityParams,
) -> Result<EntityRequest, EntityError> {
    let key = match params.id {
        Some(id) if !id.is_empty() => id,
        _ => return Err(EntityError::BadRequest("missing id".into())),
    };

    let bypass = headers
        .get(HEADER_BYPASS)
        .is_some_and(|v| v.as_bytes().eq_ignore_ascii_case(b"true"));

    let spec = ReplicaSpec::parse(params.replicas.as_deref(), service.topology.len(), bypass)?;
    Ok(EntityRequest { key, spec })
}

pub async fn handle_status<C: NodeClient>(
    Extension(service): Extension<Arc<NodeService<C>>>,
) -> (StatusCode, &'static str) {
    if service.lifecycle().is_accepting() {
        (StatusCode::OK, "ok")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "unavailable")
    }
}

/// Rejects HEAD, which axum would otherwise serve with the GET handler.
pub async fn handle_method_not_allowed() -> StatusCode {
    StatusCode::METHOD_NOT_ALLOWED
}

pub async fn handle_get_entity<C: NodeClient>(
    Extension(service): Extension<Arc<NodeService<C>>>,
    Query(params): Query<EntityParams>,
    headers: HeaderMap,
) -> Response {
    let request = match parse_request(service.as_ref(), &headers, params) {
        Ok(request) => request,
        Err(e) => return error_response(e),
    };

    let Some(spec) = request.spec else {
        return match service.local.execute(&request.key, &Operation::Get) {
            Ok(NodeOutcome::Present { value, timestamp }) => {
                let mut response = (StatusCode::OK, value).into_response();
                response.headers_mut().insert(
                    HEADER_TIMESTAMP,
                    HeaderValue::from(timestamp.as_nanos()),
                );
                response
            }
            Ok(NodeOutcome::Deleted) => {
                let mut response = StatusCode::NOT_FOUND.into_response();
                response
                    .headers_mut()
                    .insert(HEADER_TOMBSTONE, HeaderValue::from_static("true"));
                response
            }
            Ok(_) => StatusCode::NOT_FOUND.into_response(),
            Err(e) => error_response(e),
        };
    };

    match service.coordinator.get(&request.key, spec).await {
        Ok(value) => (StatusCode::OK, value).into_response(),
        Err(e) => {
            tracing::debug!("GET {} failed: {}", request.key, e);
            error_response(e)
        }
    }
}

pub async fn handle_put_entity<C: NodeClient>(
    Extension(service): Extension<Arc<NodeService<C>>>,
    Query(params): Query<EntityParams>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let request = match parse_request(service.as_ref(), &headers, params) {
        Ok(request) => request,
        Err(e) => return error_response(e),
    };

    let result = match request.spec {
        None => service.local.put_value(&request.key, body),
        Some(spec) => service.coordinator.put(&request.key, body, spec).await,
    };

    match result {
        Ok(()) => StatusCode::CREATED.into_response(),
        Err(e) => {
            tracing::debug!("PUT {} failed: {}", request.key, e);
            error_response(e)
        }
    }
}

pub async fn handle_delete_entity<C: NodeClient>(
    Extension(service): Extension<Arc<NodeService<C>>>,
    Query(params): Query<EntityParams>,
    headers: HeaderMap,
) -> Response {
    let request = match parse_request(service.as_ref(), &headers, params) {
        Ok(request) => request,
        Err(e) => return error_response(e),
    };

    let result = match request.spec {
        // A never-written key is reported so the coordinating peer can count it.
        None => match service.local.execute(&request.key, &Operation::Delete) {
            Ok(NodeOutcome::Absent) => Err(EntityError::NotFound),
            Ok(_) => Ok(()),
            Err(e) => Err(e),
        },
        Some(spec) => service.coordinator.delete(&request.key, spec).await,
    };

    match result {
        Ok(()) => StatusCode::ACCEPTED.into_response(),
        Err(e) => {
            tracing::debug!("DELETE {} failed: {}", request.key, e);
            error_response(e)
        }
    }
}
