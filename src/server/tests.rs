//! HTTP Surface Tests
//!
//! Sends requests straight into the router with `tower::ServiceExt::oneshot`.
//!
//! ## Test Scopes
//! - **Routing**: Status probe, method table, 405 for unknown methods.
//! - **Validation**: Missing id and malformed replica specs are 400.
//! - **Bypass**: Local-only answers carry the metadata peers classify on.

#[cfg(test)]
mod tests {
    use crate::cluster::protocol::{HEADER_BYPASS, HEADER_TIMESTAMP, HEADER_TOMBSTONE};
    use crate::cluster::{NodeAddress, NodeClient, NodeOutcome, Operation, ReadReconciliation, Topology};
    use crate::error::{EntityError, Result};
    use crate::server::{NodeService, router};
    use crate::storage::MemoryEngine;
    use axum::body::Body;
    use axum::http::{Method, Request, StatusCode};
    use axum::Router;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tower::ServiceExt;

    const SELF: &str = "http://127.0.0.1:7001";

    /// Peer client whose every call fails, counting attempts.
    #[derive(Default)]
    struct DeadPeers {
        attempts: AtomicUsize,
    }

    impl NodeClient for DeadPeers {
        async fn send(&self, _node: &NodeAddress, _key: &str, _op: &Operation) -> Result<NodeOutcome> {
            self.attempts.fetch_add(1, Ordering::SeqCst);
            Err(EntityError::Transport("connection refused".into()))
        }
    }

    fn node(nodes: &[&str]) -> (Router, Arc<NodeService<DeadPeers>>) {
        let topology = Topology::new(nodes, SELF).unwrap();
        let service = NodeService::new(
            topology,
            Arc::new(MemoryEngine::new()),
            DeadPeers::default(),
            ReadReconciliation::default(),
        );
        service.lifecycle().start();
        (router(service.clone()), service)
    }

    fn request(method: Method, uri: &str, body: &'static [u8]) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::from(body))
            .unwrap()
    }

    fn bypass(method: Method, uri: &str, body: &'static [u8]) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(HEADER_BYPASS, "true")
            .body(Body::from(body))
            .unwrap()
    }

    async fn body_bytes(response: axum::response::Response) -> Vec<u8> {
        axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap()
            .to_vec()
    }

    // ============================================================
    // ROUTING
    // ============================================================

    #[tokio::test]
    async fn test_status_ok_while_running() {
        let (app, service) = node(&[SELF]);

        let response = app
            .clone()
            .oneshot(request(Method::GET, "/v0/status", b""))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_bytes(response).await, b"ok");

        service.lifecycle().stop();
        let response = app
            .oneshot(request(Method::GET, "/v0/status", b""))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_unsupported_method_is_405() {
        let (app, _) = node(&[SELF]);
        let response = app
            .oneshot(request(Method::POST, "/v0/entity?id=k", b"v"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn test_head_is_405_not_routed_to_get() {
        let (app, _) = node(&[SELF]);

        app.clone()
            .oneshot(request(Method::PUT, "/v0/entity?id=k", b"v"))
            .await
            .unwrap();

        for uri in ["/v0/entity?id=k", "/v0/entity?id=missing", "/v0/status"] {
            let response = app
                .clone()
                .oneshot(request(Method::HEAD, uri, b""))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED, "{}", uri);
        }
    }

    #[tokio::test]
    async fn test_put_get_delete_single_node() {
        let (app, _) = node(&[SELF]);

        let response = app
            .clone()
            .oneshot(request(Method::PUT, "/v0/entity?id=k", b"value"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let response = app
            .clone()
            .oneshot(request(Method::GET, "/v0/entity?id=k", b""))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_bytes(response).await, b"value");

        let response = app
            .clone()
            .oneshot(request(Method::DELETE, "/v0/entity?id=k", b""))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::ACCEPTED);

        let response = app
            .oneshot(request(Method::GET, "/v0/entity?id=k", b""))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_stopped_node_returns_504() {
        let (app, service) = node(&[SELF]);
        service.lifecycle().stop();

        let response = app
            .oneshot(request(Method::PUT, "/v0/entity?id=k", b"v"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::GATEWAY_TIMEOUT);
    }

    // ============================================================
    // VALIDATION
    // ============================================================

    #[tokio::test]
    async fn test_missing_or_empty_id_is_400() {
        let (app, _) = node(&[SELF]);

        for uri in ["/v0/entity", "/v0/entity?id=", "/v0/entity?replicas=1/1"] {
            let response = app
                .clone()
                .oneshot(request(Method::GET, uri, b""))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{}", uri);
        }
    }

    #[tokio::test]
    async fn test_bad_replica_spec_is_400() {
        let (app, _) = node(&[SELF, "http://127.0.0.1:7002", "http://127.0.0.1:7003"]);

        for replicas in ["0/3", "3/2", "x/3", "2/5", "13", "+1/3"] {
            let uri = format!("/v0/entity?id=k&replicas={}", replicas);
            let response = app
                .clone()
                .oneshot(request(Method::PUT, &uri, b"v"))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{}", replicas);
        }
    }

    // ============================================================
    // QUORUM
    // ============================================================

    #[tokio::test]
    async fn test_unmet_quorum_is_504() {
        let (app, service) = node(&[SELF, "http://127.0.0.1:7002", "http://127.0.0.1:7003"]);

        let response = app
            .oneshot(request(Method::PUT, "/v0/entity?id=k&replicas=2/3", b"v"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::GATEWAY_TIMEOUT);
        // The local replica still holds the write.
        assert!(service.local.get_record("k").unwrap().is_some());
    }

    // ============================================================
    // BYPASS
    // ============================================================

    #[tokio::test]
    async fn test_bypass_never_contacts_peers() {
        let (app, service) = node(&[SELF, "http://127.0.0.1:7002", "http://127.0.0.1:7003"]);

        let response = app
            .clone()
            .oneshot(bypass(Method::PUT, "/v0/entity?id=k&replicas=3/3", b"v"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let response = app
            .oneshot(bypass(Method::GET, "/v0/entity?id=k&replicas=3/3", b""))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key(HEADER_TIMESTAMP));
        assert_eq!(body_bytes(response).await, b"v");

        assert_eq!(service.coordinator_attempts(), 0);
    }

    #[tokio::test]
    async fn test_bypass_get_marks_tombstone() {
        let (app, _) = node(&[SELF]);

        for req in [
            bypass(Method::PUT, "/v0/entity?id=k", b"v"),
            bypass(Method::DELETE, "/v0/entity?id=k", b""),
        ] {
            app.clone().oneshot(req).await.unwrap();
        }

        let response = app
            .clone()
            .oneshot(bypass(Method::GET, "/v0/entity?id=k", b""))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(response.headers().get(HEADER_TOMBSTONE).unwrap(), "true");

        let response = app
            .oneshot(bypass(Method::GET, "/v0/entity?id=other", b""))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(response.headers().get(HEADER_TOMBSTONE).is_none());
    }

    #[tokio::test]
    async fn test_bypass_delete_of_unknown_key_is_404() {
        let (app, _) = node(&[SELF]);
        let response = app
            .oneshot(bypass(Method::DELETE, "/v0/entity?id=ghost", b""))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    impl NodeService<DeadPeers> {
        fn coordinator_attempts(&self) -> usize {
            self.coordinator.client().attempts.load(Ordering::SeqCst)
        }
    }
}
