use std::net::SocketAddr;
use std::sync::Arc;

use reqwest::StatusCode;

use tenantgate_auth::{SharedGate, TenantGate, TenantRegistry};
use tenantgate_core::DenialReason;
use tenantgate_events::{InMemorySecurityEventSink, SecurityEventKind};

const KNOWN: &str = "my87674d777bf9";

struct TestServer {
    base_url: String,
    sink: Arc<InMemorySecurityEventSink>,
    gate: Arc<SharedGate>,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn(tenants: &[&str]) -> Self {
        let sink = Arc::new(InMemorySecurityEventSink::new());
        let gate = TenantGate::from_registry(TenantRegistry::new(tenants.iter().copied()), sink.clone());
        let gate = Arc::new(SharedGate::new(gate));

        // Same router as prod, bound to an ephemeral port.
        let app = tenantgate_api::app::build_app(Arc::clone(&gate));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
                .await
                .unwrap();
        });

        Self {
            base_url,
            sink,
            gate,
            handle,
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[tokio::test]
async fn denial_responses_are_byte_identical() {
    let server = TestServer::spawn(&[KNOWN]).await;
    let client = reqwest::Client::new();

    let mut bodies = Vec::new();
    for path in [
        "/tenants/fake123456789",
        "/tenants/short1",
        "/tenants/invalid_hash",
        "/tenants/..%2F..%2Fetc%2Fpasswd",
        "/tenants/%3Cscript%3Ealert(1)%3C%2Fscript%3E",
    ] {
        let res = client
            .get(format!("{}{}", server.base_url, path))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::NOT_FOUND, "{path}");
        bodies.push(res.bytes().await.unwrap());
    }

    assert!(bodies.windows(2).all(|w| w[0] == w[1]));

    let reasons: Vec<_> = server.sink.events().iter().map(|e| e.reason()).collect();
    assert_eq!(
        reasons,
        vec![
            Some(DenialReason::NotRegistered),
            Some(DenialReason::LengthOutOfRange),
            Some(DenialReason::InvalidFormat),
            Some(DenialReason::InvalidFormat),
            Some(DenialReason::LengthOutOfRange),
        ]
    );
}

#[tokio::test]
async fn granted_request_is_audited_with_caller_details() {
    let server = TestServer::spawn(&[KNOWN]).await;
    let client = reqwest::Client::new();

    let res = client
        .get(format!("{}/session", server.base_url))
        .header("x-tenant-id", KNOWN)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["tenant_id"], KNOWN);

    let events = server.sink.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].kind(), SecurityEventKind::AccessGranted);
    assert_eq!(events[0].caller().path(), Some("/session"));
    assert_eq!(
        events[0].caller().source_ip(),
        Some("127.0.0.1".parse().unwrap())
    );
}

#[tokio::test]
async fn unavailable_registry_fails_closed() {
    let server = TestServer::spawn(&[]).await;
    let client = reqwest::Client::new();

    let res = client
        .get(format!("{}/tenants/{}", server.base_url, KNOWN))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let events = server.sink.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].reason(), Some(DenialReason::RegistryUnavailable));
}

#[tokio::test]
async fn registry_swap_applies_to_subsequent_requests() {
    let server = TestServer::spawn(&["tenantAAAAAA"]).await;
    let client = reqwest::Client::new();
    let url = format!("{}/tenants/tenantBBBBBB", server.base_url);

    let res = client.get(&url).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    server.gate.reload(TenantRegistry::new(["tenantBBBBBB"])).unwrap();

    let res = client.get(&url).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}
