use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path, Request, State, rejection::PathRejection},
    http::StatusCode,
    middleware::from_fn_with_state,
    response::{IntoResponse, Response},
    routing::get,
};
use serde_json::json;

use tenantgate_auth::{NOT_FOUND_MESSAGE, PublicOutcome, SharedGate, TenantInput};

use crate::context::TenantContext;
use crate::middleware::{caller_metadata, tenant_gate_middleware};

#[derive(Clone)]
pub struct AppState {
    pub gate: Arc<SharedGate>,
}

/// Build the router.
///
/// - `GET /health`
/// - `GET /tenants/:tenant_id`: identifier from the path
/// - `GET /session`: identifier from `x-tenant-id` or `?tenant=`
///
/// Unknown routes render the same 404 as a denial.
pub fn build_app(gate: Arc<SharedGate>) -> Router {
    let state = AppState { gate };

    let gated = Router::new()
        .route("/session", get(session))
        .route_layer(from_fn_with_state(state.clone(), tenant_gate_middleware));

    Router::new()
        .route("/health", get(health))
        .route("/tenants/:tenant_id", get(resolve_tenant))
        .merge(gated)
        .fallback(fallback)
        .with_state(state)
}

/// The single external denial. Identical for every internal reason.
pub fn not_found() -> Response {
    json_error(StatusCode::NOT_FOUND, "not_found", NOT_FOUND_MESSAGE)
}

pub fn json_error(status: StatusCode, code: &'static str, message: impl Into<String>) -> Response {
    (
        status,
        Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

async fn health() -> StatusCode {
    StatusCode::OK
}

async fn resolve_tenant(
    State(state): State<AppState>,
    tenant_id: Result<Path<String>, PathRejection>,
    req: Request,
) -> Response {
    let caller = caller_metadata(&req);

    // A segment that does not decode is still an authorization attempt;
    // audit it as sent.
    let decision = match &tenant_id {
        Ok(Path(raw)) => state.gate.authorize_with(raw.as_str(), caller),
        Err(_) => state
            .gate
            .authorize_with(raw_last_segment(req.uri().path()), caller),
    };

    match PublicOutcome::from(decision) {
        PublicOutcome::Granted(key) => Json(json!({ "tenant_id": key })).into_response(),
        PublicOutcome::NotFound => not_found(),
    }
}

/// Undecoded last path segment, as a non-string input.
fn raw_last_segment(path: &str) -> TenantInput<'static> {
    match path.rsplit_once('/') {
        Some((_, segment)) if !segment.is_empty() => TenantInput::Other(segment.to_string()),
        _ => TenantInput::Missing,
    }
}

async fn session(Extension(tenant): Extension<TenantContext>) -> impl IntoResponse {
    Json(json!({ "tenant_id": tenant.key() }))
}

async fn fallback() -> Response {
    not_found()
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::Request as HttpRequest;
    use tower::ServiceExt;

    use tenantgate_auth::{TenantGate, TenantRegistry};
    use tenantgate_core::DenialReason;
    use tenantgate_events::InMemorySecurityEventSink;

    use super::*;

    const KNOWN: &str = "my87674d777bf9";

    fn test_app() -> (Router, Arc<InMemorySecurityEventSink>) {
        let sink = Arc::new(InMemorySecurityEventSink::new());
        let gate = TenantGate::new(TenantRegistry::new([KNOWN]).unwrap(), sink.clone());
        (build_app(Arc::new(SharedGate::new(gate))), sink)
    }

    async fn get(app: Router, uri: &str, tenant_header: Option<&str>) -> (StatusCode, serde_json::Value) {
        let mut builder = HttpRequest::builder().uri(uri);
        if let Some(h) = tenant_header {
            builder = builder.header(crate::middleware::TENANT_HEADER, h);
        }
        let res = app.oneshot(builder.body(Body::empty()).unwrap()).await.unwrap();
        let status = res.status();
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    #[tokio::test]
    async fn path_route_grants_registered_tenant() {
        let (app, sink) = test_app();
        let (status, body) = get(app, "/tenants/my87674d777bf9", None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["tenant_id"], KNOWN);
        assert_eq!(sink.events()[0].caller().path(), Some("/tenants/my87674d777bf9"));
    }

    #[tokio::test]
    async fn every_denial_renders_identically() {
        let mut bodies = Vec::new();
        for uri in [
            "/tenants/fake123456789",
            "/tenants/short1",
            "/tenants/invalid_hash",
            "/tenants/%27%20OR%201%3D1--",
            "/session",
            "/session?tenant=fake123456789",
            "/no/such/route",
        ] {
            let (app, _) = test_app();
            let (status, body) = get(app, uri, None).await;
            assert_eq!(status, StatusCode::NOT_FOUND, "{uri}");
            bodies.push(body);
        }

        assert!(bodies.windows(2).all(|w| w[0] == w[1]));
        assert_eq!(bodies[0]["message"], NOT_FOUND_MESSAGE);
    }

    #[tokio::test]
    async fn reasons_stay_in_the_audit_log() {
        let (app, sink) = test_app();
        get(app, "/tenants/%27%20OR%201%3D1--", None).await;

        let events = sink.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].tenant_id(), Some("' OR 1=1--"));
        assert_eq!(events[0].reason(), Some(DenialReason::InvalidFormat));
    }

    #[tokio::test]
    async fn session_accepts_header_or_query() {
        let (app, _) = test_app();
        let (status, body) = get(app, "/session", Some(KNOWN)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["tenant_id"], KNOWN);

        let (app, _) = test_app();
        let (status, _) = get(app, "/session?tenant=my87674d777bf9", None).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn header_takes_precedence_over_query() {
        let (app, sink) = test_app();
        let (status, _) = get(app, "/session?tenant=my87674d777bf9", Some("fake123456789")).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(sink.events()[0].reason(), Some(DenialReason::NotRegistered));
    }

    #[tokio::test]
    async fn missing_identifier_is_audited_as_malformed() {
        let (app, sink) = test_app();
        get(app, "/session", None).await;

        let events = sink.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].tenant_id(), None);
        assert_eq!(events[0].reason(), Some(DenialReason::Malformed));
    }

    #[tokio::test]
    async fn undecodable_path_segment_is_audited_as_sent() {
        let (app, sink) = test_app();
        let (status, _) = get(app, "/tenants/%FFtenant00001", None).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        let events = sink.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].tenant_id(), Some("%FFtenant00001"));
        assert_eq!(events[0].reason(), Some(DenialReason::Malformed));
    }

    #[tokio::test]
    async fn repeated_query_parameter_is_audited_as_sent() {
        let (app, sink) = test_app();
        let uri = "/session?tenant=my87674d777bf9&tenant=%27%20OR%201%3D1--";
        let (status, _) = get(app, uri, None).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        let events = sink.events();
        assert_eq!(events.len(), 1);
        assert_eq!(
            events[0].tenant_id(),
            Some("tenant=my87674d777bf9&tenant=%27%20OR%201%3D1--")
        );
        assert_eq!(events[0].reason(), Some(DenialReason::Malformed));
    }

    #[tokio::test]
    async fn query_value_is_decoded_before_the_gate() {
        let (app, sink) = test_app();
        get(app, "/session?tenant=%27%20OR%201%3D1--", None).await;

        let events = sink.events();
        assert_eq!(events[0].tenant_id(), Some("' OR 1=1--"));
        assert_eq!(events[0].reason(), Some(DenialReason::InvalidFormat));
    }

    #[tokio::test]
    async fn non_ascii_header_is_checked_like_any_string() {
        let (app, sink) = test_app();
        let (status, _) = get(app, "/session", Some("tenantéééé")).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        let events = sink.events();
        assert_eq!(events[0].tenant_id(), Some("tenantéééé"));
        assert_eq!(events[0].reason(), Some(DenialReason::InvalidFormat));
    }

    #[tokio::test]
    async fn health_is_ungated() {
        let (app, sink) = test_app();
        let (status, _) = get(app, "/health", None).await;

        assert_eq!(status, StatusCode::OK);
        assert!(sink.is_empty());
    }
}
