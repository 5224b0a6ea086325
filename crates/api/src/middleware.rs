use std::net::SocketAddr;

use axum::{
    extract::{ConnectInfo, Query, State},
    http::{HeaderMap, Request, Uri},
    middleware::Next,
    response::Response,
};

use tenantgate_auth::{PublicOutcome, TenantInput};
use tenantgate_events::CallerMetadata;

use crate::app::{AppState, not_found};
use crate::context::TenantContext;

/// Header carrying the tenant identifier.
pub const TENANT_HEADER: &str = "x-tenant-id";

/// Gate every request on the tenant identifier before any tenant work.
///
/// The identifier comes from the `x-tenant-id` header, else the `tenant` query
/// parameter. On success a [`TenantContext`] is inserted for handlers; every
/// denial is the same 404.
pub async fn tenant_gate_middleware(
    State(state): State<AppState>,
    mut req: Request<axum::body::Body>,
    next: Next,
) -> Response {
    let caller = caller_metadata(&req);

    let query_values = tenant_query_values(req.uri());

    let decision = match header_input(req.headers()) {
        Some(input) => state.gate.authorize_with(input, caller),
        None => state
            .gate
            .authorize_with(query_input(req.uri(), query_values.as_deref()), caller),
    };

    match PublicOutcome::from(decision) {
        PublicOutcome::Granted(key) => {
            req.extensions_mut().insert(TenantContext::new(key));
            next.run(req).await
        }
        PublicOutcome::NotFound => not_found(),
    }
}

/// Header value as gate input. UTF-8 text goes through the format rules like
/// any other string; other bytes are handed over as a non-string so they are
/// denied as malformed but still audited.
fn header_input(headers: &HeaderMap) -> Option<TenantInput<'_>> {
    let value = headers.get(TENANT_HEADER)?;
    Some(match std::str::from_utf8(value.as_bytes()) {
        Ok(s) => TenantInput::Text(s),
        Err(_) => TenantInput::Other(String::from_utf8_lossy(value.as_bytes()).into_owned()),
    })
}

/// Every decoded `tenant` value in the query string, or `None` if the query
/// string does not parse.
fn tenant_query_values(uri: &Uri) -> Option<Vec<String>> {
    let Query(pairs) = Query::<Vec<(String, String)>>::try_from_uri(uri).ok()?;
    Some(
        pairs
            .into_iter()
            .filter(|(name, _)| name == "tenant")
            .map(|(_, value)| value)
            .collect(),
    )
}

/// Query parameter as gate input. Anything but a single `tenant` value is
/// audited as the raw query string.
fn query_input<'a>(uri: &Uri, values: Option<&'a [String]>) -> TenantInput<'a> {
    match values {
        Some([]) => TenantInput::Missing,
        Some([value]) => TenantInput::Text(value.as_str()),
        _ => TenantInput::Other(uri.query().unwrap_or_default().to_string()),
    }
}

/// Request details copied into the security event.
pub fn caller_metadata<B>(req: &Request<B>) -> CallerMetadata {
    let caller = CallerMetadata::new().with_path(req.uri().path());
    match req.extensions().get::<ConnectInfo<SocketAddr>>() {
        Some(ConnectInfo(addr)) => caller.with_source_ip(addr.ip()),
        None => caller,
    }
}
