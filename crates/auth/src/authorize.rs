use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::{error, warn};

use tenantgate_core::{DenialReason, RegistryResult, TenantKey, check_format};
use tenantgate_events::{CallerMetadata, SecurityEvent, SecurityEventSink};

use crate::TenantRegistry;

/// Untrusted tenant identifier as it arrived at the boundary.
///
/// The boundary may hand over nothing, a string, or some other value (e.g. a
/// JSON number in a request body). Only `Text` can ever be authorized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TenantInput<'a> {
    Missing,
    Text(&'a str),
    /// A non-string value, kept in its rendered form for the audit record.
    Other(String),
}

impl TenantInput<'_> {
    /// The raw value to echo into decisions and security events.
    fn raw(&self) -> Option<String> {
        match self {
            Self::Missing => None,
            Self::Text(s) => Some((*s).to_string()),
            Self::Other(rendered) => Some(rendered.clone()),
        }
    }
}

impl<'a> From<&'a str> for TenantInput<'a> {
    fn from(value: &'a str) -> Self {
        Self::Text(value)
    }
}

impl<'a> From<Option<&'a str>> for TenantInput<'a> {
    fn from(value: Option<&'a str>) -> Self {
        value.map_or(Self::Missing, Self::Text)
    }
}

impl<'a> From<&'a String> for TenantInput<'a> {
    fn from(value: &'a String) -> Self {
        Self::Text(value.as_str())
    }
}

impl<'a> From<Option<&'a serde_json::Value>> for TenantInput<'a> {
    fn from(value: Option<&'a serde_json::Value>) -> Self {
        match value {
            None | Some(serde_json::Value::Null) => Self::Missing,
            Some(serde_json::Value::String(s)) => Self::Text(s.as_str()),
            Some(other) => Self::Other(other.to_string()),
        }
    }
}

impl<'a> From<&'a serde_json::Value> for TenantInput<'a> {
    fn from(value: &'a serde_json::Value) -> Self {
        Self::from(Some(value))
    }
}

/// Outcome of one authorization call.
///
/// `reason` is for audit only; see [`crate::PublicOutcome`] for what callers
/// may expose.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizationDecision {
    allowed: bool,
    reason: Option<DenialReason>,
    tenant_id: Option<String>,
    key: Option<TenantKey>,
}

impl AuthorizationDecision {
    fn grant(key: TenantKey) -> Self {
        Self {
            allowed: true,
            reason: None,
            tenant_id: Some(key.as_str().to_string()),
            key: Some(key),
        }
    }

    fn deny(reason: DenialReason, tenant_id: Option<String>) -> Self {
        Self {
            allowed: false,
            reason: Some(reason),
            tenant_id,
            key: None,
        }
    }

    pub fn is_allowed(&self) -> bool {
        self.allowed
    }

    pub fn reason(&self) -> Option<DenialReason> {
        self.reason
    }

    /// Raw input, echoed verbatim.
    pub fn tenant_id(&self) -> Option<&str> {
        self.tenant_id.as_deref()
    }

    /// Lookup key for tenant-specific data; `Some` only when allowed.
    pub fn key(&self) -> Option<&TenantKey> {
        self.key.as_ref()
    }

    pub fn into_key(self) -> Option<TenantKey> {
        self.key
    }
}

#[derive(Debug)]
enum RegistryState {
    Ready(TenantRegistry),
    Unavailable(String),
}

/// The tenant authorization gate.
///
/// - No IO on the decision path (registry is fully in memory)
/// - No panics, no errors: every input yields a decision
/// - Exactly one security event per call, allow or deny
/// - Fail-closed: without a registry, everything is denied
pub struct TenantGate {
    registry: RegistryState,
    sink: Arc<dyn SecurityEventSink>,
    events_lost: Arc<AtomicU64>,
}

impl core::fmt::Debug for TenantGate {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TenantGate")
            .field("registry", &self.registry)
            .field("events_lost", &self.events_lost())
            .finish_non_exhaustive()
    }
}

impl TenantGate {
    pub fn new(registry: TenantRegistry, sink: Arc<dyn SecurityEventSink>) -> Self {
        Self {
            registry: RegistryState::Ready(registry),
            sink,
            events_lost: Arc::new(AtomicU64::new(0)),
        }
    }

    /// A gate with no registry. It denies every call with
    /// `REGISTRY_UNAVAILABLE` (and still records each one).
    pub fn unavailable(cause: impl Into<String>, sink: Arc<dyn SecurityEventSink>) -> Self {
        let cause = cause.into();
        error!(cause = %cause, "tenant registry unavailable; all tenant access will be denied");
        Self {
            registry: RegistryState::Unavailable(cause),
            sink,
            events_lost: Arc::new(AtomicU64::new(0)),
        }
    }

    /// A gate over `registry` that records into this gate's sink and keeps
    /// counting into the same lost-event counter.
    pub fn successor(&self, registry: TenantRegistry) -> Self {
        Self {
            registry: RegistryState::Ready(registry),
            sink: Arc::clone(&self.sink),
            events_lost: Arc::clone(&self.events_lost),
        }
    }

    /// Build from a registry load attempt, failing closed on error.
    pub fn from_registry(result: RegistryResult<TenantRegistry>, sink: Arc<dyn SecurityEventSink>) -> Self {
        match result {
            Ok(registry) => Self::new(registry, sink),
            Err(e) => Self::unavailable(e.to_string(), sink),
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self.registry, RegistryState::Ready(_))
    }

    pub fn registry(&self) -> Option<&TenantRegistry> {
        match &self.registry {
            RegistryState::Ready(r) => Some(r),
            RegistryState::Unavailable(_) => None,
        }
    }

    pub fn sink(&self) -> Arc<dyn SecurityEventSink> {
        Arc::clone(&self.sink)
    }

    /// Security events the sink refused, across this gate and its successors.
    pub fn events_lost(&self) -> u64 {
        self.events_lost.load(Ordering::Relaxed)
    }

    /// Authorize without caller metadata.
    pub fn authorize<'a>(&self, input: impl Into<TenantInput<'a>>) -> AuthorizationDecision {
        self.authorize_with(input, CallerMetadata::default())
    }

    /// Authorize and attach `caller` to the security event.
    pub fn authorize_with<'a>(
        &self,
        input: impl Into<TenantInput<'a>>,
        caller: CallerMetadata,
    ) -> AuthorizationDecision {
        let input = input.into();
        let decision = self.decide(&input);
        self.emit(&decision, caller);
        decision
    }

    /// Pure decision. Rules run in a fixed order; the first failure wins.
    fn decide(&self, input: &TenantInput<'_>) -> AuthorizationDecision {
        let registry = match &self.registry {
            RegistryState::Ready(r) => r,
            RegistryState::Unavailable(_) => {
                return AuthorizationDecision::deny(DenialReason::RegistryUnavailable, input.raw());
            }
        };

        let raw = match input {
            TenantInput::Text(s) => *s,
            TenantInput::Missing | TenantInput::Other(_) => {
                return AuthorizationDecision::deny(DenialReason::Malformed, input.raw());
            }
        };

        if let Err(violation) = check_format(raw) {
            return AuthorizationDecision::deny(violation.denial_reason(), input.raw());
        }

        match registry.get(raw) {
            Some(key) => AuthorizationDecision::grant(key.clone()),
            None => AuthorizationDecision::deny(DenialReason::NotRegistered, input.raw()),
        }
    }

    fn emit(&self, decision: &AuthorizationDecision, caller: CallerMetadata) {
        let event = match (decision.key(), decision.reason()) {
            (Some(key), _) => SecurityEvent::granted(key.as_str(), caller),
            (None, reason) => SecurityEvent::denied(
                decision.tenant_id().map(str::to_string),
                reason.unwrap_or(DenialReason::Malformed),
                caller,
            ),
        };

        if let Err(e) = self.sink.record(event) {
            let lost = self.events_lost.fetch_add(1, Ordering::Relaxed) + 1;
            warn!(error = %e, events_lost = lost, "security event not recorded");
        }
    }
}
