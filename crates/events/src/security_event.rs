use std::net::IpAddr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use tenantgate_core::DenialReason;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SecurityEventKind {
    AccessGranted,
    AccessDenied,
}

impl SecurityEventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AccessGranted => "ACCESS_GRANTED",
            Self::AccessDenied => "ACCESS_DENIED",
        }
    }
}

/// Caller-supplied request context attached to an event.
///
/// How the caller obtains these values is its own business; the gate copies
/// them into the event unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallerMetadata {
    source_ip: Option<IpAddr>,
    path: Option<String>,
}

impl CallerMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_source_ip(mut self, ip: IpAddr) -> Self {
        self.source_ip = Some(ip);
        self
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn source_ip(&self) -> Option<IpAddr> {
        self.source_ip
    }

    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }
}

/// Audit record of a single authorization decision.
///
/// Notes:
/// - `tenant_id` is the raw caller input **verbatim**, including hostile
///   payloads, so forensics see exactly what was sent. `None` means the
///   caller supplied nothing.
/// - `reason` is present iff `kind` is `AccessDenied`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurityEvent {
    event_id: Uuid,
    occurred_at: DateTime<Utc>,
    kind: SecurityEventKind,
    tenant_id: Option<String>,
    reason: Option<DenialReason>,
    caller: CallerMetadata,
}

impl SecurityEvent {
    pub fn granted(tenant_id: impl Into<String>, caller: CallerMetadata) -> Self {
        Self {
            event_id: Uuid::now_v7(),
            occurred_at: Utc::now(),
            kind: SecurityEventKind::AccessGranted,
            tenant_id: Some(tenant_id.into()),
            reason: None,
            caller,
        }
    }

    pub fn denied(tenant_id: Option<String>, reason: DenialReason, caller: CallerMetadata) -> Self {
        Self {
            event_id: Uuid::now_v7(),
            occurred_at: Utc::now(),
            kind: SecurityEventKind::AccessDenied,
            tenant_id,
            reason: Some(reason),
            caller,
        }
    }

    pub fn event_id(&self) -> Uuid {
        self.event_id
    }

    pub fn occurred_at(&self) -> DateTime<Utc> {
        self.occurred_at
    }

    pub fn kind(&self) -> SecurityEventKind {
        self.kind
    }

    pub fn tenant_id(&self) -> Option<&str> {
        self.tenant_id.as_deref()
    }

    pub fn reason(&self) -> Option<DenialReason> {
        self.reason
    }

    pub fn caller(&self) -> &CallerMetadata {
        &self.caller
    }
}
