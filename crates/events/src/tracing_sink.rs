//! Sink that writes security events as structured `tracing` records.
//!
//! With the JSON subscriber from `tenantgate-observability` this yields one
//! JSON line per decision under the `tenantgate::security` target, ready for
//! whatever log shipper the deployment uses.

use tracing::{info, warn};

use crate::sink::{SecurityEventSink, SinkError};
use crate::{SecurityEvent, SecurityEventKind};

/// Log target for every security event.
pub const SECURITY_TARGET: &str = "tenantgate::security";

#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl TracingSink {
    pub fn new() -> Self {
        Self
    }
}

impl SecurityEventSink for TracingSink {
    fn record(&self, event: SecurityEvent) -> Result<(), SinkError> {
        let source_ip = event.caller().source_ip().map(|ip| ip.to_string());

        match event.kind() {
            SecurityEventKind::AccessGranted => info!(
                target: SECURITY_TARGET,
                event_id = %event.event_id(),
                occurred_at = %event.occurred_at(),
                tenant_id = event.tenant_id(),
                source_ip = source_ip.as_deref(),
                path = event.caller().path(),
                "{}",
                event.kind().as_str(),
            ),
            SecurityEventKind::AccessDenied => warn!(
                target: SECURITY_TARGET,
                event_id = %event.event_id(),
                occurred_at = %event.occurred_at(),
                tenant_id = event.tenant_id(),
                reason = event.reason().map(|r| r.as_str()),
                source_ip = source_ip.as_deref(),
                path = event.caller().path(),
                "{}",
                event.kind().as_str(),
            ),
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use tenantgate_core::DenialReason;

    use super::*;
    use crate::CallerMetadata;

    #[test]
    fn never_fails() {
        let sink = TracingSink::new();
        assert!(sink
            .record(SecurityEvent::granted("my87674d777bf9", CallerMetadata::new()))
            .is_ok());
        assert!(sink
            .record(SecurityEvent::denied(None, DenialReason::Malformed, CallerMetadata::new()))
            .is_ok());
    }
}
