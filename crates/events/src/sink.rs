//! Security event sink abstraction.
//!
//! A sink is the **only** channel through which the gate talks to the outside
//! world, and it is deliberately narrow: accept one event, return quickly.
//!
//! ## Contract
//!
//! - `record()` must not block on downstream delivery (network, disk, a slow
//!   aggregator). Implementations that talk to slow backends put a bounded
//!   queue in front of them (see `BoundedSink`).
//! - Failures are reported, never panicked. The gate counts them and moves on;
//!   a failed `record()` never changes an authorization decision.
//! - Implementations are shared across request threads (`Send + Sync`).

use std::sync::Arc;

use thiserror::Error;

use crate::SecurityEvent;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SinkError {
    #[error("security event sink is closed")]
    Closed,

    #[error("security event sink lock poisoned")]
    Poisoned,

    #[error("security event rejected: {0}")]
    Rejected(String),
}

pub trait SecurityEventSink: Send + Sync {
    fn record(&self, event: SecurityEvent) -> Result<(), SinkError>;
}

impl<S> SecurityEventSink for Arc<S>
where
    S: SecurityEventSink + ?Sized,
{
    fn record(&self, event: SecurityEvent) -> Result<(), SinkError> {
        (**self).record(event)
    }
}
