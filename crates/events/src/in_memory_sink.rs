//! In-memory security event sink for tests/dev.

use std::sync::Mutex;

use crate::sink::{SecurityEventSink, SinkError};
use crate::SecurityEvent;

/// Records every event in arrival order.
#[derive(Debug, Default)]
pub struct InMemorySecurityEventSink {
    events: Mutex<Vec<SecurityEvent>>,
}

impl InMemorySecurityEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything recorded so far.
    pub fn events(&self) -> Vec<SecurityEvent> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.events.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl SecurityEventSink for InMemorySecurityEventSink {
    fn record(&self, event: SecurityEvent) -> Result<(), SinkError> {
        self.events
            .lock()
            .map_err(|_| SinkError::Poisoned)?
            .push(event);
        Ok(())
    }
}
