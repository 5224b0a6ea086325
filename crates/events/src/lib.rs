//! Security events: the audit record of each authorization decision, and the
//! sinks that accept them.

pub mod bounded_sink;
pub mod in_memory_sink;
pub mod security_event;
pub mod sink;
pub mod tracing_sink;

pub use bounded_sink::BoundedSink;
pub use in_memory_sink::InMemorySecurityEventSink;
pub use security_event::{CallerMetadata, SecurityEvent, SecurityEventKind};
pub use sink::{SecurityEventSink, SinkError};
pub use tracing_sink::{SECURITY_TARGET, TracingSink};
