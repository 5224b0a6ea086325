//! `tenantgate-auth`: tenant authorization gate (fail-closed).
//!
//! This crate is intentionally decoupled from HTTP and storage: it decides,
//! records one security event per decision, and returns.

pub mod authorize;
pub mod outcome;
pub mod registry;
pub mod shared;

pub use authorize::{AuthorizationDecision, TenantGate, TenantInput};
pub use outcome::{NOT_FOUND_MESSAGE, PublicOutcome};
pub use registry::TenantRegistry;
pub use shared::SharedGate;
