//! External view of a decision.
//!
//! Every denial collapses to the same `NotFound`, so callers cannot tell a
//! malformed identifier from an unregistered one. Render this, never the
//! decision's reason.

use tenantgate_core::TenantKey;

use crate::AuthorizationDecision;

/// Message shown to callers for every denial.
pub const NOT_FOUND_MESSAGE: &str = "resource not found";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublicOutcome {
    Granted(TenantKey),
    NotFound,
}

impl PublicOutcome {
    pub fn is_granted(&self) -> bool {
        matches!(self, Self::Granted(_))
    }
}

impl From<AuthorizationDecision> for PublicOutcome {
    fn from(decision: AuthorizationDecision) -> Self {
        match decision.into_key() {
            Some(key) => Self::Granted(key),
            None => Self::NotFound,
        }
    }
}

impl From<&AuthorizationDecision> for PublicOutcome {
    fn from(decision: &AuthorizationDecision) -> Self {
        decision.key().cloned().map_or(Self::NotFound, Self::Granted)
    }
}
