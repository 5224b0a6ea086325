//! Swappable gate handle.
//!
//! Registries never mutate. To change the tenant set, build a new
//! `TenantGate` and swap it in here. Requests that already took a snapshot via
//! `current()` finish against the gate they started with.

use std::sync::{Arc, RwLock};

use tracing::{info, warn};

use tenantgate_core::{RegistryError, RegistryResult};
use tenantgate_events::CallerMetadata;

use crate::{AuthorizationDecision, TenantGate, TenantInput, TenantRegistry};

#[derive(Debug)]
pub struct SharedGate {
    current: RwLock<Arc<TenantGate>>,
}

impl SharedGate {
    pub fn new(gate: TenantGate) -> Self {
        Self {
            current: RwLock::new(Arc::new(gate)),
        }
    }

    /// Snapshot of the active gate.
    pub fn current(&self) -> Arc<TenantGate> {
        // The guarded value is a plain `Arc`; a poisoned lock still holds a
        // complete gate.
        let guard = self.current.read().unwrap_or_else(|p| p.into_inner());
        Arc::clone(&*guard)
    }

    /// Install `gate`, returning the one it replaced.
    pub fn replace(&self, gate: TenantGate) -> Arc<TenantGate> {
        let mut guard = self.current.write().unwrap_or_else(|p| p.into_inner());
        std::mem::replace(&mut *guard, Arc::new(gate))
    }

    /// Swap in a freshly loaded registry, reusing the active gate's sink and
    /// lost-event counter.
    ///
    /// A failed load leaves the active gate untouched.
    pub fn reload(&self, result: RegistryResult<TenantRegistry>) -> Result<(), RegistryError> {
        match result {
            Ok(registry) => {
                let tenants = registry.len();
                let next = self.current().successor(registry);
                self.replace(next);
                info!(tenants, "tenant registry swapped");
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "tenant registry reload failed; keeping active registry");
                Err(e)
            }
        }
    }

    pub fn authorize_with<'a>(
        &self,
        input: impl Into<TenantInput<'a>>,
        caller: CallerMetadata,
    ) -> AuthorizationDecision {
        self.current().authorize_with(input, caller)
    }
}
