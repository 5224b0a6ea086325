use tenantgate_core::TenantKey;

/// Tenant context for a request.
///
/// Only inserted after the gate allowed the identifier, so its presence means
/// the key is registered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TenantContext {
    key: TenantKey,
}

impl TenantContext {
    pub fn new(key: TenantKey) -> Self {
        Self { key }
    }

    pub fn key(&self) -> &TenantKey {
        &self.key
    }
}
