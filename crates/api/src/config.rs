//! Startup configuration, read from the environment once.

use std::net::SocketAddr;
use std::path::PathBuf;

use thiserror::Error;

use tenantgate_auth::TenantRegistry;
use tenantgate_core::{RegistryError, RegistryResult};

pub const REGISTRY_PATH_ENV: &str = "TENANT_REGISTRY_PATH";
pub const REGISTRY_INLINE_ENV: &str = "TENANT_REGISTRY";
pub const BIND_ENV: &str = "TENANTGATE_BIND";
pub const QUEUE_CAPACITY_ENV: &str = "SECURITY_EVENT_QUEUE_CAPACITY";

const DEFAULT_BIND: &str = "0.0.0.0:8080";
const DEFAULT_QUEUE_CAPACITY: usize = 1024;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {name}: {value:?}")]
    InvalidVar { name: &'static str, value: String },
}

/// Where the tenant registry comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrySource {
    File(PathBuf),
    Inline(String),
    Unconfigured,
}

impl RegistrySource {
    /// Load the registry. Errors here mean the gate must run fail-closed.
    pub fn load(&self) -> RegistryResult<TenantRegistry> {
        match self {
            Self::File(path) => TenantRegistry::load_from_path(path),
            Self::Inline(list) => TenantRegistry::from_csv(list),
            Self::Unconfigured => Err(RegistryError::Unconfigured),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GateConfig {
    pub registry: RegistrySource,
    pub bind_addr: SocketAddr,
    pub event_queue_capacity: usize,
}

impl GateConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from an arbitrary variable lookup (the environment, or a map in tests).
    ///
    /// A registry file takes precedence over an inline list.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let registry = match (non_empty(REGISTRY_PATH_ENV), non_empty(REGISTRY_INLINE_ENV)) {
            (Some(path), _) => RegistrySource::File(PathBuf::from(path)),
            (None, Some(list)) => RegistrySource::Inline(list),
            (None, None) => RegistrySource::Unconfigured,
        };

        let bind = non_empty(BIND_ENV).unwrap_or_else(|| DEFAULT_BIND.to_string());
        let bind_addr = bind.trim().parse().map_err(|_| ConfigError::InvalidVar {
            name: BIND_ENV,
            value: bind.clone(),
        })?;

        let event_queue_capacity = match non_empty(QUEUE_CAPACITY_ENV) {
            None => DEFAULT_QUEUE_CAPACITY,
            Some(raw) => match raw.trim().parse::<usize>() {
                Ok(n) if n > 0 => n,
                _ => {
                    return Err(ConfigError::InvalidVar {
                        name: QUEUE_CAPACITY_ENV,
                        value: raw,
                    });
                }
            },
        };

        Ok(Self {
            registry,
            bind_addr,
            event_queue_capacity,
        })
    }
}
