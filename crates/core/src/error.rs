//! Registry provisioning errors.

use std::path::PathBuf;

use thiserror::Error;

use crate::FormatViolation;

/// Result type for registry construction and loading.
pub type RegistryResult<T> = Result<T, RegistryError>;

/// Why a tenant registry could not be built.
///
/// Every variant is a startup configuration failure. A gate that hits one of
/// these must run fail-closed until a usable registry is supplied.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// No registry source was configured.
    #[error("no tenant registry source configured")]
    Unconfigured,

    /// The source was readable but listed no tenants.
    #[error("tenant registry is empty")]
    Empty,

    /// An entry can never pass the format rules, so the source is wrong.
    #[error("invalid registry entry {entry:?}: {violation}")]
    InvalidEntry {
        entry: String,
        violation: FormatViolation,
    },

    /// The registry file could not be read.
    #[error("failed to read tenant registry {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The registry source could not be parsed.
    #[error("failed to parse tenant registry: {0}")]
    Parse(String),
}
