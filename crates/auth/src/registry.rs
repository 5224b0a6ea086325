//! Immutable registry of authorized tenant identifiers.

use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

use serde::Deserialize;
use tracing::info;

use tenantgate_core::{RegistryError, RegistryResult, TenantKey};

/// Frozen set of tenant keys.
///
/// - Built once; there is no way to add or remove members afterwards.
/// - Cloning shares the same set (cheap, lock-free reads from any thread).
/// - Membership is exact: case-sensitive, no trimming, no normalization.
#[derive(Debug, Clone)]
pub struct TenantRegistry {
    keys: Arc<HashSet<TenantKey>>,
}

/// Accepted JSON registry layouts.
#[derive(Deserialize)]
#[serde(untagged)]
enum RegistryDocument {
    List(Vec<String>),
    Object { tenants: Vec<String> },
}

impl TenantRegistry {
    /// Build a registry from identifiers.
    ///
    /// Fails if there are no entries, or if any entry could never pass the
    /// gate's format rules (that is a provisioning mistake, not a tenant).
    pub fn new<I, S>(entries: I) -> RegistryResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut keys = HashSet::new();
        for entry in entries {
            let entry = entry.as_ref();
            let key = TenantKey::parse(entry).map_err(|violation| RegistryError::InvalidEntry {
                entry: entry.to_string(),
                violation,
            })?;
            keys.insert(key);
        }

        if keys.is_empty() {
            return Err(RegistryError::Empty);
        }

        Ok(Self { keys: Arc::new(keys) })
    }

    /// Parse a JSON registry: either `["id", ...]` or `{ "tenants": ["id", ...] }`.
    pub fn from_json_str(json: &str) -> RegistryResult<Self> {
        let doc: RegistryDocument =
            serde_json::from_str(json).map_err(|e| RegistryError::Parse(e.to_string()))?;
        match doc {
            RegistryDocument::List(tenants) | RegistryDocument::Object { tenants } => Self::new(tenants),
        }
    }

    /// Parse a newline-delimited registry.
    ///
    /// Lines are trimmed; blank lines and `#` comments are skipped.
    pub fn from_lines(text: &str) -> RegistryResult<Self> {
        Self::new(
            text.lines()
                .map(str::trim)
                .filter(|l| !l.is_empty() && !l.starts_with('#')),
        )
    }

    /// Parse a comma-separated inline list (e.g. from an environment variable).
    pub fn from_csv(list: &str) -> RegistryResult<Self> {
        Self::new(list.split(',').map(str::trim).filter(|s| !s.is_empty()))
    }

    /// Load a registry file.
    ///
    /// JSON is detected by a `.json` extension or a leading `[`/`{`; anything
    /// else is read as newline-delimited text.
    pub fn load_from_path(path: impl AsRef<Path>) -> RegistryResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| RegistryError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let is_json = path.extension().is_some_and(|ext| ext == "json")
            || text.trim_start().starts_with(['[', '{']);

        let registry = if is_json {
            Self::from_json_str(&text)?
        } else {
            Self::from_lines(&text)?
        };

        info!(path = %path.display(), tenants = registry.len(), "tenant registry loaded");
        Ok(registry)
    }

    /// Exact-match lookup, returning the registered key.
    pub fn get(&self, raw: &str) -> Option<&TenantKey> {
        self.keys.get(raw)
    }

    pub fn contains(&self, raw: &str) -> bool {
        self.keys.contains(raw)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}
