//! Validated tenant identifier and the format rules it must satisfy.

use core::borrow::Borrow;
use core::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::DenialReason;

/// Shortest accepted identifier (after trimming), inclusive.
pub const MIN_LEN: usize = 10;

/// Longest accepted identifier (after trimming), inclusive.
pub const MAX_LEN: usize = 20;

/// First format rule an identifier failed.
#[derive(Debug, Error, Copy, Clone, PartialEq, Eq, Hash)]
pub enum FormatViolation {
    #[error("identifier is empty")]
    Empty,

    #[error("identifier length must be between {} and {} characters", MIN_LEN, MAX_LEN)]
    Length,

    #[error("identifier must contain only ASCII letters and digits")]
    Charset,
}

impl FormatViolation {
    pub fn denial_reason(self) -> DenialReason {
        match self {
            Self::Empty => DenialReason::Malformed,
            Self::Length => DenialReason::LengthOutOfRange,
            Self::Charset => DenialReason::InvalidFormat,
        }
    }
}

/// Check `raw` against the format rules, in order: presence, length, charset.
///
/// - Length is measured in characters on the trimmed value.
/// - The character class is checked on the untrimmed value, so surrounding
///   whitespace passes the length rule but still fails here.
/// - Counting stops at `MAX_LEN + 1`, so oversized input costs O(MAX_LEN).
pub fn check_format(raw: &str) -> Result<(), FormatViolation> {
    if raw.is_empty() {
        return Err(FormatViolation::Empty);
    }

    let trimmed_len = raw.trim().chars().take(MAX_LEN + 1).count();
    if !(MIN_LEN..=MAX_LEN).contains(&trimmed_len) {
        return Err(FormatViolation::Length);
    }

    if !raw.bytes().all(|b| b.is_ascii_alphanumeric()) {
        return Err(FormatViolation::Charset);
    }

    Ok(())
}

/// A tenant identifier that passed every format rule.
///
/// Holding a `TenantKey` says nothing about registration; only the gate hands
/// out keys that are also registry members.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TenantKey(String);

impl TenantKey {
    pub fn parse(raw: &str) -> Result<Self, FormatViolation> {
        check_format(raw)?;
        Ok(Self(raw.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for TenantKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for TenantKey {
    type Err = FormatViolation;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for TenantKey {
    type Error = FormatViolation;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        check_format(&value)?;
        Ok(Self(value))
    }
}

impl From<TenantKey> for String {
    fn from(value: TenantKey) -> Self {
        value.0
    }
}

impl AsRef<str> for TenantKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// Lets a `HashSet<TenantKey>` be probed with a plain `&str`.
impl Borrow<str> for TenantKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}
