//! Denial taxonomy for authorization decisions.
//!
//! These reasons are **internal**: they belong in audit records, never in a
//! response returned to the caller.

use serde::{Deserialize, Serialize};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DenialReason {
    /// Input absent, empty, or not a string.
    Malformed,
    /// Trimmed length outside the accepted bounds.
    LengthOutOfRange,
    /// Contains a character outside `[A-Za-z0-9]`.
    InvalidFormat,
    /// Well-formed but not a registry member.
    NotRegistered,
    /// The gate has no usable registry and denies everything.
    RegistryUnavailable,
}

impl DenialReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Malformed => "MALFORMED",
            Self::LengthOutOfRange => "LENGTH_OUT_OF_RANGE",
            Self::InvalidFormat => "INVALID_FORMAT",
            Self::NotRegistered => "NOT_REGISTERED",
            Self::RegistryUnavailable => "REGISTRY_UNAVAILABLE",
        }
    }
}

impl core::fmt::Display for DenialReason {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_as_screaming_snake_case() {
        let json = serde_json::to_string(&DenialReason::LengthOutOfRange).unwrap();
        assert_eq!(json, "\"LENGTH_OUT_OF_RANGE\"");
        assert_eq!(DenialReason::LengthOutOfRange.to_string(), "LENGTH_OUT_OF_RANGE");
    }
}
