//! `tenantgate-core`: tenant identifier primitives.
//!
//! This crate contains **pure** building blocks (no IO, no logging): the
//! validated tenant key, its format rules, and the denial taxonomy.

pub mod denial;
pub mod error;
pub mod id;

pub use denial::DenialReason;
pub use error::{RegistryError, RegistryResult};
pub use id::{FormatViolation, MAX_LEN, MIN_LEN, TenantKey, check_format};
