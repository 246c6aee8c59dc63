//! Strongly-typed identifiers used across the client.
//!
//! The backend issues opaque string ids (document ids, not UUIDs), so these
//! wrap a non-empty `String` and validate on construction and on decode.

use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};

/// Identifier of a tenant (multi-tenant boundary).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TenantId(String);

/// Identifier of a user (actor identity).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(String);

macro_rules! impl_string_id {
    ($t:ty, $name:literal) => {
        impl $t {
            /// Create an identifier from its wire form.
            ///
            /// Surrounding whitespace is trimmed; an empty id is rejected.
            pub fn new(value: impl Into<String>) -> DomainResult<Self> {
                let value = value.into();
                let trimmed = value.trim();
                if trimmed.is_empty() {
                    return Err(DomainError::invalid_id(format!("{}: empty", $name)));
                }
                Ok(Self(trimmed.to_string()))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl core::fmt::Display for $t {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl TryFrom<String> for $t {
            type Error = DomainError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$t> for String {
            fn from(value: $t) -> Self {
                value.0
            }
        }

        impl FromStr for $t {
            type Err = DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::new(s)
            }
        }
    };
}

impl_string_id!(TenantId, "TenantId");
impl_string_id!(UserId, "UserId");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_and_rejects_empty() {
        let id = TenantId::new("  65f1c0ffee  ").unwrap();
        assert_eq!(id.as_str(), "65f1c0ffee");

        assert!(matches!(TenantId::new("   "), Err(DomainError::InvalidId(_))));
        assert!("".parse::<UserId>().is_err());
    }

    #[test]
    fn decode_validates() {
        let id: UserId = serde_json::from_str("\"u-1\"").unwrap();
        assert_eq!(id.to_string(), "u-1");

        let err = serde_json::from_str::<TenantId>("\"\"");
        assert!(err.is_err());
    }
}
