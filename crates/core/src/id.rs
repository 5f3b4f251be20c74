//! Strongly-typed identifiers used across the domain.
//!
//! Catalog identities are integers assigned by the remote API; the client
//! never mints them, so there is no `new()` constructor.

use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Identifier of a catalog product (unique within a cart).
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(i64);

/// Identifier of a catalog category.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryId(i64);

macro_rules! impl_int_newtype {
    ($t:ty, $name:literal) => {
        impl $t {
            pub const fn from_raw(raw: i64) -> Self {
                Self(raw)
            }

            pub const fn get(&self) -> i64 {
                self.0
            }
        }

        impl core::fmt::Display for $t {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                core::fmt::Display::fmt(&self.0, f)
            }
        }

        impl From<i64> for $t {
            fn from(value: i64) -> Self {
                Self(value)
            }
        }

        impl From<$t> for i64 {
            fn from(value: $t) -> Self {
                value.0
            }
        }

        impl FromStr for $t {
            type Err = DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let raw = i64::from_str(s.trim())
                    .map_err(|e| DomainError::invalid_id(format!("{}: {}", $name, e)))?;
                Ok(Self(raw))
            }
        }
    };
}

impl_int_newtype!(ProductId, "ProductId");
impl_int_newtype!(CategoryId, "CategoryId");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_product_id_from_route_segment() {
        let id: ProductId = " 42 ".parse().unwrap();
        assert_eq!(id, ProductId::from_raw(42));
        assert_eq!(id.to_string(), "42");
    }

    #[test]
    fn rejects_non_numeric_identifier() {
        let err = "abc".parse::<CategoryId>().unwrap_err();
        match err {
            DomainError::InvalidId(msg) if msg.starts_with("CategoryId") => {}
            other => panic!("expected InvalidId, got {other:?}"),
        }
    }

    #[test]
    fn serializes_as_bare_integer() {
        let json = serde_json::to_string(&ProductId::from_raw(7)).unwrap();
        assert_eq!(json, "7");
        let back: ProductId = serde_json::from_str("7").unwrap();
        assert_eq!(back.get(), 7);
    }
}
