//! Strongly-typed identifiers for the shop backend's entities.
//!
//! The backend owns these ids and numbers them; we only carry them around,
//! so the newtypes wrap the backend's numeric representation.

use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::error::ProcessError;

/// Identifier of an order.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(i64);

/// Identifier of a canonical product (the unit stock is tracked by).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(i64);

/// Identifier of a product variant (must be resolved to a [`ProductId`]
/// before a stock query).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VariantId(i64);

/// Identifier of a warehouse.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WarehouseId(i64);

macro_rules! impl_numeric_id {
    ($t:ty, $name:literal) => {
        impl $t {
            pub const fn new(raw: i64) -> Self {
                Self(raw)
            }

            pub const fn as_i64(self) -> i64 {
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
            type Err = ProcessError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let raw: i64 = s
                    .trim()
                    .parse()
                    .map_err(|e| ProcessError::bad_trigger(format!("{}: {}", $name, e)))?;
                Ok(Self(raw))
            }
        }
    };
}

impl_numeric_id!(OrderId, "order id");
impl_numeric_id!(ProductId, "product id");
impl_numeric_id!(VariantId, "variant id");
impl_numeric_id!(WarehouseId, "warehouse id");
