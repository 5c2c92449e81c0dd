//! Warehouse roles and the static primary/fallback topology.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::id::WarehouseId;

/// Role of a warehouse id observed on an order.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WarehouseRole {
    Primary,
    Fallback,
    Other,
}

/// Invalid topology configuration.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TopologyError {
    #[error("at least one fallback warehouse is required")]
    NoFallback,

    #[error("warehouse {0} is configured as both primary and fallback")]
    PrimaryAsFallback(WarehouseId),

    #[error("fallback warehouse {0} is configured twice")]
    DuplicateFallback(WarehouseId),
}

/// Static warehouse configuration: one primary, one or more fallbacks in
/// preference order. Built once at startup, never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WarehouseTopology {
    primary: WarehouseId,
    fallbacks: Vec<WarehouseId>,
}

impl WarehouseTopology {
    pub fn new(
        primary: WarehouseId,
        fallbacks: Vec<WarehouseId>,
    ) -> Result<Self, TopologyError> {
        if fallbacks.is_empty() {
            return Err(TopologyError::NoFallback);
        }
        for (i, fallback) in fallbacks.iter().enumerate() {
            if *fallback == primary {
                return Err(TopologyError::PrimaryAsFallback(*fallback));
            }
            if fallbacks[..i].contains(fallback) {
                return Err(TopologyError::DuplicateFallback(*fallback));
            }
        }
        Ok(Self { primary, fallbacks })
    }

    pub fn primary(&self) -> WarehouseId {
        self.primary
    }

    /// Fallback warehouses in configured preference order.
    pub fn fallbacks(&self) -> &[WarehouseId] {
        &self.fallbacks
    }

    pub fn role_of(&self, warehouse: WarehouseId) -> WarehouseRole {
        if warehouse == self.primary {
            WarehouseRole::Primary
        } else if self.fallbacks.contains(&warehouse) {
            WarehouseRole::Fallback
        } else {
            WarehouseRole::Other
        }
    }
}
