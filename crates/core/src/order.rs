//! Read-only order projection as fetched from the shop backend.

use serde::{Deserialize, Serialize};

use crate::id::{OrderId, ProductId, VariantId, WarehouseId};

/// Line-item category as reported by the backend.
///
/// Only `physical` items participate in stock checks; services and bundles
/// are always considered satisfied.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemCategory {
    Physical,
    Service,
    Bundle,
}

/// Product reference carried by a line item.
///
/// The backend indexes stock by canonical product id, but order lines may
/// reference a variant instead; variants are resolved at lookup time.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductKey {
    Product(ProductId),
    Variant(VariantId),
}

impl core::fmt::Display for ProductKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ProductKey::Product(id) => write!(f, "product:{id}"),
            ProductKey::Variant(id) => write!(f, "variant:{id}"),
        }
    }
}

/// One ordered product/quantity entry on an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    /// `None` when the backend row carried no resolvable reference; such
    /// items are skipped and never block a decision.
    pub product: Option<ProductKey>,
    pub quantity: u32,
    pub category: ItemCategory,
}

impl LineItem {
    /// The lookup key if this item participates in stock checks.
    pub fn stock_key(&self) -> Option<ProductKey> {
        match (self.category, self.product) {
            (ItemCategory::Physical, Some(key)) if self.quantity > 0 => Some(key),
            _ => None,
        }
    }
}

/// Read-only projection of an order, line items fully expanded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    /// `None` means no assignment yet: decision-equivalent to primary, but
    /// distinct for mutation (there is something to write).
    pub warehouse: Option<WarehouseId>,
    pub lines: Vec<LineItem>,
}

impl Order {
    /// Line items that participate in stock checks, in arrival order.
    ///
    /// Iteration order is deterministic so two evaluations of the same order
    /// produce the same rationale.
    pub fn stock_checked(&self) -> impl Iterator<Item = (ProductKey, u32)> + '_ {
        self.lines
            .iter()
            .filter_map(|line| line.stock_key().map(|key| (key, line.quantity)))
    }
}
