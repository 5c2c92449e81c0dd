//! Decisions and the structured rationale that justifies them.

use serde::Serialize;

use stockroute_core::{ProductKey, WarehouseId};

/// One stock read for a (product, warehouse) pair.
///
/// `Unknown` means the read itself failed; missing backend data is reported
/// as `Available(0)` by the lookup layer, not as `Unknown`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StockReading {
    Available(u64),
    Unknown,
}

impl StockReading {
    /// Whether this reading covers the ordered quantity.
    ///
    /// Unknown stock never covers anything: we do not keep an order at a
    /// warehouse we cannot confirm has the goods, and we do not move an
    /// order to one either.
    pub fn covers(self, ordered: u32) -> bool {
        match self {
            StockReading::Available(quantity) => quantity >= u64::from(ordered),
            StockReading::Unknown => false,
        }
    }
}

/// How a single line item fared across the warehouses consulted.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemOutcome {
    /// Primary stock covers the ordered quantity.
    SatisfiedAtPrimary,
    /// Primary cannot cover it, but this fallback can.
    NeedsFallback(WarehouseId),
    /// No configured warehouse covers it; moving the order would not help.
    ShortEverywhere,
}

/// Per-item record: ordered quantity and the reading at each warehouse
/// consulted for it, in consultation order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemAssessment {
    pub product: ProductKey,
    pub ordered: u32,
    pub checked: Vec<(WarehouseId, StockReading)>,
    pub outcome: ItemOutcome,
}

/// Structured explanation accompanying a decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Default)]
pub struct Rationale {
    pub items: Vec<ItemAssessment>,
    /// True when evaluation stopped at the first shortfall a fallback could
    /// resolve; later items were not assessed.
    pub truncated: bool,
}

/// The single output of one evaluation.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "action", content = "target")]
pub enum Decision {
    /// Leave the order's assignment unchanged.
    NoOp,
    /// Write the primary warehouse onto an order that had no recognized
    /// assignment.
    AssignDefault(WarehouseId),
    /// Move the order to a fallback warehouse.
    Reassign(WarehouseId),
}

impl Decision {
    /// The warehouse a mutation should write, if any.
    pub fn target(self) -> Option<WarehouseId> {
        match self {
            Decision::NoOp => None,
            Decision::AssignDefault(warehouse) | Decision::Reassign(warehouse) => Some(warehouse),
        }
    }
}

/// Decision plus rationale, as produced by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Evaluation {
    pub decision: Decision,
    pub rationale: Rationale,
}

impl Evaluation {
    pub(crate) fn bare(decision: Decision) -> Self {
        Self {
            decision,
            rationale: Rationale::default(),
        }
    }
}
