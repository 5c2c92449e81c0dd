//! The warehouse decision engine.
//!
//! Given an order and a stock source, produce exactly one decision: leave
//! the assignment alone, default it to the primary warehouse, or move the
//! order to a fallback that actually improves fulfillment. Stock is read at
//! most once per (product, warehouse) pair per evaluation; the engine never
//! fails on business data; what it cannot read it treats conservatively.

use std::collections::HashMap;

use async_trait::async_trait;
use futures::stream::{self, StreamExt};

use stockroute_core::{Order, ProductKey, WarehouseId, WarehouseRole, WarehouseTopology};

use crate::decision::{
    Decision, Evaluation, ItemAssessment, ItemOutcome, Rationale, StockReading,
};
use crate::policy::RoutingPolicy;

/// Read access to current stock levels.
///
/// Implementations must map "no data" to `Available(0)` and reserve
/// `Unknown` for reads that themselves failed.
#[async_trait]
pub trait StockSource: Send + Sync {
    async fn available(&self, product: ProductKey, warehouse: WarehouseId) -> StockReading;
}

#[async_trait]
impl<T: StockSource + ?Sized> StockSource for std::sync::Arc<T> {
    async fn available(&self, product: ProductKey, warehouse: WarehouseId) -> StockReading {
        (**self).available(product, warehouse).await
    }
}

pub struct DecisionEngine<S> {
    stock: S,
    topology: WarehouseTopology,
    policy: RoutingPolicy,
}

impl<S: StockSource> DecisionEngine<S> {
    pub fn new(stock: S, topology: WarehouseTopology, policy: RoutingPolicy) -> Self {
        Self {
            stock,
            topology,
            policy,
        }
    }

    pub fn topology(&self) -> &WarehouseTopology {
        &self.topology
    }

    /// Evaluate one order against current stock.
    pub async fn decide(&self, order: &Order) -> Evaluation {
        let role = order.warehouse.map(|w| self.topology.role_of(w));

        // A fallback assignment is terminal: never downgraded back.
        if role == Some(WarehouseRole::Fallback) {
            return Evaluation::bare(Decision::NoOp);
        }
        if role == Some(WarehouseRole::Other) && !self.policy.normalize_unrecognized {
            return Evaluation::bare(Decision::NoOp);
        }

        // Unassigned and unrecognized both stage a default to primary;
        // stock evaluation below can still escalate to a fallback.
        let pending_default = matches!(role, None | Some(WarehouseRole::Other));

        let items: Vec<(ProductKey, u32)> = order.stock_checked().collect();
        if items.is_empty() {
            let decision = if pending_default {
                Decision::AssignDefault(self.topology.primary())
            } else {
                Decision::NoOp
            };
            return Evaluation::bare(decision);
        }

        let mut snapshot = Snapshot::new();
        self.prefetch_primary(&items, &mut snapshot).await;

        let primary = self.topology.primary();
        let mut assessed = Vec::with_capacity(items.len());
        let mut truncated = false;

        for (product, ordered) in items {
            let at_primary = snapshot
                .get(&(product, primary))
                .copied()
                .unwrap_or(StockReading::Unknown);
            let mut checked = vec![(primary, at_primary)];

            let outcome = if at_primary.covers(ordered) {
                ItemOutcome::SatisfiedAtPrimary
            } else {
                self.consult_fallbacks(product, ordered, &mut checked, &mut snapshot)
                    .await
            };

            let resolved_by_fallback = matches!(outcome, ItemOutcome::NeedsFallback(_));
            assessed.push(ItemAssessment {
                product,
                ordered,
                checked,
                outcome,
            });

            if resolved_by_fallback && self.policy.early_exit {
                truncated = true;
                break;
            }
        }

        let decision = finalize(pending_default, &self.topology, &assessed);
        tracing::debug!(order = %order.id, ?decision, items = assessed.len(), "evaluated order");

        Evaluation {
            decision,
            rationale: Rationale {
                items: assessed,
                truncated,
            },
        }
    }

    /// Read primary stock for every distinct product up front, bounded.
    async fn prefetch_primary(&self, items: &[(ProductKey, u32)], snapshot: &mut Snapshot) {
        let primary = self.topology.primary();

        let mut distinct: Vec<ProductKey> = Vec::new();
        for (product, _) in items {
            if !distinct.contains(product) {
                distinct.push(*product);
            }
        }

        let stock = &self.stock;
        let readings = stream::iter(distinct)
            .map(|product| async move { (product, stock.available(product, primary).await) })
            .buffer_unordered(self.policy.lookup_concurrency.max(1))
            .collect::<Vec<_>>()
            .await;

        for (product, reading) in readings {
            snapshot.insert((product, primary), reading);
        }
    }

    /// Walk fallbacks in preference order until one covers the item.
    async fn consult_fallbacks(
        &self,
        product: ProductKey,
        ordered: u32,
        checked: &mut Vec<(WarehouseId, StockReading)>,
        snapshot: &mut Snapshot,
    ) -> ItemOutcome {
        for &fallback in self.topology.fallbacks() {
            let reading = match snapshot.get(&(product, fallback)) {
                Some(reading) => *reading,
                None => {
                    let reading = self.stock.available(product, fallback).await;
                    snapshot.insert((product, fallback), reading);
                    reading
                }
            };
            checked.push((fallback, reading));
            if reading.covers(ordered) {
                return ItemOutcome::NeedsFallback(fallback);
            }
        }
        ItemOutcome::ShortEverywhere
    }
}

type Snapshot = HashMap<(ProductKey, WarehouseId), StockReading>;

/// Collapse per-item outcomes into the final decision.
///
/// Reassignment requires at least one item a fallback strictly improves;
/// items short everywhere neither trigger nor block a move. With several
/// fallbacks, configuration order wins.
fn finalize(
    pending_default: bool,
    topology: &WarehouseTopology,
    items: &[ItemAssessment],
) -> Decision {
    for &fallback in topology.fallbacks() {
        if items
            .iter()
            .any(|item| item.outcome == ItemOutcome::NeedsFallback(fallback))
        {
            return Decision::Reassign(fallback);
        }
    }

    if pending_default {
        Decision::AssignDefault(topology.primary())
    } else {
        Decision::NoOp
    }
}
