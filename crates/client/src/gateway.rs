//! Collaborator seams for the order backend.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use stockroute_core::{Order, OrderId, ProcessResult, WarehouseId};

/// Outcome of an idempotent warehouse write.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum MutationOutcome {
    /// The assignment was written and confirmed by a read-back.
    Applied,
    /// The order already carried the target; nothing was written.
    AlreadyAssigned,
}

/// Read access to orders.
#[async_trait]
pub trait OrderGateway: Send + Sync {
    /// Fetch one order with line items fully expanded, so no further round
    /// trips are needed during evaluation.
    async fn fetch_order(&self, id: OrderId) -> ProcessResult<Order>;

    /// Ids of orders created or modified since `since`, for poll triggers.
    async fn recent_orders(&self, since: DateTime<Utc>) -> ProcessResult<Vec<OrderId>>;
}

/// Write access to an order's warehouse assignment.
#[async_trait]
pub trait WarehouseWriter: Send + Sync {
    /// Assign `target` to the order. Calling twice with the same target
    /// yields the same end state and the same result.
    async fn assign_warehouse(
        &self,
        id: OrderId,
        target: WarehouseId,
    ) -> ProcessResult<MutationOutcome>;
}
