//! The per-order pipeline: fetch, decide, apply.

use serde::Serialize;

use stockroute_client::{MutationOutcome, OrderGateway, WarehouseWriter};
use stockroute_core::{OrderId, ProcessError};
use stockroute_routing::{DecisionEngine, Evaluation, StockSource};

/// What happened to the order's assignment.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MutationStatus {
    /// The decision required no write.
    NotNeeded,
    /// The new assignment was written and confirmed.
    Applied,
    /// The backend already carried the target.
    AlreadyAssigned,
}

/// Result of processing one order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProcessOutcome {
    pub order_id: OrderId,
    pub evaluation: Evaluation,
    pub mutation: MutationStatus,
}

/// A failed run. The evaluation survives when the decision was already
/// computed (mutation failures), so the caller can hand the rationale to an
/// operator instead of losing it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessFailure {
    pub error: ProcessError,
    pub evaluation: Option<Evaluation>,
}

impl From<ProcessError> for ProcessFailure {
    fn from(error: ProcessError) -> Self {
        Self {
            error,
            evaluation: None,
        }
    }
}

/// Run one order through fetch → decide → apply.
///
/// Mutation is the last step; everything before it is read-only, so a
/// cancelled or failed run up to that point leaves the backend untouched.
pub async fn process_order<G, W, S>(
    order_id: OrderId,
    gateway: &G,
    writer: &W,
    engine: &DecisionEngine<S>,
) -> Result<ProcessOutcome, ProcessFailure>
where
    G: OrderGateway,
    W: WarehouseWriter,
    S: StockSource,
{
    let order = gateway.fetch_order(order_id).await?;
    let evaluation = engine.decide(&order).await;

    let mutation = match evaluation.decision.target() {
        None => MutationStatus::NotNeeded,
        Some(target) => match writer.assign_warehouse(order_id, target).await {
            Ok(MutationOutcome::Applied) => MutationStatus::Applied,
            Ok(MutationOutcome::AlreadyAssigned) => MutationStatus::AlreadyAssigned,
            Err(error) => {
                return Err(ProcessFailure {
                    error,
                    evaluation: Some(evaluation),
                });
            }
        },
    };

    tracing::info!(
        order = %order_id,
        decision = ?evaluation.decision,
        ?mutation,
        "order processed"
    );

    Ok(ProcessOutcome {
        order_id,
        evaluation,
        mutation,
    })
}
