//! Request DTOs and response JSON mapping.

use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use stockroute_core::OrderId;
use stockroute_routing::{Decision, Evaluation, ItemOutcome, Rationale, StockReading};

use crate::app::errors;
use crate::app::processor::{ProcessFailure, ProcessOutcome};

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct PollRequest {
    /// Override of the configured poll window.
    pub window_minutes: Option<i64>,
}

// -------------------------
// JSON mapping helpers
// -------------------------

pub fn outcome_to_json(run_id: Uuid, outcome: &ProcessOutcome) -> serde_json::Value {
    json!({
        "run_id": run_id.to_string(),
        "order_id": outcome.order_id,
        "decision": decision_to_json(outcome.evaluation.decision),
        "rationale": rationale_to_json(&outcome.evaluation.rationale),
        "mutation": outcome.mutation,
    })
}

pub fn evaluation_to_json(order_id: OrderId, evaluation: &Evaluation) -> serde_json::Value {
    json!({
        "order_id": order_id,
        "decision": decision_to_json(evaluation.decision),
        "rationale": rationale_to_json(&evaluation.rationale),
    })
}

pub fn failed_order_to_json(order_id: OrderId, failure: &ProcessFailure) -> serde_json::Value {
    let (_, code) = errors::status_and_code(&failure.error);
    let mut entry = json!({
        "order_id": order_id,
        "error": code,
        "message": failure.error.to_string(),
    });
    if let Some(evaluation) = &failure.evaluation {
        entry["attempted"] = decision_to_json(evaluation.decision);
        entry["rationale"] = rationale_to_json(&evaluation.rationale);
    }
    entry
}

pub fn decision_to_json(decision: Decision) -> serde_json::Value {
    match decision {
        Decision::NoOp => json!({ "action": "no_op" }),
        Decision::AssignDefault(warehouse) => {
            json!({ "action": "assign_default", "target": warehouse })
        }
        Decision::Reassign(warehouse) => json!({ "action": "reassign", "target": warehouse }),
    }
}

pub fn rationale_to_json(rationale: &Rationale) -> serde_json::Value {
    let items = rationale
        .items
        .iter()
        .map(|item| {
            json!({
                "product": item.product.to_string(),
                "ordered": item.ordered,
                "stock": item
                    .checked
                    .iter()
                    .map(|(warehouse, reading)| json!({
                        "warehouse": warehouse,
                        "available": reading_to_json(*reading),
                    }))
                    .collect::<Vec<_>>(),
                "outcome": outcome_label(item.outcome),
            })
        })
        .collect::<Vec<_>>();

    json!({ "items": items, "truncated": rationale.truncated })
}

fn reading_to_json(reading: StockReading) -> serde_json::Value {
    match reading {
        StockReading::Available(quantity) => json!(quantity),
        // A failed read is null, distinct from a known zero.
        StockReading::Unknown => serde_json::Value::Null,
    }
}

fn outcome_label(outcome: ItemOutcome) -> &'static str {
    match outcome {
        ItemOutcome::SatisfiedAtPrimary => "satisfied_at_primary",
        ItemOutcome::NeedsFallback(_) => "needs_fallback",
        ItemOutcome::ShortEverywhere => "short_everywhere",
    }
}
