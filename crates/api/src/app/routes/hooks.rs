use std::sync::Arc;

use axum::{extract::Extension, http::StatusCode, response::IntoResponse, Json};
use serde_json::Value;
use uuid::Uuid;

use crate::app::services::AppServices;
use crate::app::{dto, errors, ingest, processor};

/// Process the order referenced by an inbound webhook.
pub async fn order_changed(
    Extension(services): Extension<Arc<AppServices>>,
    Json(payload): Json<Value>,
) -> axum::response::Response {
    let order_id = match ingest::order_id_from_webhook(&payload) {
        Ok(id) => id,
        Err(err) => return errors::failure_to_response(err.into()),
    };

    let run_id = Uuid::now_v7();
    tracing::info!(%run_id, order = %order_id, "webhook trigger");

    let backend = services.backend().as_ref();
    match processor::process_order(order_id, backend, backend, services.engine()).await {
        Ok(outcome) => {
            (StatusCode::OK, Json(dto::outcome_to_json(run_id, &outcome))).into_response()
        }
        Err(failure) => errors::failure_to_response(failure),
    }
}

/// Readiness probe: the shop validates the webhook URL with a GET before it
/// starts delivering events.
pub async fn readiness() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ready" }))
}
