use std::sync::Arc;

use axum::{extract::Extension, http::StatusCode, response::IntoResponse, Json};
use chrono::Utc;
use uuid::Uuid;

use stockroute_client::OrderGateway;

use crate::app::services::AppServices;
use crate::app::{dto, errors, processor};

/// Evaluate every order changed within the poll window.
///
/// Orders are processed independently: a failure on one is reported in its
/// result entry and never aborts the batch.
pub async fn run(
    Extension(services): Extension<Arc<AppServices>>,
    body: Option<Json<dto::PollRequest>>,
) -> axum::response::Response {
    let window = body
        .as_ref()
        .and_then(|Json(request)| request.window_minutes)
        .map(chrono::Duration::minutes)
        .unwrap_or_else(|| services.poll_window());
    let since = Utc::now() - window;

    let backend = services.backend().as_ref();
    let order_ids = match backend.recent_orders(since).await {
        Ok(ids) => ids,
        Err(err) => return errors::failure_to_response(err.into()),
    };

    let run_id = Uuid::now_v7();
    tracing::info!(%run_id, %since, orders = order_ids.len(), "poll trigger");

    let mut results = Vec::with_capacity(order_ids.len());
    for order_id in order_ids {
        match processor::process_order(order_id, backend, backend, services.engine()).await {
            Ok(outcome) => results.push(dto::outcome_to_json(run_id, &outcome)),
            Err(failure) => {
                tracing::warn!(order = %order_id, error = %failure.error, "poll entry failed");
                results.push(dto::failed_order_to_json(order_id, &failure));
            }
        }
    }

    (
        StatusCode::OK,
        Json(serde_json::json!({
            "run_id": run_id.to_string(),
            "since": since.to_rfc3339(),
            "processed": results.len(),
            "results": results,
        })),
    )
        .into_response()
}
