use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};

use stockroute_client::OrderGateway;
use stockroute_core::OrderId;

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new().route("/:id/decision", get(preview_decision))
}

/// Dry run: compute and report the decision without applying it.
pub async fn preview_decision(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let order_id: OrderId = match id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid order id");
        }
    };

    let backend = services.backend().as_ref();
    let order = match backend.fetch_order(order_id).await {
        Ok(order) => order,
        Err(err) => return errors::failure_to_response(err.into()),
    };

    let evaluation = services.engine().decide(&order).await;

    (
        StatusCode::OK,
        Json(dto::evaluation_to_json(order_id, &evaluation)),
    )
        .into_response()
}
