use axum::{routing::post, Router};

pub mod hooks;
pub mod orders;
pub mod poll;
pub mod system;

/// Router for the token-guarded trigger endpoints.
pub fn router() -> Router {
    Router::new()
        .route("/hooks/order-changed", post(hooks::order_changed))
        .route("/poll", post(poll::run))
        .nest("/orders", orders::router())
}
