//! HTTP application wiring (axum router + service construction).
//!
//! Layout:
//! - `services.rs`: backend client + decision engine construction
//! - `processor.rs`: the per-order pipeline (fetch → decide → apply)
//! - `ingest.rs`: trigger payload normalization
//! - `routes/`: HTTP routes + handlers (one file per surface)
//! - `dto.rs`: request DTOs and response JSON mapping
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{routing::get, Extension, Router};

use crate::config::AppConfig;
use crate::middleware;

pub mod dto;
pub mod errors;
pub mod ingest;
pub mod processor;
pub mod routes;
pub mod services;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub fn build_app(config: AppConfig) -> Router {
    let auth = middleware::TriggerAuth {
        token: config.webhook_token.clone().map(Arc::from),
    };

    let services = Arc::new(services::AppServices::build(&config));

    // Trigger endpoints require the shared token (when one is configured).
    let protected = routes::router().layer(axum::middleware::from_fn_with_state(
        auth,
        middleware::trigger_auth,
    ));

    Router::new()
        .route("/health", get(routes::system::health))
        .route("/hooks/order-changed", get(routes::hooks::readiness))
        .merge(protected)
        .layer(Extension(services))
}
