use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};

/// Shared-token auth for the trigger endpoints.
///
/// No token configured means the check is disabled (private deployments
/// behind a gateway); the startup log makes that loud.
#[derive(Clone)]
pub struct TriggerAuth {
    pub token: Option<Arc<str>>,
}

pub async fn trigger_auth(
    State(auth): State<TriggerAuth>,
    req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Result<Response, StatusCode> {
    if let Some(expected) = &auth.token {
        let presented = extract_bearer(req.headers())?;
        if presented != expected.as_ref() {
            return Err(StatusCode::UNAUTHORIZED);
        }
    }

    Ok(next.run(req).await)
}

fn extract_bearer(headers: &HeaderMap) -> Result<&str, StatusCode> {
    let header = headers
        .get(axum::http::header::AUTHORIZATION)
        .ok_or(StatusCode::UNAUTHORIZED)?;

    let header = header.to_str().map_err(|_| StatusCode::UNAUTHORIZED)?;

    let token = header
        .strip_prefix("Bearer ")
        .ok_or(StatusCode::UNAUTHORIZED)?
        .trim();

    if token.is_empty() {
        return Err(StatusCode::UNAUTHORIZED);
    }

    Ok(token)
}
