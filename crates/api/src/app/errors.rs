use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use stockroute_core::ProcessError;

use crate::app::dto;
use crate::app::processor::ProcessFailure;

/// Status class and stable error code for a processing error.
///
/// Client errors (bad trigger, unknown order) must not be retried; backend
/// unavailability is retryable by re-delivering the trigger; a failed
/// mutation needs an operator.
pub fn status_and_code(error: &ProcessError) -> (StatusCode, &'static str) {
    match error {
        ProcessError::BadTrigger(_) => (StatusCode::BAD_REQUEST, "bad_trigger"),
        ProcessError::NotFound => (StatusCode::NOT_FOUND, "not_found"),
        ProcessError::Transient(_) => (StatusCode::BAD_GATEWAY, "backend_unavailable"),
        ProcessError::Mutation { .. } => (StatusCode::INTERNAL_SERVER_ERROR, "mutation_failed"),
    }
}

pub fn failure_to_response(failure: ProcessFailure) -> axum::response::Response {
    let (status, code) = status_and_code(&failure.error);

    let mut body = json!({
        "error": code,
        "message": failure.error.to_string(),
    });

    // A mutation failure still carries the computed decision; surface it so
    // the rationale is not lost.
    if let Some(evaluation) = &failure.evaluation {
        body["attempted"] = dto::decision_to_json(evaluation.decision);
        body["rationale"] = dto::rationale_to_json(&evaluation.rationale);
    }

    (status, axum::Json(body)).into_response()
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
