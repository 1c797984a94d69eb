use axum::{
    body::Bytes,
    extract::State,
    response::{IntoResponse, Response},
    Json,
};

use crate::logic::handle_submission;
use crate::models::SubmissionResponse;
use crate::state::AppState;

pub async fn submit(State(state): State<AppState>, body: Bytes) -> Response {
    match handle_submission(state.sink.as_ref(), &body) {
        Ok(_) => {
            tracing::info!(payload_bytes = body.len(), "submission accepted");
            Json(SubmissionResponse::ok()).into_response()
        }
        Err(err) => {
            tracing::warn!(
                payload_bytes = body.len(),
                reason = err.reason(),
                "submission rejected"
            );
            err.into_response()
        }
    }
}
