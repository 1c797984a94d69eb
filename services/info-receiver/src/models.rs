use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

pub const NO_JSON_RECEIVED: &str = "no JSON received";

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct SubmissionResponse {
    pub status: &'static str,
}

impl SubmissionResponse {
    pub fn ok() -> Self {
        Self { status: "ok" }
    }
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct ErrorResponse {
    pub status: &'static str,
    pub reason: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionError {
    /// Body was empty or did not parse as JSON.
    MissingOrInvalidPayload,
}

impl SubmissionError {
    pub fn status(&self) -> StatusCode {
        match self {
            SubmissionError::MissingOrInvalidPayload => StatusCode::BAD_REQUEST,
        }
    }

    pub fn reason(&self) -> &'static str {
        match self {
            SubmissionError::MissingOrInvalidPayload => NO_JSON_RECEIVED,
        }
    }

    pub fn body(&self) -> ErrorResponse {
        ErrorResponse {
            status: "error",
            reason: self.reason(),
        }
    }
}

impl IntoResponse for SubmissionError {
    fn into_response(self) -> Response {
        (self.status(), Json(self.body())).into_response()
    }
}
