//! # Middleware Rejections
//!
//! Structured error responses for the conditions a validation layer can hit
//! that are *not* validation failures. Validation failures answer with the
//! raw field→message report as the 400 body; everything here wraps the
//! `{"error": {"code", "message"}}` envelope instead, so the two are
//! trivially distinguishable on the wire.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Structured JSON error response body.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

/// Inner error detail.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetail {
    /// Machine-readable error code (e.g., "MISSING_BODY_PARSER").
    pub code: String,
    /// Human-readable error message.
    pub message: String,
}

/// Rejections produced by a body-bound validation layer at request time.
///
/// `MissingBodyParser` is deliberately a 500-class response: a body-bound
/// layer receiving a request with no JSON body means the route wiring or
/// client contract is broken, and converting that into a 400 would disguise
/// a configuration bug as bad user input.
#[derive(Error, Debug)]
pub enum BodyRejection {
    /// The request carries no JSON body to validate — no
    /// `application/json` content type was sent. Typically the route is
    /// mounted on a non-POST method or the client skipped the header.
    #[error(
        "request has no JSON body to validate; body-bound validation requires an `application/json` request"
    )]
    MissingBodyParser,

    /// A body was present but is not syntactically valid JSON.
    #[error("request body is not valid JSON: {0}")]
    InvalidJson(String),

    /// The body could not be read from the transport.
    #[error("failed to read request body: {0}")]
    ReadFailed(String),
}

impl BodyRejection {
    /// HTTP status and machine-readable code for this rejection.
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            Self::MissingBodyParser => {
                (StatusCode::INTERNAL_SERVER_ERROR, "MISSING_BODY_PARSER")
            }
            Self::InvalidJson(_) => (StatusCode::BAD_REQUEST, "INVALID_JSON"),
            Self::ReadFailed(_) => (StatusCode::INTERNAL_SERVER_ERROR, "BODY_READ_FAILED"),
        }
    }
}

impl IntoResponse for BodyRejection {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        // 500-class rejections are configuration faults; make sure the
        // operator sees them.
        if status.is_server_error() {
            tracing::error!(error = %self, "body-bound validation cannot run");
        }

        let body = ErrorBody {
            error: ErrorDetail {
                code: code.to_string(),
                message: self.to_string(),
            },
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    /// Helper to extract status and body from a response.
    async fn response_parts(rejection: BodyRejection) -> (StatusCode, ErrorBody) {
        let response = rejection.into_response();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: ErrorBody = serde_json::from_slice(&bytes).unwrap();
        (status, body)
    }

    #[tokio::test]
    async fn missing_body_parser_is_a_500() {
        let (status, body) = response_parts(BodyRejection::MissingBodyParser).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.error.code, "MISSING_BODY_PARSER");
        assert!(body.error.message.contains("no JSON body"));
    }

    #[tokio::test]
    async fn invalid_json_is_a_400() {
        let (status, body) =
            response_parts(BodyRejection::InvalidJson("expected value at line 1".into())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.error.code, "INVALID_JSON");
        assert!(body.error.message.contains("expected value"));
    }

    #[tokio::test]
    async fn read_failure_is_a_500() {
        let (status, body) =
            response_parts(BodyRejection::ReadFailed("connection reset".into())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.error.code, "BODY_READ_FAILED");
    }
}
