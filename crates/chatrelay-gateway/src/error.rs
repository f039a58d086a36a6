//! HTTP mapping for `RelayError` (non-WS handlers).

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use chatrelay_core::error::RelayError;

/// `RelayError` rendered as `{ "error": ... }` with a matching status code.
#[derive(Debug)]
pub struct HttpError(pub RelayError);

impl From<RelayError> for HttpError {
    fn from(e: RelayError) -> Self {
        HttpError(e)
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let (status, msg) = match &self.0 {
            RelayError::NoFile => (StatusCode::BAD_REQUEST, "No file uploaded."),
            RelayError::BadRequest(_) => (StatusCode::BAD_REQUEST, "Bad request."),
            RelayError::PayloadTooLarge => (StatusCode::PAYLOAD_TOO_LARGE, "File too large."),
            RelayError::UnsupportedVersion | RelayError::Internal(_) => {
                tracing::error!(error = %self.0, "upload failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "Upload failed.")
            }
        };
        (status, Json(json!({ "error": msg }))).into_response()
    }
}
