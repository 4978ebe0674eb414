//! Domain error to HTTP response mapping

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use salesdesk_domain::SalesdeskError;
use serde_json::json;

/// Wrapper turning domain errors into HTTP responses.
#[derive(Debug)]
pub struct ApiError(pub SalesdeskError);

impl From<SalesdeskError> for ApiError {
    fn from(value: SalesdeskError) -> Self {
        Self(value)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            SalesdeskError::NotFound(_) => StatusCode::NOT_FOUND,
            SalesdeskError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            SalesdeskError::Database(_)
            | SalesdeskError::Config(_)
            | SalesdeskError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            tracing::error!(error = %self.0, "request failed");
        }

        (status, Json(json!({ "error": self.0.to_string() }))).into_response()
    }
}
