use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use ubee_core::error::AppError;

use crate::dto::ErrorResponse;

/// Wrapper so we can implement `IntoResponse` for `AppError`.
///
/// A failed modem scrape is not an `ApiError`: it still renders metrics.
/// Only failures to produce the exposition itself end up here.
pub struct ApiError(pub AppError);

impl From<prometheus::Error> for ApiError {
    fn from(err: prometheus::Error) -> Self {
        Self(AppError::Generic(format!("Metric exposition failed: {err}")))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        tracing::error!(error = %self.0, "Request failed");

        let body = ErrorResponse {
            error: "exposition_error".to_string(),
            message: self.0.to_string(),
        };

        (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(body)).into_response()
    }
}
