/**
 * Error Conversion
 *
 * `IntoResponse` for [`BackendError`], rendering the
 * `{"error": ..., "status": ...}` JSON body, plus conversions from the
 * token library's errors.
 */
use axum::response::{IntoResponse, Json, Response};

use crate::backend::error::types::BackendError;

impl IntoResponse for BackendError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("[Server] {}", self);
        }
        let body = serde_json::json!({
            "error": self.message(),
            "status": status.as_u16(),
        });
        (status, Json(body)).into_response()
    }
}

impl From<jsonwebtoken::errors::Error> for BackendError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        BackendError::auth(format!("Invalid token: {}", err))
    }
}
