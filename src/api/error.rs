//! HTTP mapping of registry errors.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::error::SiretError;

/// JSON body of every non-2xx response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Machine-readable code, e.g. `NOT_NUMERIC` or `NOT_FOUND`.
    pub error: String,
    pub message: String,
}

impl SiretError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            SiretError::Validation(_) => StatusCode::BAD_REQUEST,
            SiretError::NotFound { .. } => StatusCode::NOT_FOUND,
            SiretError::Conflict { .. } => StatusCode::CONFLICT,
            SiretError::StorageUnavailable(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for SiretError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let (code, message) = match &self {
            SiretError::Validation(err) => (err.kind().as_str(), err.to_string()),
            SiretError::NotFound { .. } => ("NOT_FOUND", "SIRET not found".to_string()),
            SiretError::Conflict { .. } => ("CONFLICT", self.to_string()),
            SiretError::StorageUnavailable(err) => {
                // Storage details stay in the server log.
                error!("Storage fault: {}", err);
                ("STORAGE_UNAVAILABLE", "Storage unavailable".to_string())
            }
        };

        (
            status,
            Json(ErrorResponse {
                error: code.to_string(),
                message,
            }),
        )
            .into_response()
    }
}
