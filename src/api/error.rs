//! HTTP representation of domain errors

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::services::FilmError;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    pub status_code: u16,
    pub error: String,
    pub message: String,
}

impl FilmError {
    pub fn status(&self) -> StatusCode {
        match self {
            FilmError::NotFound(_) => StatusCode::NOT_FOUND,
            FilmError::InvalidCriteria(_) => StatusCode::BAD_REQUEST,
            FilmError::DuplicateCode(_)
            | FilmError::TitleExists(_)
            | FilmError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            FilmError::VersionMissing => StatusCode::PRECONDITION_REQUIRED,
            FilmError::VersionInvalid(_) | FilmError::VersionOutdated(_) => {
                StatusCode::PRECONDITION_FAILED
            }
            FilmError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for FilmError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            FilmError::Database(e) => {
                tracing::error!(error = %e, "Database error in REST handler");
                "internal server error".to_string()
            }
            other => other.to_string(),
        };

        let body = ErrorBody {
            status_code: status.as_u16(),
            error: status.canonical_reason().unwrap_or("Error").to_string(),
            message,
        };
        (status, Json(body)).into_response()
    }
}
