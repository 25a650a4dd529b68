use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use serde_json::json;
use thiserror::Error;

use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum AttendanceError {
    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Validation(String),

    /// A shift or branch lookup failed (as opposed to finding nothing).
    #[error("{what} failed: {source}")]
    Dependency {
        what: &'static str,
        #[source]
        source: StoreError,
    },

    #[error(transparent)]
    Store(StoreError),
}

impl AttendanceError {
    pub fn dependency(what: &'static str) -> impl FnOnce(StoreError) -> Self {
        move |source| AttendanceError::Dependency { what, source }
    }
}

impl From<StoreError> for AttendanceError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Conflict(msg) => AttendanceError::Conflict(msg),
            StoreError::NotFound(msg) => AttendanceError::NotFound(msg),
            other => AttendanceError::Store(other),
        }
    }
}

impl ResponseError for AttendanceError {
    fn status_code(&self) -> StatusCode {
        match self {
            AttendanceError::Conflict(_) => StatusCode::CONFLICT,
            AttendanceError::NotFound(_) => StatusCode::NOT_FOUND,
            AttendanceError::Validation(_) => StatusCode::BAD_REQUEST,
            AttendanceError::Dependency { .. } | AttendanceError::Store(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match self {
            AttendanceError::Dependency { .. } | AttendanceError::Store(_) => {
                tracing::error!(error = %self, "Attendance operation failed");
                "Internal Server Error".to_string()
            }
            other => other.to_string(),
        };

        HttpResponse::build(self.status_code()).json(json!({
            "success": false,
            "message": message
        }))
    }
}
