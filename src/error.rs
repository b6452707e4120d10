use axum::{
    response::{IntoResponse, Response},
    Json,
};
use http::StatusCode;
use serde_json::json;
use tracing::error;

use crate::core::submission::ValidationError;

/// Custom Error and Result types to unify errors from all sources.
pub type ScoresResult<T> = Result<T, ScoresError>;

#[derive(Debug, thiserror::Error)]
pub enum ScoresError {
    #[error("Validation Error: {0}")]
    Validation(#[from] ValidationError),
    // Request body rejected before it reached validation (bad JSON, wrong content type, ...).
    #[error("Payload Error: {detail}")]
    Payload { status: StatusCode, detail: String },
    #[error("Config Error: {0}")]
    Config(String),
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ScoresError {
    fn from(error: figment::Error) -> Self {
        ScoresError::Config(error.to_string())
    }
}

impl From<axum::extract::rejection::JsonRejection> for ScoresError {
    fn from(rejection: axum::extract::rejection::JsonRejection) -> Self {
        ScoresError::Payload {
            status: rejection.status(),
            detail: rejection.body_text(),
        }
    }
}

impl ScoresError {
    pub fn status(&self) -> StatusCode {
        match self {
            ScoresError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ScoresError::Payload { status, .. } => *status,
            ScoresError::Config(_) | ScoresError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ScoresError {
    fn into_response(self) -> Response {
        let status = self.status();
        let detail = match &self {
            ScoresError::Validation(reason) => reason.to_string(),
            ScoresError::Payload { detail, .. } => detail.clone(),
            // Internal failures are logged, never echoed to the client.
            other => {
                error!("{other}");
                "internal server error".to_string()
            }
        };
        (status, Json(json!({ "detail": detail }))).into_response()
    }
}
