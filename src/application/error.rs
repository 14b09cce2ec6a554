use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::config::CONFIG;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    /// A dependency operation the client explicitly asked for failed.
    /// The dependency's own error text is returned to the caller.
    #[error("{message}: {detail}")]
    Failed { message: String, detail: String },

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl AppError {
    /// Wrap a dependency failure with a client-facing message
    pub fn failed(message: impl Into<String>, detail: impl std::fmt::Display) -> Self {
        AppError::Failed {
            message: message.into(),
            detail: detail.to_string(),
        }
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    success: bool,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// Body for unexpected faults: full detail only outside production
fn internal_body(detail: String, expose: bool) -> ErrorResponse {
    ErrorResponse {
        success: false,
        message: if expose {
            detail
        } else {
            "Something went wrong".to_string()
        },
        error: Some("Internal Server Error".to_string()),
    }
}

impl AppError {
    fn to_parts(&self, expose_details: bool) -> (StatusCode, ErrorResponse) {
        match self {
            AppError::NotFound(msg) => (
                StatusCode::NOT_FOUND,
                ErrorResponse {
                    success: false,
                    message: msg.clone(),
                    error: None,
                },
            ),
            AppError::BadRequest(msg) => (
                StatusCode::BAD_REQUEST,
                ErrorResponse {
                    success: false,
                    message: msg.clone(),
                    error: None,
                },
            ),
            AppError::Failed { message, detail } => {
                tracing::warn!("{}: {}", message, detail);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse {
                        success: false,
                        message: message.clone(),
                        error: Some(detail.clone()),
                    },
                )
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    internal_body(msg.clone(), expose_details),
                )
            }
            AppError::Database(e) => {
                tracing::error!("Database error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    internal_body(format!("Database error: {}", e), expose_details),
                )
            }
            AppError::Json(e) => {
                tracing::error!("JSON error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    internal_body(format!("JSON error: {}", e), expose_details),
                )
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = self.to_parts(CONFIG.server.is_development());
        (status, Json(body)).into_response()
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
