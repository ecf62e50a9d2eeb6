use crate::domain::error::DomainError;
use axum::{
    Json,
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;
use validator::ValidationErrors;

#[derive(Debug, Error)]
pub(crate) enum AppError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("{}", describe_fields(.0))]
    Validation(#[from] ValidationErrors),

    #[error("{0}")]
    BadRequest(String),

    #[error("Authentication required")]
    Unauthenticated,

    #[error("Invalid token")]
    InvalidToken,
}

pub(crate) type AppResult<T> = Result<T, AppError>;

impl AppError {
    /// Create and update report storage failures as a rejected write (400)
    /// rather than a server fault.
    pub(crate) fn from_write(err: DomainError) -> Self {
        match err {
            DomainError::Storage(msg) => {
                error!(error = %msg, "post write failed");
                AppError::BadRequest("failed to save post".to_string())
            }
            other => AppError::Domain(other),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

/// One line per failing field, naming the broken rule but never the
/// rejected value.
fn describe_fields(errors: &ValidationErrors) -> String {
    let mut lines: Vec<String> = errors
        .field_errors()
        .into_iter()
        .map(|(field, errs)| {
            let reason = errs.first().map_or_else(
                || "is invalid".to_string(),
                |err| match &err.message {
                    Some(message) => message.to_string(),
                    None => format!("failed '{}' check", err.code),
                },
            );
            format!("validation failed for '{field}': {reason}")
        })
        .collect();
    lines.sort();
    lines.join("; ")
}

#[derive(Debug, Serialize)]
pub(crate) struct ErrorBody {
    pub(crate) error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, msg) = match self {
            AppError::Domain(err) => {
                let status = match &err {
                    DomainError::Validation { .. } => StatusCode::BAD_REQUEST,
                    DomainError::AlreadyExists(_) => StatusCode::CONFLICT,
                    DomainError::InvalidCredentials => StatusCode::UNAUTHORIZED,
                    DomainError::NotFound(_) => StatusCode::NOT_FOUND,
                    DomainError::Forbidden { .. } => StatusCode::FORBIDDEN,
                    DomainError::Storage(msg) => {
                        error!(error = %msg, "storage failure");
                        return (
                            StatusCode::INTERNAL_SERVER_ERROR,
                            Json(ErrorBody {
                                error: "internal error".to_string(),
                            }),
                        )
                            .into_response();
                    }
                };
                (status, err.to_string())
            }
            err @ AppError::Validation(_) => (StatusCode::BAD_REQUEST, err.to_string()),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            err @ (AppError::Unauthenticated | AppError::InvalidToken) => {
                (StatusCode::UNAUTHORIZED, err.to_string())
            }
        };

        (status, Json(ErrorBody { error: msg })).into_response()
    }
}
