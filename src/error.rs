//! Error handling for the application

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::estimate::responses::EstimateErrorResponse;
use crate::estimate::{EstimateError, ReferenceDataError, ValidationError};

/// Application error type
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Validation failed: {}", join(.0))]
    Validation(Vec<ValidationError>),

    #[error("Reference data error: {0}")]
    ReferenceData(#[from] ReferenceDataError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<ValidationError> for AppError {
    fn from(e: ValidationError) -> Self {
        AppError::Validation(vec![e])
    }
}

impl From<Vec<ValidationError>> for AppError {
    fn from(errors: Vec<ValidationError>) -> Self {
        AppError::Validation(errors)
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        ValidationError::MalformedBody(rejection.body_text()).into()
    }
}

impl From<EstimateError> for AppError {
    fn from(e: EstimateError) -> Self {
        match e {
            EstimateError::Validation(v) => v.into(),
            EstimateError::ReferenceData(r) => r.into(),
        }
    }
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            AppError::Validation(errors) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                EstimateErrorResponse::validation(errors),
            ),
            AppError::ReferenceData(e) => {
                tracing::error!("Reference data error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    generic("internal_error", "Internal error"),
                )
            }
            AppError::Database(e) => {
                tracing::error!("Database error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    generic("internal_error", "Internal error"),
                )
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    generic("internal_error", "Internal error"),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

fn generic(error_type: &str, message: &str) -> EstimateErrorResponse {
    EstimateErrorResponse {
        error_type: error_type.to_string(),
        message: message.to_string(),
        details: vec![],
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
