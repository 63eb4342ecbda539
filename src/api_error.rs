use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde::Serialize;
use thiserror::Error;

use crate::governance::GovernanceError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Internal server error")]
    InternalServerError,

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Unprocessable: {0}")]
    Unprocessable(String),
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    code: u16,
    details: Option<String>,
}

impl From<GovernanceError> for ApiError {
    fn from(err: GovernanceError) -> Self {
        let message = err.to_string();
        match err {
            GovernanceError::Unauthorized { .. } => ApiError::Forbidden(message),
            GovernanceError::NotFound(_) => ApiError::NotFound(message),
            GovernanceError::InvalidPayload(_) => ApiError::ValidationError(message),
            GovernanceError::AlreadySigned { .. }
            | GovernanceError::InsufficientSignatures { .. }
            | GovernanceError::TimelockNotElapsed { .. } => ApiError::Conflict(message),
            GovernanceError::ActionDispatchFailed(_) => ApiError::Unprocessable(message),
            GovernanceError::ExecuteTimeOutOfRange { .. } => ApiError::InternalServerError,
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::InternalServerError => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::ValidationError(_) => StatusCode::BAD_REQUEST,
            ApiError::Unprocessable(_) => StatusCode::UNPROCESSABLE_ENTITY,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let message = match self {
            ApiError::InternalServerError => self.to_string(),
            ApiError::BadRequest(_) => "Bad request".to_string(),
            ApiError::Forbidden(_) => "Forbidden".to_string(),
            ApiError::NotFound(_) => "Not found".to_string(),
            ApiError::Conflict(_) => "Conflict".to_string(),
            ApiError::ValidationError(_) => "Validation error".to_string(),
            ApiError::Unprocessable(_) => "Action dispatch failed".to_string(),
        };

        let error_response = ErrorResponse {
            error: message,
            code: status.as_u16(),
            details: Some(self.to_string()),
        };

        HttpResponse::build(status).json(error_response)
    }
}
