use axum::{Json, http::StatusCode};
use serde::Serialize;

use crate::errors::ScanError;

#[derive(Debug, Serialize, Clone)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            code: code.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

pub type ApiError = (StatusCode, Json<ErrorResponse>);

pub fn scan_error(e: &ScanError) -> ApiError {
    let status = match e {
        ScanError::InputEmpty | ScanError::InputMalformed(_) => StatusCode::BAD_REQUEST,
        ScanError::AlreadyRunning => StatusCode::CONFLICT,
        ScanError::ScanAborted(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(ErrorResponse::new(e.to_string(), e.code())))
}

pub fn validation_error(errors: validator::ValidationErrors) -> ApiError {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse::new("Invalid request body", "VALIDATION_ERROR").with_details(errors.to_string())),
    )
}
