// Input helpers for the scan form: typed-URL validation and spoken-input
// normalization. Both feed the same validator the scan itself uses.

use axum::Json;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::error::{ApiError, validation_error};
use crate::input;
use crate::scan::parse_target;

#[derive(Debug, Deserialize, Validate)]
pub struct ValidateUrlRequest {
    #[validate(length(max = 2048))]
    pub url: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ValidateUrlResponse {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub normalized: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct SpokenInputRequest {
    #[validate(length(max = 1000))]
    pub transcript: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SpokenInputResponse {
    pub valid: bool,
    pub candidate: Option<String>,
    pub tried: Vec<String>,
}

pub async fn validate_url(
    Json(req): Json<ValidateUrlRequest>,
) -> Result<Json<ValidateUrlResponse>, ApiError> {
    req.validate().map_err(validation_error)?;

    let response = match parse_target(&req.url) {
        Ok(url) => ValidateUrlResponse {
            valid: true,
            normalized: Some(url.to_string()),
            code: None,
            error: None,
        },
        Err(e) => ValidateUrlResponse {
            valid: false,
            normalized: None,
            code: Some(e.code().to_string()),
            error: Some(e.to_string()),
        },
    };

    Ok(Json(response))
}

pub async fn normalize_spoken(
    Json(req): Json<SpokenInputRequest>,
) -> Result<Json<SpokenInputResponse>, ApiError> {
    req.validate().map_err(validation_error)?;

    let tried = input::candidates(&req.transcript);
    let candidate = input::normalize_spoken_url(&req.transcript);

    tracing::debug!(
        "Spoken input produced {} candidates, accepted: {:?}",
        tried.len(),
        candidate
    );

    Ok(Json(SpokenInputResponse {
        valid: candidate.is_some(),
        candidate,
        tried,
    }))
}
