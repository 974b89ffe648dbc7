use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use postforge_core::{PostforgeError, ValidationError};

pub const GENERIC_FAILURE_MESSAGE: &str = "Something went wrong. Please try again in a few seconds.";
pub const CONFIGURATION_MESSAGE: &str =
    "The generator is not configured yet. Set OPENAI_API_KEY on the server and restart it.";

/// What a caller is allowed to see. Provider and transport details stay in
/// the logs.
#[derive(Debug)]
pub enum ApiError {
    Validation(ValidationError),
    Configuration,
    Generation,
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::Validation(err)
    }
}

impl From<PostforgeError> for ApiError {
    fn from(err: PostforgeError) -> Self {
        match err {
            PostforgeError::Validation(inner) => ApiError::Validation(inner),
            PostforgeError::InvalidConfig(_) => ApiError::Configuration,
            _ => ApiError::Generation,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Validation(err) => (StatusCode::BAD_REQUEST, err.to_string()),
            ApiError::Configuration => (
                StatusCode::INTERNAL_SERVER_ERROR,
                CONFIGURATION_MESSAGE.to_string(),
            ),
            ApiError::Generation => (
                StatusCode::INTERNAL_SERVER_ERROR,
                GENERIC_FAILURE_MESSAGE.to_string(),
            ),
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}
