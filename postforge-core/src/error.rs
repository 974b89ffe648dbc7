use std::{fmt, time::Duration};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PostforgeError {
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),
    #[error("LLM provider failed: {0}")]
    LlmProvider(String),
    #[error("Operation timed out after {0:?}")]
    Timeout(Duration),
    #[error("Generation failed after {attempts} attempt(s): {source}")]
    GenerationFailed {
        attempts: usize,
        #[source]
        source: Box<PostforgeError>,
    },
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("Lead persistence failed: {0}")]
    Persistence(String),
}

/// Rejections raised while normalizing an inbound request. These never reach
/// the provider and are never retried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    MissingFields(Vec<&'static str>),
    InvalidEmail,
    MalformedBody(String),
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::MissingFields(fields) => {
                write!(f, "missing required fields: {}", fields.join(", "))
            }
            ValidationError::InvalidEmail => write!(f, "invalid email"),
            ValidationError::MalformedBody(reason) => write!(f, "malformed request body: {reason}"),
        }
    }
}

impl std::error::Error for ValidationError {}
