//! Error taxonomy for Zoho CRM API interactions

use reqwest::StatusCode;
use thiserror::Error;

use super::constants::codes;

/// Errors surfaced by the API layer.
///
/// Reads propagate these as-is. The bulk updater degrades `Transport`,
/// `Remote` and `RetriesExhausted` into per-record failures instead.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Credentials missing or incomplete after falling back to defaults
    #[error("configuration error: {0}")]
    Configuration(String),

    /// One or more target values are not part of the status catalog
    #[error("invalid status value(s): {}", format_invalid(.invalid))]
    Validation { invalid: Vec<String> },

    /// The token exchange failed
    #[error("authentication failed: {0}")]
    Auth(String),

    /// Network-level failure (connect, timeout, DNS, ...) after all attempts
    #[error("request failed after {attempts} attempt(s): {message}")]
    Transport { attempts: u32, message: String },

    /// Non-retryable non-2xx response
    #[error("remote error {status}: {code}: {message}")]
    Remote {
        status: StatusCode,
        code: String,
        message: String,
        body: String,
    },

    /// Every attempt ended in 429 or 5xx
    #[error("gave up after {attempts} attempt(s) (last status code: {status})")]
    RetriesExhausted { status: StatusCode, attempts: u32 },

    /// Response body could not be decoded
    #[error("failed to decode response: {0}")]
    Decode(String),
}

fn format_invalid(values: &[String]) -> String {
    values
        .iter()
        .map(|v| format!("{:?}", v))
        .collect::<Vec<_>>()
        .join(", ")
}

impl ApiError {
    /// Error code recorded on per-record failures synthesized from this error
    pub fn record_code(&self) -> String {
        match self {
            Self::Transport { .. } => codes::REQUEST_FAILED.to_string(),
            Self::RetriesExhausted { .. } => codes::FAILED_RETRIES.to_string(),
            Self::Remote { code, .. } => code.clone(),
            Self::Configuration(_) => "CONFIGURATION_ERROR".to_string(),
            Self::Validation { .. } => "VALIDATION_ERROR".to_string(),
            Self::Auth(_) => "AUTH_ERROR".to_string(),
            Self::Decode(_) => "INVALID_RESPONSE".to_string(),
        }
    }

    /// Human-readable message recorded on per-record failures
    pub fn record_message(&self) -> String {
        match self {
            Self::Remote { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }

    /// HTTP status carried by the error, if any
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Remote { status, .. } | Self::RetriesExhausted { status, .. } => Some(*status),
            _ => None,
        }
    }
}
