//! Error types and HTTP status mapping

use serde::Serialize;
use thiserror::Error;

/// Result type alias for workbench operations
pub type Result<T> = std::result::Result<T, ApiError>;

/// Workbench error with HTTP status code mapping
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    #[error("invalid request: {message}")]
    InvalidRequest { message: String },

    #[error("fixture store unavailable: {message}")]
    StoreUnavailable { message: String },

    #[error("fixture lookup failed: {message}")]
    LookupFailed { message: String },

    #[error("failed to decode response body: {message}")]
    DecodeFailed { message: String },

    #[error("unsupported store capability: {message}")]
    Unsupported { message: String },

    /// A simulated or upstream HTTP failure carrying its status
    #[error("{message}")]
    Http { status: u16, message: String },

    #[error("not found: {message}")]
    NotFound { message: String },

    #[error("internal error: {message}")]
    Internal { message: String },

    #[error("upstream error: {message}")]
    UpstreamError { message: String },
}

impl ApiError {
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest {
            message: message.into(),
        }
    }

    pub fn store_unavailable(message: impl Into<String>) -> Self {
        Self::StoreUnavailable {
            message: message.into(),
        }
    }

    pub fn lookup_failed(message: impl Into<String>) -> Self {
        Self::LookupFailed {
            message: message.into(),
        }
    }

    pub fn decode_failed(message: impl Into<String>) -> Self {
        Self::DecodeFailed {
            message: message.into(),
        }
    }

    pub fn unsupported(message: impl Into<String>) -> Self {
        Self::Unsupported {
            message: message.into(),
        }
    }

    /// Synthetic error for a fixture that declares a failing status
    pub fn simulated_http(status: u16) -> Self {
        Self::Http {
            status,
            message: format!("HTTP Error {}", status),
        }
    }

    pub fn http(status: u16, message: impl Into<String>) -> Self {
        Self::Http {
            status,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    pub fn upstream_error(message: impl Into<String>) -> Self {
        Self::UpstreamError {
            message: message.into(),
        }
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            Self::InvalidRequest { .. } => 400,
            Self::StoreUnavailable { .. } => 503,
            Self::LookupFailed { .. } => 500,
            Self::DecodeFailed { .. } => 500,
            Self::Unsupported { .. } => 501,
            // Statuses outside the valid range fall back to 500 at the HTTP layer
            Self::Http { status, .. } => *status,
            Self::NotFound { .. } => 404,
            Self::Internal { .. } => 500,
            Self::UpstreamError { .. } => 502,
        }
    }

    /// Get the error key for this error
    pub fn error_key(&self) -> &'static str {
        match self {
            Self::InvalidRequest { .. } => "invalid_request",
            Self::StoreUnavailable { .. } => "store_unavailable",
            Self::LookupFailed { .. } => "lookup_failed",
            Self::DecodeFailed { .. } => "decode_failed",
            Self::Unsupported { .. } => "unsupported",
            Self::Http { .. } => "http_error",
            Self::NotFound { .. } => "not_found",
            Self::Internal { .. } => "internal_error",
            Self::UpstreamError { .. } => "upstream_error",
        }
    }
}

/// Error response body
#[derive(Serialize, Debug)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl From<&ApiError> for ErrorResponse {
    fn from(err: &ApiError) -> Self {
        Self {
            error: err.error_key().to_string(),
            message: err.to_string(),
        }
    }
}
