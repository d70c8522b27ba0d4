use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// User-facing classification of every failure the captioning flow can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCategory {
    MissingConfiguration,
    InvalidInput,
    Unauthorized,
    RateLimited,
    ProviderError,
    NetworkError,
}

/// Server-side error for the caption route. Every variant renders as
/// `{ "error": message }` with its mapped status.
#[derive(Debug, Error)]
pub enum CaptionError {
    #[error("OpenAI API key is not configured")]
    MissingConfiguration,

    #[error("Image data is required")]
    MissingImage,

    #[error("Invalid image format. Expected a data:image URL")]
    InvalidImageFormat,

    /// Request body could not be read as a JSON object
    #[error("Invalid request body: {0}")]
    InvalidBody(String),

    /// Local bytes are not a recognised image
    #[error("Unsupported image file")]
    UnsupportedImage,

    #[error("Invalid OpenAI API key")]
    Unauthorized,

    #[error("Rate limit exceeded. Please try again later.")]
    RateLimited,

    #[error("{message}")]
    Provider { status: u16, message: String },

    #[error("Failed to generate caption")]
    Network(#[source] anyhow::Error),
}

impl CaptionError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            CaptionError::MissingConfiguration => ErrorCategory::MissingConfiguration,
            CaptionError::MissingImage
            | CaptionError::InvalidImageFormat
            | CaptionError::InvalidBody(_)
            | CaptionError::UnsupportedImage => ErrorCategory::InvalidInput,
            CaptionError::Unauthorized => ErrorCategory::Unauthorized,
            CaptionError::RateLimited => ErrorCategory::RateLimited,
            CaptionError::Provider { .. } => ErrorCategory::ProviderError,
            CaptionError::Network(_) => ErrorCategory::NetworkError,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            CaptionError::MissingConfiguration | CaptionError::Network(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            CaptionError::MissingImage
            | CaptionError::InvalidImageFormat
            | CaptionError::InvalidBody(_)
            | CaptionError::UnsupportedImage => StatusCode::BAD_REQUEST,
            CaptionError::Unauthorized => StatusCode::UNAUTHORIZED,
            CaptionError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            CaptionError::Provider { status, .. } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
            }
        }
    }

    /// Failures reported by the provider. These are logged where the provider
    /// call ends, not again when rendered.
    pub fn is_upstream(&self) -> bool {
        matches!(
            self,
            CaptionError::Unauthorized
                | CaptionError::RateLimited
                | CaptionError::Provider { .. }
                | CaptionError::Network(_)
        )
    }

    pub fn descriptor(&self) -> ErrorDescriptor {
        ErrorDescriptor {
            category: self.category(),
            message: self.to_string(),
            status_code: self.status_code().as_u16(),
        }
    }
}

impl IntoResponse for CaptionError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if !self.is_upstream() {
            if status.is_server_error() {
                tracing::error!(category = ?self.category(), error = %self, "caption request failed");
            } else {
                tracing::warn!(category = ?self.category(), error = %self, "caption request rejected");
            }
        }
        (status, Json(ErrorBody { error: self.to_string() })).into_response()
    }
}

/// Wire shape of every error response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Failure as held and displayed by a client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDescriptor {
    pub category: ErrorCategory,
    pub message: String,
    pub status_code: u16,
}

impl ErrorDescriptor {
    pub fn new(category: ErrorCategory, message: impl Into<String>, status_code: u16) -> Self {
        Self {
            category,
            message: message.into(),
            status_code,
        }
    }

    /// Best-effort category for a status returned by the caption server.
    ///
    /// The wire body carries only a message, so this is lossy: every status
    /// other than 400, 401 and 429 becomes `ProviderError`, including a
    /// server-side `MissingConfiguration` or `NetworkError` (both 500).
    pub fn from_status(status_code: u16, message: impl Into<String>) -> Self {
        let category = match status_code {
            400 => ErrorCategory::InvalidInput,
            401 => ErrorCategory::Unauthorized,
            429 => ErrorCategory::RateLimited,
            _ => ErrorCategory::ProviderError,
        };
        Self::new(category, message, status_code)
    }
}

impl From<&CaptionError> for ErrorDescriptor {
    fn from(err: &CaptionError) -> Self {
        err.descriptor()
    }
}

/// What a vision provider reports when it cannot produce text.
#[derive(Debug, Error)]
pub enum ProviderFailure {
    #[error("provider error (status {status:?}): {message}")]
    Api { status: Option<u16>, message: String },

    #[error("transport failure: {0}")]
    Transport(#[source] anyhow::Error),
}

impl ProviderFailure {
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, ProviderFailure::Api { status: Some(429), .. })
    }
}

impl From<ProviderFailure> for CaptionError {
    fn from(failure: ProviderFailure) -> Self {
        match failure {
            ProviderFailure::Api { status: Some(401), .. } => CaptionError::Unauthorized,
            ProviderFailure::Api { status: Some(429), .. } => CaptionError::RateLimited,
            ProviderFailure::Api { status, message } => {
                let status = status
                    .filter(|s| StatusCode::from_u16(*s).is_ok())
                    .unwrap_or(500);
                let message = if message.trim().is_empty() {
                    "Failed to generate caption".to_string()
                } else {
                    message
                };
                CaptionError::Provider { status, message }
            }
            ProviderFailure::Transport(source) => CaptionError::Network(source),
        }
    }
}
