//! Error types for the slidesmith template population pipeline.

use thiserror::Error;

/// Coarse error classes that decide whether a failure aborts the run or only
/// skips the element it belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Unreadable input, bad credentials, unusable configuration. Aborts the run.
    Setup,
    /// A single element is malformed. The element is skipped and never retried.
    Validation,
    /// Image generation or storage failed. The element is skipped.
    Provider,
    /// The presentation service rejected or failed a batch.
    BatchSubmission,
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Credentials error: {0}")]
    CredentialsError(String),

    #[error("Input document error: {0}")]
    InputError(String),

    #[error("Nothing to do: {0}")]
    NothingToDo(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Provider error: {0}")]
    ProviderError(String),

    #[error("Provider request failed: {0}")]
    ProviderRequestFailed(String),

    #[error("Provider authentication failed: {0}")]
    ProviderAuthFailed(String),

    #[error("Provider rate limit exceeded: {0}")]
    ProviderRateLimit(String),

    #[error("Provider resource not found: {0}")]
    ProviderNotFound(String),

    #[error("Image generation returned no images for prompt: {0}")]
    EmptyGeneration(String),

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("Batch rejected by presentation service: {0}")]
    BatchRejected(String),

    #[error("Unexpected batch reply: {0}")]
    BatchReply(String),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

impl ApiError {
    pub fn class(&self) -> ErrorClass {
        match self {
            ApiError::ConfigError(_)
            | ApiError::CredentialsError(_)
            | ApiError::InputError(_)
            | ApiError::NothingToDo(_)
            | ApiError::IoError(_) => ErrorClass::Setup,
            ApiError::InvalidArgument(_) => ErrorClass::Validation,
            ApiError::BatchRejected(_) | ApiError::BatchReply(_) => ErrorClass::BatchSubmission,
            ApiError::ProviderError(_)
            | ApiError::ProviderRequestFailed(_)
            | ApiError::ProviderAuthFailed(_)
            | ApiError::ProviderRateLimit(_)
            | ApiError::ProviderNotFound(_)
            | ApiError::EmptyGeneration(_)
            | ApiError::StorageError(_) => ErrorClass::Provider,
        }
    }

    /// Whether another attempt could plausibly succeed. Only quota and
    /// transport failures qualify; validation and auth problems never do.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ApiError::ProviderRateLimit(_) | ApiError::ProviderRequestFailed(_)
        )
    }
}

impl From<config::ConfigError> for ApiError {
    fn from(err: config::ConfigError) -> Self {
        ApiError::ConfigError(err.to_string())
    }
}
