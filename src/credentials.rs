//! Credentials file loading.
//!
//! The file holds a bearer access token for the Slides, Drive and Cloud
//! Storage APIs, and optionally the API key for the image model.

use crate::error::ApiError;
use serde::Deserialize;
use std::fmt;
use std::path::Path;

/// Environment variable that supplies the access token when the file lacks one.
pub const ACCESS_TOKEN_ENV: &str = "SLIDESMITH_ACCESS_TOKEN";

#[derive(Clone, Deserialize)]
pub struct Credentials {
    #[serde(default)]
    pub access_token: String,
    #[serde(default)]
    pub api_key: Option<String>,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("access_token", &"<redacted>")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl Credentials {
    pub fn load(path: &Path) -> Result<Self, ApiError> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            ApiError::CredentialsError(format!(
                "Failed to read credentials file {}: {}",
                path.display(),
                e
            ))
        })?;
        let mut credentials: Credentials = serde_json::from_str(&raw).map_err(|e| {
            ApiError::CredentialsError(format!(
                "Credentials file {} is not valid JSON: {}",
                path.display(),
                e
            ))
        })?;

        if credentials.access_token.trim().is_empty() {
            if let Ok(token) = std::env::var(ACCESS_TOKEN_ENV) {
                credentials.access_token = token;
            }
        }
        credentials.validate()?;
        Ok(credentials)
    }

    pub fn validate(&self) -> Result<(), ApiError> {
        if self.access_token.trim().is_empty() {
            return Err(ApiError::CredentialsError(format!(
                "access_token is empty (set it in the credentials file or {})",
                ACCESS_TOKEN_ENV
            )));
        }
        Ok(())
    }

    /// API key for the image model: the configured one wins over the file's.
    pub fn image_api_key(&self, configured: Option<&str>) -> Result<String, ApiError> {
        configured
            .filter(|k| !k.is_empty())
            .or(self.api_key.as_deref().filter(|k| !k.is_empty()))
            .map(str::to_string)
            .ok_or_else(|| {
                ApiError::CredentialsError(
                    "No image API key: set image.api_key or api_key in the credentials file"
                        .to_string(),
                )
            })
    }
}
