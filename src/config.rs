//! Configuration System
//!
//! Layered configuration for a slidesmith workspace: built-in defaults, the
//! global file, workspace files, `SLIDESMITH_*` environment variables, then an
//! explicit `--config` file. CLI flags are applied by the caller on top.

use crate::error::ApiError;
use crate::logging::LoggingConfig;
use crate::retry::RetryPolicy;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

mod facade;
mod merge;
mod sources;

pub use facade::ConfigLoader;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SlidesmithConfig {
    #[serde(default)]
    pub presentation: PresentationConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub image: ImageConfig,

    #[serde(default)]
    pub retry: RetryPolicy,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Target presentation and the credentials used to mutate it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PresentationConfig {
    /// Template (or target) presentation ID
    #[serde(default)]
    pub presentation_id: Option<String>,

    #[serde(default = "default_credentials_file")]
    pub credentials_file: PathBuf,

    /// Ceiling on mutation calls per minute
    #[serde(default = "default_requests_per_minute")]
    pub requests_per_minute: u32,

    /// When set, the template is copied into this folder and the copy is populated
    #[serde(default)]
    pub destination_folder_id: Option<String>,

    #[serde(default)]
    pub copy_name: Option<String>,

    #[serde(default = "default_input_file")]
    pub input_file: PathBuf,

    #[serde(default)]
    pub slides_endpoint: Option<String>,

    #[serde(default)]
    pub drive_endpoint: Option<String>,
}

fn default_credentials_file() -> PathBuf {
    PathBuf::from("credentials.json")
}

fn default_requests_per_minute() -> u32 {
    60
}

fn default_input_file() -> PathBuf {
    PathBuf::from("slides.json")
}

impl Default for PresentationConfig {
    fn default() -> Self {
        Self {
            presentation_id: None,
            credentials_file: default_credentials_file(),
            requests_per_minute: default_requests_per_minute(),
            destination_folder_id: None,
            copy_name: None,
            input_file: default_input_file(),
            slides_endpoint: None,
            drive_endpoint: None,
        }
    }
}

/// Object storage holding generated images
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub bucket: String,

    #[serde(default = "default_region")]
    pub region: String,

    #[serde(default = "default_image_prefix")]
    pub image_prefix: String,

    #[serde(default)]
    pub endpoint: Option<String>,

    /// Host serving public object URLs
    #[serde(default)]
    pub public_host: Option<String>,

    /// Needed only when `setup-storage` has to create the bucket
    #[serde(default)]
    pub project_id: Option<String>,
}

fn default_region() -> String {
    "us-central1".to_string()
}

fn default_image_prefix() -> String {
    "slides".to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            bucket: String::new(),
            region: default_region(),
            image_prefix: default_image_prefix(),
            endpoint: None,
            public_host: None,
            project_id: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImageConfig {
    #[serde(default)]
    pub model: Option<String>,

    #[serde(default)]
    pub endpoint: Option<String>,

    /// Overrides `api_key` from the credentials file
    #[serde(default)]
    pub api_key: Option<String>,
}

/// Configuration validation errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    Presentation(String),
    Storage(String),
    Retry(String),
    Logging(String),
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::Presentation(msg) => write!(f, "presentation: {}", msg),
            ValidationError::Storage(msg) => write!(f, "storage: {}", msg),
            ValidationError::Retry(msg) => write!(f, "retry: {}", msg),
            ValidationError::Logging(msg) => write!(f, "logging: {}", msg),
        }
    }
}

impl std::error::Error for ValidationError {}

fn is_url(value: &str) -> bool {
    value.starts_with("http://") || value.starts_with("https://")
}

impl SlidesmithConfig {
    /// Validate the entire configuration, collecting every problem.
    ///
    /// Only checks values that are wrong whatever the command; values a
    /// command needs but that are unset (presentation ID, bucket) are checked
    /// where that command starts.
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if self.presentation.requests_per_minute == 0 {
            errors.push(ValidationError::Presentation(
                "requests_per_minute must be greater than zero".to_string(),
            ));
        }
        if self.presentation.credentials_file.as_os_str().is_empty() {
            errors.push(ValidationError::Presentation(
                "credentials_file cannot be empty".to_string(),
            ));
        }
        for (name, endpoint) in [
            ("slides_endpoint", &self.presentation.slides_endpoint),
            ("drive_endpoint", &self.presentation.drive_endpoint),
        ] {
            if let Some(url) = endpoint {
                if !is_url(url) {
                    errors.push(ValidationError::Presentation(format!(
                        "{} must be an http(s) URL, got '{}'",
                        name, url
                    )));
                }
            }
        }

        if self.storage.image_prefix.trim_matches('/').is_empty() {
            errors.push(ValidationError::Storage(
                "image_prefix cannot be empty".to_string(),
            ));
        }
        if let Some(url) = &self.storage.endpoint {
            if !is_url(url) {
                errors.push(ValidationError::Storage(format!(
                    "endpoint must be an http(s) URL, got '{}'",
                    url
                )));
            }
        }
        if let Some(url) = &self.image.endpoint {
            if !is_url(url) {
                errors.push(ValidationError::Storage(format!(
                    "image endpoint must be an http(s) URL, got '{}'",
                    url
                )));
            }
        }

        if let Err(e) = self.retry.validate() {
            errors.push(ValidationError::Retry(e));
        }
        if let Err(e) = self.logging.validate() {
            errors.push(ValidationError::Logging(e));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Validate and fold every problem into one `ConfigError`.
    pub fn ensure_valid(&self) -> Result<(), ApiError> {
        self.validate().map_err(|errors| {
            let error_msgs: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            ApiError::ConfigError(format!(
                "Configuration validation failed:\n{}",
                error_msgs.join("\n")
            ))
        })
    }

    /// Resolve relative paths in the presentation section against `workspace_root`.
    pub fn resolve_paths(&mut self, workspace_root: &Path) {
        for path in [
            &mut self.presentation.credentials_file,
            &mut self.presentation.input_file,
        ] {
            if path.is_relative() {
                *path = workspace_root.join(&*path);
            }
        }
    }
}
