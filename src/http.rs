//! Shared HTTP plumbing for the remote services: client construction and
//! mapping of transport and status failures onto `ApiError`.

use crate::error::ApiError;
use reqwest::{Client, Response, StatusCode};
use std::time::Duration;

const HTTP_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const HTTP_REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

pub fn build_http_client() -> Result<Client, ApiError> {
    Client::builder()
        .connect_timeout(HTTP_CONNECT_TIMEOUT)
        .timeout(HTTP_REQUEST_TIMEOUT)
        .build()
        .map_err(|e| ApiError::ConfigError(format!("Failed to create HTTP client: {}", e)))
}

/// Configured endpoint, or `default`, without a trailing slash.
pub fn trim_endpoint(endpoint: Option<String>, default: &str) -> String {
    endpoint
        .unwrap_or_else(|| default.to_string())
        .trim_end_matches('/')
        .to_string()
}

pub fn map_transport_error(error: reqwest::Error) -> ApiError {
    if error.is_timeout() {
        ApiError::ProviderRequestFailed(format!("Request timeout: {}", error))
    } else if error.is_connect() {
        ApiError::ProviderRequestFailed(format!("Connection error: {}", error))
    } else {
        ApiError::ProviderError(format!("HTTP error: {}", error))
    }
}

/// Map a status code and response body to an error.
///
/// `rejected` builds the error for 4xx statuses that carry no special meaning,
/// which differ per service (a rejected batch, a storage failure, ...).
pub fn status_error(status: StatusCode, body: &str, rejected: fn(String) -> ApiError) -> ApiError {
    let detail = format!("status {}: {}", status, body.trim());
    match status.as_u16() {
        401 | 403 => ApiError::ProviderAuthFailed(detail),
        404 => ApiError::ProviderNotFound(detail),
        429 => ApiError::ProviderRateLimit(detail),
        s if s >= 500 => ApiError::ProviderRequestFailed(detail),
        _ => rejected(detail),
    }
}

/// Pass successful responses through; turn anything else into an error.
pub async fn ensure_success(
    response: Response,
    rejected: fn(String) -> ApiError,
) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());
    Err(status_error(status, &body, rejected))
}
