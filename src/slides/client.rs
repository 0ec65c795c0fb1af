//! HTTP client for the Slides `batchUpdate` endpoint and the Drive copy endpoint.

use crate::credentials::Credentials;
use crate::error::ApiError;
use crate::http::{build_http_client, ensure_success, map_transport_error, trim_endpoint};
use crate::slides::{BatchUpdateResponse, MutationCommand, PresentationService};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

pub const DEFAULT_SLIDES_ENDPOINT: &str = "https://slides.googleapis.com";
pub const DEFAULT_DRIVE_ENDPOINT: &str = "https://www.googleapis.com";

#[derive(Serialize)]
struct BatchUpdateRequest<'a> {
    requests: &'a [MutationCommand],
}

#[derive(Serialize)]
struct CopyRequest<'a> {
    name: &'a str,
    parents: [&'a str; 1],
}

#[derive(Deserialize)]
struct CopyResponse {
    id: String,
}

pub struct SlidesHttpClient {
    client: Client,
    access_token: String,
    slides_endpoint: String,
    drive_endpoint: String,
}

impl SlidesHttpClient {
    pub fn new(
        credentials: &Credentials,
        slides_endpoint: Option<String>,
        drive_endpoint: Option<String>,
    ) -> Result<Self, ApiError> {
        Ok(Self {
            client: build_http_client()?,
            access_token: credentials.access_token.clone(),
            slides_endpoint: trim_endpoint(slides_endpoint, DEFAULT_SLIDES_ENDPOINT),
            drive_endpoint: trim_endpoint(drive_endpoint, DEFAULT_DRIVE_ENDPOINT),
        })
    }
}

#[async_trait]
impl PresentationService for SlidesHttpClient {
    async fn batch_update(
        &self,
        presentation_id: &str,
        requests: &[MutationCommand],
    ) -> Result<BatchUpdateResponse, ApiError> {
        let url = format!(
            "{}/v1/presentations/{}:batchUpdate",
            self.slides_endpoint, presentation_id
        );
        debug!(presentation_id, requests = requests.len(), "Submitting batchUpdate");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.access_token)
            .json(&BatchUpdateRequest { requests })
            .send()
            .await
            .map_err(map_transport_error)?;
        let response = ensure_success(response, ApiError::BatchRejected).await?;

        let parsed: BatchUpdateResponse = response.json().await.map_err(|e| {
            ApiError::BatchReply(format!("Failed to parse batchUpdate response: {}", e))
        })?;
        if parsed.replies.len() > requests.len() {
            return Err(ApiError::BatchReply(format!(
                "{} replies for {} requests",
                parsed.replies.len(),
                requests.len()
            )));
        }
        Ok(parsed)
    }

    async fn copy_presentation(
        &self,
        presentation_id: &str,
        name: &str,
        folder_id: &str,
    ) -> Result<String, ApiError> {
        let url = format!(
            "{}/drive/v3/files/{}/copy?supportsAllDrives=true",
            self.drive_endpoint, presentation_id
        );
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.access_token)
            .json(&CopyRequest {
                name,
                parents: [folder_id],
            })
            .send()
            .await
            .map_err(map_transport_error)?;
        let response = ensure_success(response, ApiError::ProviderError).await?;
        let copy: CopyResponse = response
            .json()
            .await
            .map_err(|e| ApiError::ProviderError(format!("Failed to parse copy response: {}", e)))?;
        Ok(copy.id)
    }
}
