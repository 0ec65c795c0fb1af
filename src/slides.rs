//! Presentation Service
//!
//! Batch-mutation access to the remote presentation document. A batch is
//! applied all-or-nothing by the service; there is no atomicity across batches.

use crate::error::ApiError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub mod client;
pub mod commands;

pub use client::SlidesHttpClient;
pub use commands::MutationCommand;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchUpdateResponse {
    #[serde(rename = "presentationId", default)]
    pub presentation_id: Option<String>,
    /// `replies[i]` answers `requests[i]`; commands without output reply `{}`.
    #[serde(default)]
    pub replies: Vec<serde_json::Value>,
}

impl BatchUpdateResponse {
    /// Object ID assigned to the slide created by request `index`.
    pub fn created_slide_id(&self, index: usize) -> Result<String, ApiError> {
        self.replies
            .get(index)
            .and_then(|reply| reply.get("createSlide"))
            .and_then(|created| created.get("objectId"))
            .and_then(|id| id.as_str())
            .map(str::to_string)
            .ok_or_else(|| {
                ApiError::BatchReply(format!("reply {} carries no createSlide.objectId", index))
            })
    }
}

#[async_trait]
pub trait PresentationService: Send + Sync {
    /// Apply `requests` to the presentation as one atomic batch.
    async fn batch_update(
        &self,
        presentation_id: &str,
        requests: &[MutationCommand],
    ) -> Result<BatchUpdateResponse, ApiError>;

    /// Copy a presentation into a folder and return the copy's ID.
    async fn copy_presentation(
        &self,
        presentation_id: &str,
        name: &str,
        folder_id: &str,
    ) -> Result<String, ApiError>;
}
