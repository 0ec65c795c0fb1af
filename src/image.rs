//! Image Provider
//!
//! Turns a prompt into a durable public URL: the image is synthesized by an
//! [`ImageGenerator`], written to [`ObjectStorage`] under a fresh key, and the
//! object's public URL is returned. Callers treat any `Err` as "skip this
//! element and continue".

use crate::document::AspectRatio;
use crate::error::ApiError;
use crate::retry::RetryPolicy;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

pub mod imagen;
pub mod storage;

pub use imagen::ImagenClient;
pub use storage::{BucketSetup, GcsStorage};

pub const PNG_CONTENT_TYPE: &str = "image/png";
/// Generated images never change under their key, so they may be cached for a year.
pub const IMMUTABLE_CACHE_CONTROL: &str = "public, max-age=31536000";

#[async_trait]
pub trait ImageProvider: Send + Sync {
    /// Generate one image for `prompt` and return its public URL.
    ///
    /// `aspect_ratio` is validated first; an unsupported ratio fails with
    /// `ApiError::InvalidArgument` before any remote call is made.
    async fn generate(&self, prompt: &str, aspect_ratio: &str) -> Result<String, ApiError>;

    /// Remove a previously generated image. Best-effort: failures are logged.
    async fn delete(&self, url: &str);
}

#[async_trait]
pub trait ImageGenerator: Send + Sync {
    /// PNG bytes of one image, or `ApiError::EmptyGeneration` when the model
    /// produced nothing.
    async fn generate_png(&self, prompt: &str, aspect_ratio: AspectRatio)
        -> Result<Vec<u8>, ApiError>;

    fn model_name(&self) -> &str;
}

#[async_trait]
pub trait ObjectStorage: Send + Sync {
    async fn put_object(
        &self,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
        cache_control: &str,
    ) -> Result<(), ApiError>;

    async fn delete_object(&self, key: &str) -> Result<(), ApiError>;

    fn public_url(&self, key: &str) -> String;
}

/// [`ImageProvider`] backed by a generator and an object store.
pub struct StoredImageProvider {
    generator: Arc<dyn ImageGenerator>,
    storage: Arc<dyn ObjectStorage>,
    prefix: String,
    retry: RetryPolicy,
}

impl StoredImageProvider {
    pub fn new(
        generator: Arc<dyn ImageGenerator>,
        storage: Arc<dyn ObjectStorage>,
        prefix: &str,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            generator,
            storage,
            prefix: prefix.trim_matches('/').to_string(),
            retry,
        }
    }

    fn fresh_key(&self) -> String {
        format!("{}/{}.png", self.prefix, Uuid::new_v4())
    }

    /// Storage key for a URL produced by [`ImageProvider::generate`].
    pub fn key_for_url(&self, url: &str) -> Option<String> {
        let name = url.trim_end_matches('/').rsplit('/').next()?;
        if name.is_empty() || name.contains(':') {
            return None;
        }
        Some(format!("{}/{}", self.prefix, name))
    }
}

#[async_trait]
impl ImageProvider for StoredImageProvider {
    async fn generate(&self, prompt: &str, aspect_ratio: &str) -> Result<String, ApiError> {
        let ratio: AspectRatio = aspect_ratio.parse()?;
        if prompt.trim().is_empty() {
            return Err(ApiError::InvalidArgument("image prompt is empty".to_string()));
        }

        let bytes = self
            .retry
            .run("image generation", || {
                self.generator.generate_png(prompt, ratio)
            })
            .await?;
        if bytes.is_empty() {
            return Err(ApiError::EmptyGeneration(prompt.to_string()));
        }

        let key = self.fresh_key();
        debug!(key = %key, size = bytes.len(), model = self.generator.model_name(), "Storing generated image");
        self.retry
            .run("image upload", || {
                self.storage.put_object(
                    &key,
                    bytes.clone(),
                    PNG_CONTENT_TYPE,
                    IMMUTABLE_CACHE_CONTROL,
                )
            })
            .await?;

        let url = self.storage.public_url(&key);
        info!(url = %url, aspect_ratio = %ratio, "Generated image stored");
        Ok(url)
    }

    async fn delete(&self, url: &str) {
        let Some(key) = self.key_for_url(url) else {
            warn!(url, "Cannot derive a storage key from image URL");
            return;
        };
        match self.storage.delete_object(&key).await {
            Ok(()) => info!(key = %key, "Deleted image"),
            Err(err) => warn!(key = %key, error = %err, "Failed to delete image"),
        }
    }
}
