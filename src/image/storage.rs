//! Google Cloud Storage access through the JSON API.

use crate::credentials::Credentials;
use crate::error::ApiError;
use crate::http::{build_http_client, ensure_success, map_transport_error, trim_endpoint};
use crate::image::ObjectStorage;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, info};

pub const DEFAULT_STORAGE_ENDPOINT: &str = "https://storage.googleapis.com";
pub const DEFAULT_PUBLIC_HOST: &str = "storage.googleapis.com";

const PUBLIC_READ_ROLE: &str = "roles/storage.objectViewer";
const ALL_USERS: &str = "allUsers";

/// Outcome of [`GcsStorage::ensure_bucket`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BucketSetup {
    pub bucket: String,
    pub created: bool,
    pub public_granted: bool,
    pub base_url: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct IamPolicy {
    #[serde(default)]
    bindings: Vec<IamBinding>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    etag: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    version: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct IamBinding {
    role: String,
    #[serde(default)]
    members: Vec<String>,
}

impl IamPolicy {
    /// Add public read access; returns false when it was already present.
    fn grant_public_read(&mut self) -> bool {
        if let Some(binding) = self.bindings.iter_mut().find(|b| b.role == PUBLIC_READ_ROLE) {
            if binding.members.iter().any(|m| m == ALL_USERS) {
                return false;
            }
            binding.members.push(ALL_USERS.to_string());
        } else {
            self.bindings.push(IamBinding {
                role: PUBLIC_READ_ROLE.to_string(),
                members: vec![ALL_USERS.to_string()],
            });
        }
        true
    }
}

pub struct GcsStorage {
    client: Client,
    access_token: String,
    bucket: String,
    endpoint: String,
    public_host: String,
}

impl GcsStorage {
    pub fn new(
        credentials: &Credentials,
        bucket: &str,
        endpoint: Option<String>,
        public_host: Option<String>,
    ) -> Result<Self, ApiError> {
        if bucket.trim().is_empty() {
            return Err(ApiError::ConfigError("storage.bucket is not set".to_string()));
        }
        Ok(Self {
            client: build_http_client()?,
            access_token: credentials.access_token.clone(),
            bucket: bucket.to_string(),
            endpoint: trim_endpoint(endpoint, DEFAULT_STORAGE_ENDPOINT),
            public_host: public_host
                .unwrap_or_else(|| DEFAULT_PUBLIC_HOST.to_string())
                .trim_end_matches('/')
                .to_string(),
        })
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    fn object_url(&self, key: &str) -> String {
        format!(
            "{}/storage/v1/b/{}/o/{}",
            self.endpoint,
            self.bucket,
            urlencoding::encode(key)
        )
    }

    fn bucket_url(&self) -> String {
        format!("{}/storage/v1/b/{}", self.endpoint, self.bucket)
    }

    /// Create the bucket in `region` when missing and make its objects publicly readable.
    pub async fn ensure_bucket(
        &self,
        project_id: Option<&str>,
        region: &str,
    ) -> Result<BucketSetup, ApiError> {
        let lookup = self
            .client
            .get(self.bucket_url())
            .bearer_auth(&self.access_token)
            .send()
            .await
            .map_err(map_transport_error)?;

        let created = if lookup.status() == StatusCode::NOT_FOUND {
            let project = project_id.filter(|p| !p.is_empty()).ok_or_else(|| {
                ApiError::ConfigError(
                    "storage.project_id is required to create a bucket".to_string(),
                )
            })?;
            let response = self
                .client
                .post(format!("{}/storage/v1/b", self.endpoint))
                .query(&[("project", project)])
                .bearer_auth(&self.access_token)
                .json(&json!({ "name": self.bucket, "location": region }))
                .send()
                .await
                .map_err(map_transport_error)?;
            ensure_success(response, ApiError::StorageError).await?;
            info!(bucket = %self.bucket, region, "Created bucket");
            true
        } else {
            ensure_success(lookup, ApiError::StorageError).await?;
            info!(bucket = %self.bucket, "Bucket already exists");
            false
        };

        let iam_url = format!("{}/iam", self.bucket_url());
        let response = self
            .client
            .get(&iam_url)
            .bearer_auth(&self.access_token)
            .send()
            .await
            .map_err(map_transport_error)?;
        let response = ensure_success(response, ApiError::StorageError).await?;
        let mut policy: IamPolicy = response
            .json()
            .await
            .map_err(|e| ApiError::StorageError(format!("Failed to parse IAM policy: {}", e)))?;

        let public_granted = policy.grant_public_read();
        if public_granted {
            let response = self
                .client
                .put(&iam_url)
                .bearer_auth(&self.access_token)
                .json(&policy)
                .send()
                .await
                .map_err(map_transport_error)?;
            ensure_success(response, ApiError::StorageError).await?;
            info!(bucket = %self.bucket, "Granted public read access");
        }

        Ok(BucketSetup {
            bucket: self.bucket.clone(),
            created,
            public_granted,
            base_url: format!("https://{}/{}/", self.public_host, self.bucket),
        })
    }
}

#[async_trait]
impl ObjectStorage for GcsStorage {
    async fn put_object(
        &self,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
        cache_control: &str,
    ) -> Result<(), ApiError> {
        let upload_url = format!("{}/upload/storage/v1/b/{}/o", self.endpoint, self.bucket);
        let response = self
            .client
            .post(&upload_url)
            .query(&[("uploadType", "media"), ("name", key)])
            .bearer_auth(&self.access_token)
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(bytes)
            .send()
            .await
            .map_err(map_transport_error)?;
        ensure_success(response, ApiError::StorageError).await?;

        let response = self
            .client
            .patch(self.object_url(key))
            .bearer_auth(&self.access_token)
            .json(&json!({ "cacheControl": cache_control }))
            .send()
            .await
            .map_err(map_transport_error)?;
        ensure_success(response, ApiError::StorageError).await?;
        debug!(key, bucket = %self.bucket, "Uploaded object");
        Ok(())
    }

    async fn delete_object(&self, key: &str) -> Result<(), ApiError> {
        let response = self
            .client
            .delete(self.object_url(key))
            .bearer_auth(&self.access_token)
            .send()
            .await
            .map_err(map_transport_error)?;
        ensure_success(response, ApiError::StorageError).await?;
        Ok(())
    }

    fn public_url(&self, key: &str) -> String {
        format!("https://{}/{}/{}", self.public_host, self.bucket, key)
    }
}
