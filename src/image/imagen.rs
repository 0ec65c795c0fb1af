//! Imagen client over the Generative Language `predict` endpoint.

use crate::document::AspectRatio;
use crate::error::ApiError;
use crate::http::{build_http_client, ensure_success, map_transport_error, trim_endpoint};
use crate::image::ImageGenerator;
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use reqwest::Client;
use serde::{Deserialize, Serialize};

pub const DEFAULT_IMAGEN_ENDPOINT: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_IMAGEN_MODEL: &str = "imagen-3.0-generate-002";

#[derive(Serialize)]
struct PredictRequest<'a> {
    instances: [PredictInstance<'a>; 1],
    parameters: PredictParameters,
}

#[derive(Serialize)]
struct PredictInstance<'a> {
    prompt: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PredictParameters {
    sample_count: u32,
    aspect_ratio: &'static str,
}

#[derive(Deserialize)]
struct PredictResponse {
    #[serde(default)]
    predictions: Vec<Prediction>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Prediction {
    #[serde(default)]
    bytes_base64_encoded: Option<String>,
}

pub struct ImagenClient {
    client: Client,
    model: String,
    api_key: String,
    endpoint: String,
}

impl ImagenClient {
    pub fn new(
        model: Option<String>,
        api_key: String,
        endpoint: Option<String>,
    ) -> Result<Self, ApiError> {
        Ok(Self {
            client: build_http_client()?,
            model: model.unwrap_or_else(|| DEFAULT_IMAGEN_MODEL.to_string()),
            api_key,
            endpoint: trim_endpoint(endpoint, DEFAULT_IMAGEN_ENDPOINT),
        })
    }
}

#[async_trait]
impl ImageGenerator for ImagenClient {
    async fn generate_png(
        &self,
        prompt: &str,
        aspect_ratio: AspectRatio,
    ) -> Result<Vec<u8>, ApiError> {
        let url = format!("{}/v1beta/models/{}:predict", self.endpoint, self.model);
        let request = PredictRequest {
            instances: [PredictInstance { prompt }],
            parameters: PredictParameters {
                sample_count: 1,
                aspect_ratio: aspect_ratio.as_str(),
            },
        };

        let response = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&request)
            .send()
            .await
            .map_err(map_transport_error)?;
        let response = ensure_success(response, ApiError::ProviderError).await?;

        let parsed: PredictResponse = response.json().await.map_err(|e| {
            ApiError::ProviderError(format!("Failed to parse predict response: {}", e))
        })?;

        // Safety filters drop images silently, leaving predictions empty.
        let encoded = parsed
            .predictions
            .into_iter()
            .find_map(|p| p.bytes_base64_encoded)
            .ok_or_else(|| ApiError::EmptyGeneration(prompt.to_string()))?;

        STANDARD
            .decode(encoded.as_bytes())
            .map_err(|e| ApiError::ProviderError(format!("Invalid image payload: {}", e)))
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
