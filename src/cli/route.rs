//! CLI route: single route table and run context. Dispatches to domain services and presentation.

use crate::config::{ConfigLoader, SlidesmithConfig};
use crate::credentials::Credentials;
use crate::document::SlideContentDocument;
use crate::error::ApiError;
use crate::image::{GcsStorage, ImageProvider, ImagenClient, ObjectStorage, StoredImageProvider};
use crate::orchestrator::{needs_images, select_work, Orchestrator, Phases, RunOptions};
use crate::slides::SlidesHttpClient;
use async_trait::async_trait;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

use crate::cli::command_name;
use crate::cli::parse::{Commands, RunArgs};
use crate::cli::presentation::{
    format_bucket_setup, format_document_stats_json, format_document_stats_text,
    format_run_summary_json, format_run_summary_text,
};

/// Runtime context for CLI execution: workspace and the loaded configuration.
/// Built from workspace path and optional config path using ConfigLoader only.
pub struct RunContext {
    workspace_root: PathBuf,
    config: SlidesmithConfig,
}

/// Stand-in used when the selected work touches no image, so a text-only run
/// needs no storage or image model configuration.
struct NoImages;

#[async_trait]
impl ImageProvider for NoImages {
    async fn generate(&self, _prompt: &str, _aspect_ratio: &str) -> Result<String, ApiError> {
        Err(ApiError::ConfigError(
            "image generation is not configured for this run".to_string(),
        ))
    }

    async fn delete(&self, _url: &str) {}
}

impl RunContext {
    /// Create run context from workspace root and optional config path. Uses ConfigLoader only.
    pub fn new(workspace_root: PathBuf, config_path: Option<PathBuf>) -> Result<Self, ApiError> {
        let mut config = ConfigLoader::load_with_override(&workspace_root, config_path.as_deref())?;
        config.ensure_valid()?;
        config.resolve_paths(&workspace_root);
        Ok(Self {
            workspace_root,
            config,
        })
    }

    pub fn config(&self) -> &SlidesmithConfig {
        &self.config
    }

    /// Execute a CLI command via the single route table.
    pub fn execute(&self, command: &Commands) -> Result<String, ApiError> {
        let started = Instant::now();
        info!(command = command_name(command), "Executing command");
        let result = match command {
            Commands::Run(args) => self.handle_run(args),
            Commands::Validate { input, format } => self.handle_validate(input.as_deref(), format),
            Commands::SetupStorage { bucket, region } => {
                self.handle_setup_storage(bucket.as_deref(), region.as_deref())
            }
            Commands::DeleteImage { url } => self.handle_delete_image(url),
        };
        info!(
            command = command_name(command),
            ok = result.is_ok(),
            duration_ms = started.elapsed().as_millis() as u64,
            "Command finished"
        );
        result
    }

    fn runtime() -> Result<tokio::runtime::Runtime, ApiError> {
        tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| ApiError::ConfigError(format!("Failed to create async runtime: {}", e)))
    }

    fn input_path(&self, input: Option<&Path>) -> PathBuf {
        match input {
            Some(path) if path.is_relative() => self.workspace_root.join(path),
            Some(path) => path.to_path_buf(),
            None => self.config.presentation.input_file.clone(),
        }
    }

    fn credentials(&self) -> Result<Credentials, ApiError> {
        Credentials::load(&self.config.presentation.credentials_file)
    }

    fn storage(&self, credentials: &Credentials, bucket: Option<&str>) -> Result<GcsStorage, ApiError> {
        let storage = &self.config.storage;
        GcsStorage::new(
            credentials,
            bucket.unwrap_or(&storage.bucket),
            storage.endpoint.clone(),
            storage.public_host.clone(),
        )
    }

    fn image_provider(&self, credentials: &Credentials) -> Result<StoredImageProvider, ApiError> {
        let api_key = credentials.image_api_key(self.config.image.api_key.as_deref())?;
        let generator = ImagenClient::new(
            self.config.image.model.clone(),
            api_key,
            self.config.image.endpoint.clone(),
        )?;
        let storage = self.storage(credentials, None)?;
        Ok(StoredImageProvider::new(
            Arc::new(generator),
            Arc::new(storage),
            &self.config.storage.image_prefix,
            self.config.retry.clone(),
        ))
    }

    fn handle_run(&self, args: &RunArgs) -> Result<String, ApiError> {
        let input = self.input_path(args.input.as_deref());
        let document = SlideContentDocument::load(&input)?;

        let template_id = args
            .presentation
            .clone()
            .or_else(|| self.config.presentation.presentation_id.clone())
            .filter(|id| !id.trim().is_empty())
            .ok_or_else(|| {
                ApiError::ConfigError(
                    "No presentation ID: pass --presentation or set presentation.presentation_id"
                        .to_string(),
                )
            })?;

        let phases = if args.text_only {
            Phases::text_only()
        } else if args.images_only {
            Phases::images_only()
        } else {
            Phases::all()
        };
        let options = RunOptions {
            phases,
            slides: if args.slides.is_empty() {
                None
            } else {
                Some(args.slides.iter().copied().collect::<BTreeSet<u32>>())
            },
        };

        let selected = select_work(&document, &options)?;

        let credentials = self.credentials()?;
        let service = SlidesHttpClient::new(
            &credentials,
            self.config.presentation.slides_endpoint.clone(),
            self.config.presentation.drive_endpoint.clone(),
        )?;
        let images: Box<dyn ImageProvider> = if needs_images(&selected, phases) {
            Box::new(self.image_provider(&credentials)?)
        } else {
            Box::new(NoImages)
        };

        let orchestrator = Orchestrator::new(
            &service,
            images.as_ref(),
            self.config.presentation.requests_per_minute,
            self.config.retry.clone(),
        );

        let runtime = Self::runtime()?;
        let summary = runtime.block_on(async {
            let target_id = match &self.config.presentation.destination_folder_id {
                Some(folder) if !folder.is_empty() => {
                    let name = self.config.presentation.copy_name.clone().unwrap_or_else(|| {
                        format!("slidesmith {}", chrono::Utc::now().format("%Y-%m-%d %H:%M"))
                    });
                    orchestrator.copy_template(&template_id, folder, &name).await?
                }
                _ => template_id.clone(),
            };
            orchestrator.run(&target_id, &document, &options).await
        })?;

        if args.format == "json" {
            format_run_summary_json(&summary)
        } else {
            Ok(format_run_summary_text(&summary))
        }
    }

    fn handle_validate(&self, input: Option<&Path>, format: &str) -> Result<String, ApiError> {
        let input = self.input_path(input);
        let document = SlideContentDocument::load(&input)?;
        let stats = document.stats();
        let input_display = input.display().to_string();
        if format == "json" {
            format_document_stats_json(&input_display, &stats)
        } else {
            Ok(format_document_stats_text(&input_display, &stats))
        }
    }

    fn handle_setup_storage(
        &self,
        bucket: Option<&str>,
        region: Option<&str>,
    ) -> Result<String, ApiError> {
        let credentials = self.credentials()?;
        let storage = self.storage(&credentials, bucket)?;
        let region = region.unwrap_or(&self.config.storage.region);
        let project_id = self.config.storage.project_id.as_deref();
        let setup = Self::runtime()?.block_on(storage.ensure_bucket(project_id, region))?;
        Ok(format_bucket_setup(&setup))
    }

    fn handle_delete_image(&self, url: &str) -> Result<String, ApiError> {
        let credentials = self.credentials()?;
        let storage = self.storage(&credentials, None)?;
        let public_prefix = storage.public_url("");
        if !url.starts_with(&public_prefix) {
            return Err(ApiError::InvalidArgument(format!(
                "{} is not an image in bucket {}",
                url,
                storage.bucket()
            )));
        }
        let key = url[public_prefix.len()..].to_string();
        Self::runtime()?.block_on(storage.delete_object(&key))?;
        Ok(format!("Deleted {}", url))
    }
}
