//! Config loader: builds the layered source stack and deserializes it.

use super::merge::merge_policy;
use super::sources::{environment, global_file, workspace_file};
use super::SlidesmithConfig;
use crate::error::ApiError;
use config::File;
use std::path::Path;
use tracing::debug;

pub struct ConfigLoader;

impl ConfigLoader {
    /// Defaults, global file, workspace files, then environment.
    pub fn load(workspace_root: &Path) -> Result<SlidesmithConfig, ApiError> {
        Self::load_with_override(workspace_root, None)
    }

    /// Like [`ConfigLoader::load`], except that an explicit file replaces
    /// file discovery and takes precedence over the environment.
    pub fn load_with_override(
        workspace_root: &Path,
        config_file: Option<&Path>,
    ) -> Result<SlidesmithConfig, ApiError> {
        let mut builder = merge_policy::builder_with_defaults()?;

        if let Some(path) = config_file {
            if !path.exists() {
                return Err(ApiError::ConfigError(format!(
                    "Config file not found: {}",
                    path.display()
                )));
            }
        } else {
            builder = global_file::add_to_builder(builder)?;
            builder = workspace_file::add_to_builder(builder, workspace_root)?;
        }

        builder = environment::add_to_builder(builder);

        if let Some(path) = config_file {
            debug!(config_path = %path.display(), "Using explicit configuration file");
            builder = builder.add_source(File::from(path.to_path_buf()).required(true));
        }

        let config: SlidesmithConfig = builder.build()?.try_deserialize()?;
        Ok(config)
    }
}
