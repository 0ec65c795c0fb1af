//! Merge rules: defaults, override order, conflict handling.

use config::Config;
use config::ConfigBuilder;
use config::ConfigError;

/// Create a Config builder with merge policy defaults applied.
pub fn builder_with_defaults() -> Result<ConfigBuilder<config::builder::DefaultState>, ConfigError>
{
    Config::builder()
        .set_default("presentation.credentials_file", "credentials.json")?
        .set_default("presentation.requests_per_minute", 60)?
        .set_default("presentation.input_file", "slides.json")?
        .set_default("storage.region", "us-central1")?
        .set_default("storage.image_prefix", "slides")
}
