//! CLI parse: clap types for slidesmith. No behavior; definitions only.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// slidesmith - populate slide-deck templates from a JSON content document
#[derive(Parser)]
#[command(name = "slidesmith")]
#[command(about = "Populate a presentation template with text and generated images")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Workspace root directory
    #[arg(long, global = true, default_value = ".")]
    pub workspace: PathBuf,

    /// Configuration file path (overrides default config loading)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging (debug level)
    #[arg(long, global = true, default_value = "false")]
    pub verbose: bool,

    /// Only log errors
    #[arg(long, global = true, default_value = "false", conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long, global = true)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file)
    #[arg(long, global = true)]
    pub log_output: Option<String>,

    /// Log file path (if output is "file")
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create slides, update text and replace images in the presentation
    Run(RunArgs),
    /// Check the content document without contacting any service
    Validate {
        /// Content document (defaults to presentation.input_file)
        #[arg(long)]
        input: Option<PathBuf>,
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Create the image bucket if needed and make it publicly readable
    SetupStorage {
        /// Bucket name (defaults to storage.bucket)
        #[arg(long)]
        bucket: Option<String>,
        /// Bucket location (defaults to storage.region)
        #[arg(long)]
        region: Option<String>,
    },
    /// Delete a previously generated image from storage
    DeleteImage {
        /// Public URL returned when the image was generated
        url: String,
    },
}

#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// Content document (defaults to presentation.input_file)
    #[arg(long)]
    pub input: Option<PathBuf>,

    /// Presentation ID (defaults to presentation.presentation_id)
    #[arg(long)]
    pub presentation: Option<String>,

    /// Only process these slide numbers
    #[arg(long, num_args = 1.., value_delimiter = ',')]
    pub slides: Vec<u32>,

    /// Only update text on existing slides
    #[arg(long, conflicts_with = "images_only")]
    pub text_only: bool,

    /// Only replace images on existing slides
    #[arg(long)]
    pub images_only: bool,

    /// Output format (text or json)
    #[arg(long, default_value = "text")]
    pub format: String,
}
