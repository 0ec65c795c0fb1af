//! CLI output: error mapping from domain errors to stable CLI surface.

use crate::error::{ApiError, ErrorClass};

/// Map domain/service errors to a single line for CLI output.
pub fn map_error(e: &ApiError) -> String {
    let prefix = match e.class() {
        ErrorClass::Setup => "setup failed",
        ErrorClass::Validation => "invalid input",
        ErrorClass::Provider => "service failed",
        ErrorClass::BatchSubmission => "batch failed",
    };
    let message = e.to_string().replace('\n', "; ");
    format!("error: {}: {}", prefix, message)
}
