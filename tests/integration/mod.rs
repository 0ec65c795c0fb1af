//! Integration tests for slidesmith

mod binary;
mod config_loading;
mod image_http;
mod slides_http;
mod test_utils;

pub use test_utils::{with_isolated_env, write_file, SINGLE_SLIDE_DOCUMENT};
