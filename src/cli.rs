//! CLI domain: parse, route, help, output, and presentation only.
//! No domain orchestration; single route table dispatches to domain services.

mod help;
mod output;
mod parse;
mod presentation;
mod route;

pub use help::command_name;
pub use output::map_error;
pub use parse::{Cli, Commands, RunArgs};
pub use presentation::{
    format_bucket_setup, format_document_stats_json, format_document_stats_text,
    format_run_summary_json, format_run_summary_text,
};
pub use route::RunContext;
