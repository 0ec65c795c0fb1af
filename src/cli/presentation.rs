//! CLI presentation: text and json formatters for run summaries, document
//! validation and storage setup.

use crate::document::DocumentStats;
use crate::error::ApiError;
use crate::executor::UpdateTally;
use crate::image::BucketSetup;
use crate::orchestrator::RunSummary;
use comfy_table::presets::UTF8_BORDERS_ONLY;
use comfy_table::Table;
use owo_colors::OwoColorize;
use serde_json::json;

fn format_section_heading(title: &str) -> String {
    format!("{}", title.bold().underline())
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, ApiError> {
    serde_json::to_string_pretty(value)
        .map_err(|e| ApiError::InvalidArgument(format!("Failed to render JSON: {}", e)))
}

fn status_marker(tally: &UpdateTally) -> String {
    if tally.skipped == 0 {
        format!("{}", "ok".green())
    } else if tally.updated == 0 {
        format!("{}", "failed".red())
    } else {
        format!("{}", "partial".yellow())
    }
}

pub fn format_run_summary_text(summary: &RunSummary) -> String {
    let mut out = String::new();
    out.push_str(&format!("{}\n\n", format_section_heading("Run Summary")));
    out.push_str(&format!("  Presentation: {}\n\n", summary.presentation_id));

    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["Category", "Updated", "Skipped", "Status"]);
    for (name, tally) in [
        ("Slides", &summary.slides),
        ("Text", &summary.text),
        ("Images", &summary.images),
    ] {
        table.add_row(vec![
            name.to_string(),
            tally.updated.to_string(),
            tally.skipped.to_string(),
            status_marker(tally),
        ]);
    }
    out.push_str(&format!("{}\n", table));

    if !summary.created_slides.is_empty() {
        out.push_str(&format!("\n{}\n\n", format_section_heading("Created slides")));
        let mut table = Table::new();
        table.load_preset(UTF8_BORDERS_ONLY);
        table.set_header(vec!["Slide", "Object ID"]);
        for (number, object_id) in &summary.created_slides {
            table.add_row(vec![number.to_string(), object_id.clone()]);
        }
        out.push_str(&format!("{}\n", table));
    }

    let skipped = summary.total_skipped();
    if skipped > 0 {
        out.push_str(&format!(
            "\n{} {} element(s) skipped; see the log for details.\n",
            "!".yellow(),
            skipped
        ));
    }
    out
}

pub fn format_run_summary_json(summary: &RunSummary) -> Result<String, ApiError> {
    to_json(summary)
}

pub fn format_document_stats_text(input: &str, stats: &DocumentStats) -> String {
    let mut out = String::new();
    out.push_str(&format!("{}\n\n", format_section_heading("Content Document")));
    out.push_str(&format!("  Input: {}\n", input));
    out.push_str(&format!(
        "  Slides: {} ({} new, {} existing)\n\n",
        stats.slides, stats.new_slides, stats.existing_slides
    ));

    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["Element", "Actionable", "Skipped"]);
    table.add_row(vec![
        "Text".to_string(),
        stats.actionable_text.to_string(),
        stats.skipped_text.to_string(),
    ]);
    table.add_row(vec![
        "Images".to_string(),
        stats.actionable_images.to_string(),
        stats.skipped_images.to_string(),
    ]);
    out.push_str(&format!("{}\n", table));

    if stats.has_work() {
        out.push_str(&format!("\n{} Document is ready.\n", "✓".green()));
    } else {
        out.push_str(&format!("\n{} Nothing in this document can be acted on.\n", "✗".red()));
    }
    out
}

pub fn format_document_stats_json(input: &str, stats: &DocumentStats) -> Result<String, ApiError> {
    to_json(&json!({
        "input": input,
        "ready": stats.has_work(),
        "stats": stats,
    }))
}

pub fn format_bucket_setup(setup: &BucketSetup) -> String {
    let created = if setup.created { "created" } else { "already existed" };
    let public = if setup.public_granted {
        "granted"
    } else {
        "already granted"
    };
    format!(
        "Bucket {}: {}\nPublic read access: {}\nImage URLs: {}<prefix>/<name>.png",
        setup.bucket, created, public, setup.base_url
    )
}
