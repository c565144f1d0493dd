//! Output formatting for CLI commands.
//!
//! Human-readable summaries for the terminal; `--json` bypasses these and
//! prints the tagged tool outcome instead.

use prometheus_pdf::operations::{InfoReport, RangeReport, SplitReport, TextExtractionReport};
use serde::Serialize;
use std::path::Path;

/// Split chunks listed before the rest are summarized
const SPLIT_ROWS: usize = 10;
/// Text chunks previewed in the extraction summary
const PREVIEW_ROWS: usize = 5;
/// Maximum characters shown per chunk preview
const PREVIEW_MAX_LEN: usize = 100;

/// Formats any serializable value as pretty JSON.
pub fn format_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string())
}

fn file_name(path: &str) -> String {
    Path::new(path)
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.to_string())
}

/// Cuts text to `max_len` characters on one line, marking truncation.
fn preview(text: &str, max_len: usize) -> String {
    let flat = text.replace('\n', " ");
    if flat.chars().count() <= max_len {
        return flat;
    }
    let cut: String = flat.chars().take(max_len).collect();
    format!("{}...", cut)
}

/// Groups digits in thousands: 12345 -> "12,345".
fn thousands(n: usize) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

fn row(output: &mut String, label: &str, value: impl std::fmt::Display) {
    output.push_str(&format!("  {:<18} {}\n", label, value));
}

pub fn format_info(pdf_path: &str, report: &InfoReport) -> String {
    let info = &report.pdf_info;
    let estimates = &report.processing_estimates;
    let mut output = String::from("PDF Information\n");

    row(&mut output, "File", file_name(pdf_path));
    row(&mut output, "Total Pages", info.total_pages);
    row(&mut output, "File Size", format!("{} MB", info.file_size_mb));
    row(
        &mut output,
        "Has Bookmarks",
        if info.has_bookmarks { "Yes" } else { "No" },
    );
    if let Some(title) = &info.title {
        row(&mut output, "Title", title);
    }
    if let Some(creator) = &info.creator {
        row(&mut output, "Creator", creator);
    }
    row(
        &mut output,
        "Estimated Tokens",
        thousands(info.estimated_total_tokens as usize),
    );

    output.push_str("\nProcessing Estimates\n");
    let chunks = &estimates.estimated_chunks;
    for (label, count) in [
        ("5 pages", chunks.five_pages),
        ("10 pages", chunks.ten_pages),
        ("20 pages", chunks.twenty_pages),
        ("50 pages", chunks.fifty_pages),
    ] {
        row(&mut output, label, format!("{} chunks", count));
    }
    row(
        &mut output,
        "Recommended",
        format!("{} pages per chunk", estimates.recommended_chunk_size),
    );
    row(
        &mut output,
        "Complexity",
        format!("{:?}", estimates.complexity_level).to_lowercase(),
    );
    row(
        &mut output,
        "Estimated Time",
        format!("~{} min", estimates.processing_time_estimate_minutes),
    );

    output
}

pub fn format_split(report: &SplitReport) -> String {
    let mut output = format!("✓ {}\n\n", report.message);
    row(&mut output, "Source", file_name(&report.source_pdf));
    row(&mut output, "Output", &report.output_directory);
    row(&mut output, "Chunks", report.chunks_created);

    if !report.chunks.is_empty() {
        output.push_str("\nCreated Chunks\n");
        for chunk in report.chunks.iter().take(SPLIT_ROWS) {
            output.push_str(&format!(
                "  {:>3}  {:<11} {}\n",
                chunk.chunk_id,
                chunk.pages,
                file_name(&chunk.file_path)
            ));
        }
        if report.chunks.len() > SPLIT_ROWS {
            output.push_str(&format!(
                "  ...  and {} more\n",
                report.chunks.len() - SPLIT_ROWS
            ));
        }
    }

    output
}

pub fn format_extraction(report: &TextExtractionReport) -> String {
    let mut output = String::from("✓ Text extracted successfully\n\n");
    row(&mut output, "Source", &report.source_pdf);
    row(&mut output, "Pages", report.total_pages);
    row(&mut output, "Chunks", report.chunks_created);
    row(&mut output, "Total Tokens", thousands(report.total_tokens));
    row(
        &mut output,
        "Avg Tokens/Chunk",
        thousands(report.avg_tokens_per_chunk),
    );

    if !report.chunks.is_empty() {
        output.push_str("\nText Chunks\n");
        for chunk in report.chunks.iter().take(PREVIEW_ROWS) {
            output.push_str(&format!(
                "  {:>3}  {:<11} {:>8} tokens  {}\n",
                chunk.id,
                chunk.page_range.to_string(),
                thousands(chunk.token_count),
                preview(&chunk.text, PREVIEW_MAX_LEN)
            ));
        }
        if report.chunks.len() > PREVIEW_ROWS {
            output.push_str(&format!(
                "  ...  and {} more chunks\n",
                report.chunks.len() - PREVIEW_ROWS
            ));
        }
    }

    output
}

pub fn format_range(report: &RangeReport) -> String {
    let mut output = String::from("✓ Pages extracted successfully\n\n");
    row(&mut output, "Source", file_name(&report.source_pdf));
    row(
        &mut output,
        "Pages",
        format!("{} ({} pages)", report.extracted_pages, report.page_count),
    );
    row(&mut output, "Output", &report.output_file);
    output
}
