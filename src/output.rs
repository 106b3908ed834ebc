//! CLI output formatting for all pipeline stages.
//!
//! # Information-First Display
//!
//! Every stage lists the entities it touched (posts, pages, batches) by their
//! identity first, with paths relative to the site root as secondary context.
//! Entity lines are numbered with a 1-based, zero-padded index so a long run
//! reads as an inventory.
//!
//! # Output Format
//!
//! ## Generate
//!
//! ```text
//! 001 demo → blog/demo.html (markdown)
//! 002 structured-guide → blog/structured-guide.html (structured)
//! 003 missing-post
//!     Skipped: no content file (missing-post.json, missing-post.html, missing-post.md)
//!
//! Generated 2 pages, skipped 1
//! URL log: blog-scripts/generated-urls.txt
//! ```
//!
//! ## Sitemap
//!
//! ```text
//! 001 https://www.example.com/ (1.0, weekly)
//! 002 https://www.example.com/blog/demo (0.8, monthly)
//!
//! Wrote sitemap.xml (2 URLs)
//! Wrote robots.txt
//! ```
//!
//! ## IndexNow
//!
//! ```text
//! Batch 1: 10000 URLs accepted (200)
//! Batch 2: 10000 URLs rate limited; wait and try again
//!
//! Submitted 10000 of 20000 URLs
//! ```
//!
//! ## Draft
//!
//! ```text
//! Model: haiku (claude-3-5-haiku-20241022)
//! 001 demo: skipped (content exists)
//! 002 missing-post → blog-scripts/content/missing-post.json
//!
//! Generated 1 | Skipped 1 | Errors 0
//! ```
//!
//! # Architecture
//!
//! Each stage has a `format_*` function (returns `Vec<String>`) for testability
//! and a `print_*` wrapper that writes to stdout. Format functions are pure:
//! no I/O, no side effects.

use crate::draft::{DraftOutcome, DraftReport};
use crate::generate::{GenerateReport, PageOutcome};
use crate::indexnow::{KeySetup, SubmitReport, SubmitStatus};
use crate::sitemap::SitemapReport;
use std::path::Path;

// ============================================================================
// Shared helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Path relative to the site root, with `/` separators.
fn relative(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .to_string_lossy()
        .replace('\\', "/")
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn plural(n: usize, one: &str, many: &str) -> String {
    if n == 1 {
        format!("{n} {one}")
    } else {
        format!("{n} {many}")
    }
}

fn print_lines(lines: Vec<String>) {
    for line in lines {
        println!("{}", line);
    }
}

// ============================================================================
// Generate
// ============================================================================

pub fn format_generate_output(report: &GenerateReport, root: &Path) -> Vec<String> {
    let mut lines = Vec::new();

    if let Some(template) = &report.seeded_ledger {
        lines.push(format!("Ledger seeded from {}", relative(root, template)));
    }

    for (i, outcome) in report.outcomes.iter().enumerate() {
        let index = format_index(i + 1);
        match outcome {
            PageOutcome::Generated {
                slug, path, format, ..
            } => {
                lines.push(format!(
                    "{index} {slug} \u{2192} {} ({format})",
                    relative(root, path)
                ));
            }
            PageOutcome::DryRun { slug, path } => {
                lines.push(format!(
                    "{index} {slug} \u{2192} {} (dry run)",
                    relative(root, path)
                ));
            }
            PageOutcome::Skipped { slug, expected } => {
                let tried: Vec<String> = expected.iter().map(|p| file_name(p)).collect();
                lines.push(format!("{index} {slug}"));
                lines.push(format!(
                    "{}Skipped: no content file ({})",
                    indent(1),
                    tried.join(", ")
                ));
            }
            PageOutcome::InvalidSlug { row, slug } => {
                lines.push(format!("{index} (row {row})"));
                lines.push(format!("{}Skipped: invalid slug {slug:?}", indent(1)));
            }
        }
    }

    if !lines.is_empty() {
        lines.push(String::new());
    }
    lines.push(format!(
        "Generated {}, skipped {}",
        plural(report.generated(), "page", "pages"),
        report.skipped()
    ));
    if let Some(log) = &report.urls_log {
        lines.push(format!("URL log: {}", relative(root, log)));
    }

    lines
}

pub fn print_generate_output(report: &GenerateReport, root: &Path) {
    print_lines(format_generate_output(report, root));
}

// ============================================================================
// Sitemap
// ============================================================================

pub fn format_sitemap_output(report: &SitemapReport, root: &Path) -> Vec<String> {
    let mut lines: Vec<String> = report
        .entries
        .iter()
        .enumerate()
        .map(|(i, e)| {
            format!(
                "{} {} ({:.1}, {})",
                format_index(i + 1),
                e.loc,
                e.priority,
                e.changefreq
            )
        })
        .collect();

    if !lines.is_empty() {
        lines.push(String::new());
    }
    lines.push(format!(
        "Wrote {} ({})",
        relative(root, &report.sitemap_path),
        plural(report.entries.len(), "URL", "URLs")
    ));
    lines.push(format!("Wrote {}", relative(root, &report.robots_path)));
    lines
}

pub fn print_sitemap_output(report: &SitemapReport, root: &Path) {
    print_lines(format_sitemap_output(report, root));
}

// ============================================================================
// IndexNow
// ============================================================================

pub fn format_setup_output(setup: &KeySetup, root: &Path) -> Vec<String> {
    vec![
        format!("Key: {}", setup.key),
        format!("{}Saved to: {}", indent(1), relative(root, &setup.key_file)),
        format!(
            "{}Verification file: {}",
            indent(1),
            relative(root, &setup.verification_file)
        ),
        String::new(),
        "Next steps:".to_string(),
        format!("{}1. Publish both files with the site", indent(1)),
        format!(
            "{}2. Check that {} is reachable",
            indent(1),
            setup.verification_url
        ),
        format!("{}3. Run `blogsmith indexnow --all`", indent(1)),
    ]
}

pub fn print_setup_output(setup: &KeySetup, root: &Path) {
    print_lines(format_setup_output(setup, root));
}

fn status_text(status: &SubmitStatus, key: &str) -> String {
    match status {
        SubmitStatus::Accepted(code) => format!("accepted ({code})"),
        SubmitStatus::BadRequest => "bad request; check the key and URL format".to_string(),
        SubmitStatus::KeyInvalid => format!("key not valid; make sure {key}.txt is accessible"),
        SubmitStatus::InvalidUrls => "invalid URLs in the batch".to_string(),
        SubmitStatus::RateLimited => "rate limited; wait and try again".to_string(),
        SubmitStatus::Unexpected(code) => format!("unexpected response ({code})"),
        SubmitStatus::Failed(msg) => format!("request failed: {msg}"),
    }
}

pub fn format_submit_output(report: &SubmitReport) -> Vec<String> {
    if report.total_urls == 0 {
        return vec!["No URLs to submit.".to_string()];
    }

    let mut lines: Vec<String> = report
        .batches
        .iter()
        .map(|b| {
            format!(
                "Batch {}: {} {}",
                b.index,
                plural(b.size, "URL", "URLs"),
                status_text(&b.status, &report.key)
            )
        })
        .collect();
    lines.push(String::new());
    lines.push(format!(
        "Submitted {} of {} URLs",
        report.accepted_urls(),
        report.total_urls
    ));
    lines
}

pub fn print_submit_output(report: &SubmitReport) {
    print_lines(format_submit_output(report));
}

// ============================================================================
// Draft
// ============================================================================

pub fn format_draft_output(report: &DraftReport, root: &Path) -> Vec<String> {
    let mut lines = vec![format!("Model: {} ({})", report.model_name, report.model_id)];

    for (i, outcome) in report.outcomes.iter().enumerate() {
        let index = format_index(i + 1);
        match outcome {
            DraftOutcome::Written { slug, path } => {
                lines.push(format!("{index} {slug} \u{2192} {}", relative(root, path)));
            }
            DraftOutcome::DryRun { slug, path } => {
                lines.push(format!(
                    "{index} {slug} \u{2192} {} (dry run)",
                    relative(root, path)
                ));
            }
            DraftOutcome::Skipped { slug } => {
                lines.push(format!("{index} {slug}: skipped (content exists)"));
            }
            DraftOutcome::InvalidSlug { row, slug } => {
                lines.push(format!("{index} (row {row})"));
                lines.push(format!("{}Skipped: invalid slug {slug:?}", indent(1)));
            }
            DraftOutcome::Failed { slug, error } => {
                lines.push(format!("{index} {slug}"));
                lines.push(format!("{}Error: {error}", indent(1)));
            }
        }
    }

    lines.push(String::new());
    lines.push(format!(
        "Generated {} | Skipped {} | Errors {}",
        report.generated(),
        report.skipped(),
        report.errors()
    ));
    lines
}

pub fn print_draft_output(report: &DraftReport, root: &Path) {
    print_lines(format_draft_output(report, root));
}

// ============================================================================
// Tests
// ============================================================================
