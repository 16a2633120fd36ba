//! CLI output formatting.
//!
//! Output is post-centric: each post is shown by position and title, with
//! its slug and date as indented context lines.
//!
//! # Output Format
//!
//! ## List
//!
//! ```text
//! 001 On craft
//!     Slug: on-craft
//!     Date: March 1, 2024
//!     Description: What it means to care about the work...
//! 002 Shipping small
//!     Slug: shipping-small
//!     Date: February 1, 2024
//!
//! Not listed
//!     broken: failed to compile post 'broken': unknown component <Chart>
//! ```
//!
//! ## Check
//!
//! ```text
//! ok   hello-world  Hello, world
//! FAIL broken
//!     failed to compile post 'broken': unknown component <Chart>
//!
//! 3 posts, 1 failed
//! ```
//!
//! ## Build
//!
//! ```text
//! index.html
//! blog/index.html
//! blog/on-craft/index.html
//!
//! Skipped
//!     broken: failed to compile post 'broken': unknown component <Chart>
//!
//! Exported 3 pages, 2 assets
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout.

use crate::assemble::Listing;
use crate::cache::CompileOutcome;
use crate::error::PostError;
use crate::export::ExportReport;

const DESCRIPTION_WIDTH: usize = 60;

// ============================================================================
// Helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Truncate text to `max` characters, appending `...` if truncated.
fn truncate_desc(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((end, _)) => format!("{}...", &text[..end]),
        None => text.to_string(),
    }
}

fn failure_lines(heading: &str, failures: &[PostError]) -> Vec<String> {
    if failures.is_empty() {
        return Vec::new();
    }
    let mut lines = vec![String::new(), heading.to_string()];
    lines.extend(
        failures
            .iter()
            .map(|e| format!("{}{}: {}", indent(1), e.slug(), e)),
    );
    lines
}

fn plural(n: usize, word: &str) -> String {
    if n == 1 {
        format!("{n} {word}")
    } else {
        format!("{n} {word}s")
    }
}

// ============================================================================
// Commands
// ============================================================================

pub fn format_listing(listing: &Listing) -> Vec<String> {
    let mut lines = Vec::new();
    for (i, post) in listing.posts.iter().enumerate() {
        let metadata = &post.metadata;
        lines.push(format!("{} {}", format_index(i + 1), metadata.title));
        lines.push(format!("{}Slug: {}", indent(1), post.slug));
        lines.push(format!("{}Date: {}", indent(1), metadata.date));
        if let Some(desc) = &metadata.description {
            lines.push(format!(
                "{}Description: {}",
                indent(1),
                truncate_desc(desc, DESCRIPTION_WIDTH)
            ));
        }
    }
    if listing.posts.is_empty() {
        lines.push("No posts".to_string());
    }
    lines.extend(failure_lines("Not listed", &listing.failures));
    lines
}

pub fn print_listing(listing: &Listing) {
    for line in format_listing(listing) {
        println!("{}", line);
    }
}

/// One line per post in registry order, then a summary.
pub fn format_check(outcomes: &[CompileOutcome]) -> Vec<String> {
    let width = outcomes
        .iter()
        .map(|o| match o {
            Ok(post) => post.slug.len(),
            Err(e) => e.slug().len(),
        })
        .max()
        .unwrap_or(0);

    let mut lines = Vec::new();
    let mut failed = 0;
    for outcome in outcomes {
        match outcome {
            Ok(post) => lines.push(format!(
                "ok   {:<width$}  {}",
                post.slug, post.metadata.title
            )),
            Err(e) => {
                failed += 1;
                lines.push(format!("FAIL {}", e.slug()));
                lines.push(format!("{}{}", indent(1), e));
            }
        }
    }
    lines.push(String::new());
    lines.push(format!(
        "{}, {} failed",
        plural(outcomes.len(), "post"),
        failed
    ));
    lines
}

pub fn print_check(outcomes: &[CompileOutcome]) {
    for line in format_check(outcomes) {
        println!("{}", line);
    }
}

pub fn format_export(report: &ExportReport) -> Vec<String> {
    let mut lines: Vec<String> = report
        .pages
        .iter()
        .map(|p| p.display().to_string())
        .collect();
    lines.extend(failure_lines("Skipped", &report.failures));
    lines.push(String::new());
    lines.push(format!(
        "Exported {}, {}",
        plural(report.pages.len(), "page"),
        plural(report.assets, "asset")
    ));
    lines
}

pub fn print_export(report: &ExportReport) {
    for line in format_export(report) {
        println!("{}", line);
    }
}
