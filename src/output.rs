//! CLI output formatting for all pipeline stages.
//!
//! Output is **device-centric, not file-centric**: every device page line
//! leads with its catalog position and name, with the page path after an
//! arrow. Paths on disk appear only as indented context.
//!
//! # Output Format
//!
//! ## Publish
//!
//! ```text
//! Published 12 files, 3 directories → gh-pages
//!     Skipped: /home/me/webapp/gh-pages
//! ```
//!
//! ## Build
//!
//! ```text
//! Catalog: devices.json (4 devices)
//! 001 Lamp1 → devices/Lamp1.html (1 similar)
//! 002 Lamp2 → devices/Lamp2.html (1 similar)
//! 003 Smart Plug (EU) → devices/Smart_Plug_EU.html
//! Sitemap: gh-pages/sitemap.xml (5 entries)
//!
//! Generated 4 device pages, 2 with similar devices, 5 sitemap entries
//! ```
//!
//! ## Check
//!
//! ```text
//! Catalog: devices.json (4 devices, 1 without pins)
//! 001 Lamp1 → devices/Lamp1.html
//!     Similar: Lamp2 (100.0%)
//! ```
//!
//! # Architecture
//!
//! Each stage has a `format_*` function (returns `Vec<String>`) for testability
//! and a `print_*` wrapper that writes to stdout. Format functions are pure:
//! no I/O, no side effects.

use crate::publish::MirrorReport;
use crate::render::format_percent;
use crate::site::{BuildEvent, BuildReport, CheckReport, Collision};
use std::path::Path;

// ============================================================================
// Shared display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn plural(n: usize, one: &str, many: &str) -> String {
    if n == 1 {
        format!("{n} {one}")
    } else {
        format!("{n} {many}")
    }
}

/// ```text
/// Warning: devices/Plug.html written by devices 001, 003 (last one wins)
/// ```
fn collision_line(collision: &Collision) -> String {
    let positions: Vec<String> = collision.positions.iter().map(|p| format_index(*p)).collect();
    format!(
        "Warning: {} written by devices {} (last one wins)",
        collision.path,
        positions.join(", ")
    )
}

// ============================================================================
// Publish
// ============================================================================

pub fn format_publish_output(mirror: &MirrorReport, output: &Path) -> Vec<String> {
    let mut lines = vec![format!(
        "Published {}, {} \u{2192} {}",
        plural(mirror.files, "file", "files"),
        plural(mirror.directories, "directory", "directories"),
        output.display()
    )];
    for skipped in &mirror.skipped {
        lines.push(format!("{}Skipped: {}", indent(1), skipped.display()));
    }
    lines
}

pub fn print_publish_output(mirror: &MirrorReport, output: &Path) {
    for line in format_publish_output(mirror, output) {
        println!("{}", line);
    }
}

// ============================================================================
// Build
// ============================================================================

/// Format a single build progress event as display lines.
pub fn format_build_event(event: &BuildEvent) -> Vec<String> {
    match event {
        BuildEvent::Published { output, mirror } => format_publish_output(mirror, output),
        BuildEvent::CatalogMissing { path } => {
            vec![format!(
                "Catalog: {} not found, no device pages generated",
                path.display()
            )]
        }
        BuildEvent::CatalogLoaded { path, devices } => {
            vec![format!(
                "Catalog: {} ({})",
                path.display(),
                plural(*devices, "device", "devices")
            )]
        }
        BuildEvent::PageWritten {
            position,
            title,
            path,
            similar,
        } => {
            let detail = if *similar > 0 {
                format!(" ({similar} similar)")
            } else {
                String::new()
            };
            vec![format!(
                "{} {} \u{2192} {}{}",
                format_index(*position),
                title,
                path,
                detail
            )]
        }
        BuildEvent::SitemapWritten { path, entries } => {
            vec![format!(
                "Sitemap: {} ({})",
                path.display(),
                plural(*entries, "entry", "entries")
            )]
        }
    }
}

/// Summary printed after all events: collisions, then totals.
pub fn format_build_summary(report: &BuildReport) -> Vec<String> {
    if !report.catalog_found {
        return Vec::new();
    }
    let mut lines = Vec::new();
    lines.push(String::new());
    for collision in &report.collisions {
        lines.push(collision_line(collision));
    }
    lines.push(format!(
        "Generated {}, {} with similar devices, {}",
        plural(report.device_pages(), "device page", "device pages"),
        report.with_similar,
        plural(report.sitemap_paths.len(), "sitemap entry", "sitemap entries")
    ));
    lines
}

pub fn print_build_summary(report: &BuildReport) {
    for line in format_build_summary(report) {
        println!("{}", line);
    }
}

// ============================================================================
// Check
// ============================================================================

/// Format a dry-run report: every planned page with its similar devices.
pub fn format_check_output(report: &CheckReport) -> Vec<String> {
    let Some(pages) = &report.pages else {
        return vec![format!(
            "Catalog: {} not found, nothing to generate",
            report.catalog_path.display()
        )];
    };

    let mut lines = vec![format!(
        "Catalog: {} ({}, {} without pins)",
        report.catalog_path.display(),
        plural(pages.len(), "device", "devices"),
        report.without_pins
    )];
    for (i, page) in pages.iter().enumerate() {
        lines.push(format!(
            "{} {} \u{2192} {}",
            format_index(i + 1),
            page.identifier,
            page.path
        ));
        for peer in &page.similar {
            lines.push(format!(
                "{}Similar: {} ({}%)",
                indent(1),
                peer.name.as_deref().unwrap_or(&peer.token),
                format_percent(peer.ratio)
            ));
        }
    }
    if !report.collisions.is_empty() {
        lines.push(String::new());
        for collision in &report.collisions {
            lines.push(collision_line(collision));
        }
    }
    lines
}

pub fn print_check_output(report: &CheckReport) {
    for line in format_check_output(report) {
        println!("{}", line);
    }
}
