// src/report.rs - Human-readable summary of a run

use crate::pipeline::context::Metadata;
use std::fmt::Write;
use terminal_size::{terminal_size, Width};

/// Errors listed before the rest are summarized
pub const MAX_ERRORS: usize = 10;

const MIN_WIDTH: usize = 40;

/// Terminal width, or 80 when not attached to a terminal
pub fn terminal_width() -> usize {
    if let Some((Width(w), _)) = terminal_size() {
        w as usize
    } else {
        80
    }
}

/// Cut `text` to at most `width` characters, marking the cut with "..."
fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    if width < 3 {
        return text.chars().take(width).collect();
    }
    let keep = width.saturating_sub(3);
    let mut cut: String = text.chars().take(keep).collect();
    cut.push_str("...");
    cut
}

/// Render `metadata` within `width` columns. The canonical metadata is never
/// touched; truncation happens on a copy.
pub fn render(metadata: &Metadata, width: usize) -> String {
    let width = width.max(MIN_WIDTH);
    let mut view = metadata.clone();
    let omitted = view.errors.len().saturating_sub(MAX_ERRORS);
    view.errors.truncate(MAX_ERRORS);

    let rule = "-".repeat(width);
    let mut out = String::new();

    let _ = writeln!(out, "{}", rule);
    if !view.source.is_empty() {
        let _ = writeln!(out, "{}", truncate(&format!("Source:     {}", view.source), width));
    }
    if !view.zip_entries.is_empty() {
        let entries = view.zip_entries.join(", ");
        let _ = writeln!(out, "{}", truncate(&format!("ZipEntries: {}", entries), width));
    }
    let counters = [
        ("Total", view.total),
        ("Matched", view.matched),
        ("Unmatched", view.unmatched),
        ("Excluded", view.excluded),
        ("Skipped", view.skipped),
    ];
    for (name, value) in counters {
        let _ = writeln!(out, "{:<11} {}", format!("{}:", name), value);
    }
    let _ = writeln!(
        out,
        "{:<11} {}",
        "Elapsed:",
        humantime::format_duration(view.elapsed)
    );

    if !view.errors.is_empty() {
        let _ = writeln!(out, "{}", rule);
        let _ = writeln!(out, "Errors:");
        for error in &view.errors {
            let location = if error.entry.is_empty() {
                format!("  {:>6}", error.line_number)
            } else {
                format!("  {}:{}", error.entry, error.line_number)
            };
            let location = truncate(&location, width);
            let room = width.saturating_sub(location.chars().count() + 2);
            if room == 0 {
                let _ = writeln!(out, "{}", location);
            } else {
                let _ = writeln!(out, "{}  {}", location, truncate(&error.line, room));
            }
        }
        if omitted > 0 {
            let _ = writeln!(out, "  ... {} more errors omitted", omitted);
        }
    }
    let _ = writeln!(out, "{}", rule);
    out
}
