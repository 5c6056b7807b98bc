//! CLI output formatting.
//!
//! # Information-First Display
//!
//! The primary display for every file is the title it shows, with the
//! filename as secondary context. Deletions have no title, so the filename
//! is their identity.
//!
//! # Output Format
//!
//! ## Sync
//!
//! ```text
//! Source: tmdb → wallpapers/
//! + Dune: Part Two
//!     Dune__Part_Two.jpg
//! = The Matrix
//!     The_Matrix.jpg
//! ! Broken Title
//!     Broken_Title.jpg: backdrop is not a decodable image: ...
//! ~ No Art Film (no backdrop)
//! - (Old_Show.jpg)
//!
//! Rendered 1, skipped 1, deleted 1, failed 1, no backdrop 1
//! Sink: ok
//! ```
//!
//! | Marker | Meaning |
//! |---|---|
//! | `+` | rendered |
//! | `=` | already present |
//! | `-` | deleted |
//! | `!` | failed |
//! | `~` | not rendered (no backdrop, duplicate name) |
//!
//! ## Check
//!
//! ```text
//! Config: trendwall.toml
//! Output: wallpapers/
//! Source: tmdb (movies, series)
//!     window week, 1 page(s), language en-US, token from $TMDB_TOKEN
//! Layout
//!     movie: trending (3840×1500)
//!     series: trending (3840×1500)
//!     assets: synthesized
//!     quality: 90
//! Font: https://github.com/.../Roboto-Light.ttf
//!     cache: .cache/fonts
//! Sink: none
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.

use crate::config::{Config, SourceKind};
use crate::pipeline::{SinkStatus, SyncSummary};
use crate::reconcile::{Outcome, OutcomeKind, ReconcileReport};
use crate::types::MediaKind;
use std::path::Path;

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Header line for one outcome: marker plus title, or the filename in
/// parens when there is no title.
fn outcome_header(outcome: &Outcome) -> String {
    let marker = match outcome.kind {
        OutcomeKind::Rendered => '+',
        OutcomeKind::Skipped => '=',
        OutcomeKind::Deleted => '-',
        OutcomeKind::Failed(_) | OutcomeKind::DeleteFailed(_) => '!',
        OutcomeKind::NoBackdrop | OutcomeKind::Duplicate => '~',
    };
    let name = match &outcome.title {
        Some(t) => t.clone(),
        None => format!("({})", outcome.filename),
    };
    match outcome.kind {
        OutcomeKind::NoBackdrop => format!("{marker} {name} (no backdrop)"),
        OutcomeKind::Duplicate => format!("{marker} {name} (same file as an earlier title)"),
        _ => format!("{marker} {name}"),
    }
}

/// Context line under an outcome header, if any.
fn outcome_detail(outcome: &Outcome) -> Option<String> {
    match &outcome.kind {
        OutcomeKind::Rendered | OutcomeKind::Skipped => {
            Some(format!("{}{}", indent(1), outcome.filename))
        }
        OutcomeKind::Failed(why) | OutcomeKind::DeleteFailed(why) => {
            Some(format!("{}{}: {}", indent(1), outcome.filename, why))
        }
        OutcomeKind::Duplicate => Some(format!("{}{}", indent(1), outcome.filename)),
        OutcomeKind::NoBackdrop | OutcomeKind::Deleted => None,
    }
}

/// Totals line for a reconcile pass.
pub fn format_totals(report: &ReconcileReport) -> String {
    let mut line = format!(
        "Rendered {}, skipped {}, deleted {}",
        report.rendered, report.skipped, report.deleted
    );
    let failed = report.failed();
    if failed > 0 {
        line.push_str(&format!(", failed {failed}"));
    }
    let no_backdrop = report.no_backdrop();
    if no_backdrop > 0 {
        line.push_str(&format!(", no backdrop {no_backdrop}"));
    }
    line
}

/// Per-file lines for a reconcile pass.
pub fn format_report(report: &ReconcileReport) -> Vec<String> {
    let mut lines = Vec::new();
    for outcome in &report.outcomes {
        lines.push(outcome_header(outcome));
        lines.extend(outcome_detail(outcome));
    }
    lines
}

fn display_dir(dir: &Path) -> String {
    let shown = dir.display().to_string();
    if shown.ends_with('/') {
        shown
    } else {
        format!("{shown}/")
    }
}

pub fn format_sync_summary(summary: &SyncSummary) -> Vec<String> {
    let mut lines = vec![format!(
        "Source: {} → {}",
        summary.source,
        display_dir(&summary.output_dir)
    )];
    lines.extend(format_report(&summary.report));
    lines.push(String::new());
    lines.push(format_totals(&summary.report));
    match &summary.sink {
        SinkStatus::NotConfigured => {}
        SinkStatus::Ok => lines.push("Sink: ok".to_string()),
        SinkStatus::Failed(why) => lines.push(format!("Sink: failed ({why})")),
    }
    lines
}

pub fn print_sync_summary(summary: &SyncSummary) {
    for line in format_sync_summary(summary) {
        println!("{}", line);
    }
}

pub fn format_config(config: &Config, path: &Path, found: bool) -> Vec<String> {
    let mut lines = Vec::new();
    if found {
        lines.push(format!("Config: {}", path.display()));
    } else {
        lines.push(format!("Config: {} (not found, stock defaults)", path.display()));
    }
    lines.push(format!("Output: {}", display_dir(&config.output_dir)));

    let kinds: Vec<&str> = config
        .kinds()
        .into_iter()
        .map(|k| match k {
            MediaKind::Movie => "movies",
            MediaKind::Series => "series",
        })
        .collect();
    match config.source.kind {
        SourceKind::Tmdb => {
            lines.push(format!("Source: tmdb ({})", kinds.join(", ")));
            lines.push(format!(
                "{}window {}, {} page(s), language {}, token from ${}",
                indent(1),
                config.tmdb.window,
                config.tmdb.pages,
                config.tmdb.language,
                config.tmdb.token_env
            ));
        }
        SourceKind::Plex => {
            lines.push(format!("Source: plex ({})", kinds.join(", ")));
            lines.push(format!(
                "{}{}, newest {} by {}, token from ${}",
                indent(1),
                config.plex.base_url,
                config.plex.limit,
                config.plex.order_by,
                config.plex.token_env
            ));
        }
    }

    lines.push("Layout".to_string());
    for kind in [MediaKind::Movie, MediaKind::Series] {
        let layout = config.layout_for(kind);
        lines.push(format!(
            "{}{}: {} ({}×{})",
            indent(1),
            kind,
            layout.preset,
            layout.canvas.0,
            layout.canvas.1
        ));
    }
    lines.push(match &config.layout.assets_dir {
        Some(dir) => format!("{}assets: {}", indent(1), display_dir(dir)),
        None => format!("{}assets: synthesized", indent(1)),
    });
    if let Some(caption) = &config.layout.caption {
        lines.push(format!("{}caption: {}", indent(1), caption));
    }
    lines.push(format!("{}quality: {}", indent(1), config.layout.jpeg_quality));

    match &config.font.path {
        Some(path) => lines.push(format!("Font: {}", path.display())),
        None => {
            lines.push(format!("Font: {}", config.font.url));
            lines.push(format!("{}cache: {}", indent(1), config.font.cache_dir.display()));
        }
    }

    lines.push(match &config.sink.command {
        Some(argv) => format!("Sink: {}", argv.join(" ")),
        None => "Sink: none".to_string(),
    });
    lines
}

pub fn print_config(config: &Config, path: &Path, found: bool) {
    for line in format_config(config, path, found) {
        println!("{}", line);
    }
}
