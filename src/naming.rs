//! Canonical output filenames.
//!
//! Every rendered wallpaper is stored as `<sanitized title>.jpg`. The
//! sanitized title is the join key between the records of the current run
//! and the files already sitting in the output directory, so the mapping
//! must be pure and stable across runs.
//!
//! ## Rules
//!
//! - Only ASCII `[A-Za-z0-9._-]` survives; every other character (spaces,
//!   punctuation, path separators, any non-ASCII letter) becomes one `_`.
//! - A leading `.` becomes `_`, so no output is hidden and `.`/`..` cannot
//!   appear as a whole name.
//! - The empty title maps to `_`.
//!
//! ```text
//! "Example: Movie!"   → "Example__Movie_"
//! "../etc/passwd"     → "_._etc_passwd"
//! "Amélie"            → "Am_lie"
//! ```

/// Extension used for every rendered wallpaper.
pub const OUTPUT_EXTENSION: &str = "jpg";

fn is_allowed(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-')
}

/// Replace every character outside `[A-Za-z0-9._-]` with `_`.
///
/// Idempotent: `sanitize(&sanitize(x)) == sanitize(x)`.
pub fn sanitize(title: &str) -> String {
    let mut out: String = title
        .chars()
        .map(|c| if is_allowed(c) { c } else { '_' })
        .collect();

    if out.starts_with('.') {
        out.replace_range(..1, "_");
    }
    if out.is_empty() {
        out.push('_');
    }
    out
}

/// Output filename for a title, e.g. `Example__Movie_.jpg`.
pub fn canonical_filename(title: &str) -> String {
    format!("{}.{}", sanitize(title), OUTPUT_EXTENSION)
}
