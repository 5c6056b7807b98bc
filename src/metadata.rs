//! Display text resolution for a media record.
//!
//! Turns the raw fields of a [`MediaRecord`] into the four strings the
//! layout engine paints: title, overview lines, metadata line and caption.
//! Everything here is pure string work, so layout decisions that depend on
//! text (truncation, wrapping, pluralization) are unit tested without fonts
//! or images.
//!
//! ## Metadata line
//!
//! ```text
//! Drama, Thriller • 2024 • 2h5min • TMDB 7.8      (movie)
//! Comedy • 2019 • 3 Seasons • 8.1                  (series, no rating label)
//! N/A • 2021 • N/A • 6.0                           (unknown genre and runtime)
//! ```
//!
//! Missing values render as `N/A` so the line keeps its four-field shape.
//!
//! ## Overview policies
//!
//! A layout picks exactly one [`OverviewPolicy`]:
//!
//! - **Truncate** cuts the text to a character budget (ellipsis included) and
//!   paints it on a single line.
//! - **Wrap** breaks the text on word boundaries into lines of a fixed
//!   character width and caps the number of lines, ending the last kept line
//!   with an ellipsis when text was dropped.

use crate::types::{MediaDetails, MediaRecord};
use serde::{Deserialize, Serialize};

/// Appended whenever text is shortened.
pub const ELLIPSIS: &str = "...";

/// Joins the fields of the metadata line.
pub const SEPARATOR: &str = " \u{2022} ";

/// Placeholder for unknown values.
pub const NOT_AVAILABLE: &str = "N/A";

/// How a layout fits a long overview into its text block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "lowercase")]
pub enum OverviewPolicy {
    /// Single line, at most `max_chars` characters including the ellipsis.
    Truncate { max_chars: usize },
    /// Word-wrapped to `width_chars`, at most `max_lines` lines.
    Wrap { width_chars: usize, max_lines: usize },
}

impl OverviewPolicy {
    pub fn apply(&self, text: &str) -> Vec<String> {
        let text = text.trim();
        if text.is_empty() {
            return Vec::new();
        }
        match *self {
            OverviewPolicy::Truncate { max_chars } => vec![truncate_chars(text, max_chars)],
            OverviewPolicy::Wrap {
                width_chars,
                max_lines,
            } => wrap_capped(text, width_chars, max_lines),
        }
    }
}

/// Text rules a layout applies before painting.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayRules {
    pub title_max_chars: Option<usize>,
    pub overview: OverviewPolicy,
    /// Prefix for the rating, e.g. `TMDB`.
    pub rating_label: Option<String>,
    pub caption: String,
}

/// The strings painted for one record.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayText {
    pub title: String,
    pub overview: Vec<String>,
    pub metadata: String,
    pub caption: String,
}

impl DisplayText {
    pub fn resolve(record: &MediaRecord, rules: &DisplayRules) -> Self {
        let title = match rules.title_max_chars {
            Some(max) => truncate_chars(record.title.trim(), max),
            None => record.title.trim().to_string(),
        };
        Self {
            title,
            overview: rules.overview.apply(&record.overview),
            metadata: metadata_line(record, rules.rating_label.as_deref()),
            caption: rules.caption.clone(),
        }
    }
}

/// Shorten `text` to at most `max_chars` characters, the last three being
/// [`ELLIPSIS`] when anything was cut. Counts characters, not bytes. A budget
/// too small for the ellipsis gets a plain cut.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    if max_chars < ELLIPSIS.len() {
        return text.chars().take(max_chars).collect();
    }
    let keep = max_chars - ELLIPSIS.len();
    let head: String = text.chars().take(keep).collect();
    format!("{}{}", head.trim_end(), ELLIPSIS)
}

/// Year component of a date string. Short or malformed dates are shown as
/// far as they go; an empty date is `N/A`.
pub fn year_text(date: &str) -> String {
    let year: String = date.trim().chars().take(4).collect();
    if year.is_empty() {
        NOT_AVAILABLE.to_string()
    } else {
        year
    }
}

/// `125` → `2h5min`, `45` → `45min`, `120` → `2h`.
pub fn duration_text(runtime_minutes: Option<u32>) -> String {
    match runtime_minutes {
        None | Some(0) => NOT_AVAILABLE.to_string(),
        Some(m) if m < 60 => format!("{m}min"),
        Some(m) if m % 60 == 0 => format!("{}h", m / 60),
        Some(m) => format!("{}h{}min", m / 60, m % 60),
    }
}

/// `1` → `1 Season`, `3` → `3 Seasons`.
pub fn seasons_text(season_count: Option<u32>) -> String {
    match season_count {
        None => NOT_AVAILABLE.to_string(),
        Some(1) => "1 Season".to_string(),
        Some(n) => format!("{n} Seasons"),
    }
}

pub fn rating_text(rating: f32, label: Option<&str>) -> String {
    match label {
        Some(label) if !label.is_empty() => format!("{label} {rating:.1}"),
        _ => format!("{rating:.1}"),
    }
}

fn genre_text(genres: &str) -> String {
    let genres = genres.trim();
    if genres.is_empty() {
        NOT_AVAILABLE.to_string()
    } else {
        genres.to_string()
    }
}

/// `genre • year • duration-or-seasons • rating`.
pub fn metadata_line(record: &MediaRecord, rating_label: Option<&str>) -> String {
    let extent = match record.details {
        MediaDetails::Movie { runtime_minutes } => duration_text(runtime_minutes),
        MediaDetails::Series { season_count } => seasons_text(season_count),
    };
    [
        genre_text(&record.genres),
        year_text(&record.date),
        extent,
        rating_text(record.rating, rating_label),
    ]
    .join(SEPARATOR)
}

/// Greedy word wrap to `width` characters per line. Words longer than a
/// line are split.
pub fn wrap_words(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for word in text.split_whitespace() {
        let mut chars: Vec<char> = word.chars().collect();

        while chars.len() > width {
            if current_len > 0 {
                lines.push(std::mem::take(&mut current));
                current_len = 0;
            }
            lines.push(chars.drain(..width).collect());
        }
        if chars.is_empty() {
            continue;
        }

        let word_len = chars.len();
        if current_len == 0 {
            current.extend(chars);
            current_len = word_len;
        } else if current_len + 1 + word_len <= width {
            current.push(' ');
            current.extend(chars);
            current_len += 1 + word_len;
        } else {
            lines.push(std::mem::replace(&mut current, chars.into_iter().collect()));
            current_len = word_len;
        }
    }
    if current_len > 0 {
        lines.push(current);
    }
    lines
}

fn wrap_capped(text: &str, width: usize, max_lines: usize) -> Vec<String> {
    let mut lines = wrap_words(text, width);
    if lines.len() <= max_lines {
        return lines;
    }
    lines.truncate(max_lines);
    if width < ELLIPSIS.len() {
        return lines;
    }

    if let Some(last) = lines.last_mut() {
        let mut shortened = last.clone();
        while !shortened.is_empty() && shortened.chars().count() + ELLIPSIS.len() > width {
            match shortened.rsplit_once(' ') {
                Some((head, _)) => shortened = head.to_string(),
                None => {
                    shortened.pop();
                }
            }
        }
        *last = format!("{}{}", shortened.trim_end(), ELLIPSIS);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    fn movie(runtime: Option<u32>) -> MediaRecord {
        MediaRecord {
            id: "m1".into(),
            title: "Example: Movie!".into(),
            overview: "A story.".into(),
            date: "2024-05-01".into(),
            rating: 7.8,
            genres: "Drama".into(),
            details: MediaDetails::Movie {
                runtime_minutes: runtime,
            },
            backdrop: None,
        }
    }

    fn series(seasons: Option<u32>) -> MediaRecord {
        MediaRecord {
            details: MediaDetails::Series {
                season_count: seasons,
            },
            ..movie(None)
        }
    }

    fn lorem(len: usize) -> String {
        "lorem ipsum dolor sit amet consectetur "
            .chars()
            .cycle()
            .take(len)
            .collect()
    }

    // =========================================================================
    // Field formatting
    // =========================================================================

    #[test]
    fn duration_formats() {
        assert_eq!(duration_text(Some(125)), "2h5min");
        assert_eq!(duration_text(Some(95)), "1h35min");
        assert_eq!(duration_text(Some(45)), "45min");
        assert_eq!(duration_text(Some(120)), "2h");
        assert_eq!(duration_text(None), "N/A");
    }

    #[test]
    fn seasons_pluralize() {
        assert_eq!(seasons_text(Some(1)), "1 Season");
        assert_eq!(seasons_text(Some(3)), "3 Seasons");
        assert_eq!(seasons_text(None), "N/A");
    }

    #[test]
    fn year_is_first_four_chars() {
        assert_eq!(year_text("2024-05-01"), "2024");
        assert_eq!(year_text("1999"), "1999");
    }

    #[test]
    fn year_fails_soft_on_short_dates() {
        assert_eq!(year_text("20"), "20");
        assert_eq!(year_text(""), "N/A");
    }

    #[test]
    fn rating_has_one_decimal() {
        assert_eq!(rating_text(7.0, None), "7.0");
        assert_eq!(rating_text(7.84, Some("TMDB")), "TMDB 7.8");
    }

    // =========================================================================
    // Metadata line shape
    // =========================================================================

    #[test]
    fn movie_line_contains_duration() {
        let line = metadata_line(&movie(Some(125)), None);
        assert!(line.contains("2h5min"), "{line}");
        assert_eq!(line, "Drama \u{2022} 2024 \u{2022} 2h5min \u{2022} 7.8");
    }

    #[test]
    fn series_line_contains_season_count() {
        assert!(metadata_line(&series(Some(1)), None).contains("1 Season"));
        assert!(!metadata_line(&series(Some(1)), None).contains("1 Seasons"));
        assert!(metadata_line(&series(Some(3)), None).contains("3 Seasons"));
    }

    #[test]
    fn missing_fields_keep_four_part_shape() {
        let mut record = movie(None);
        record.genres = String::new();
        let line = metadata_line(&record, Some("TMDB"));
        assert_eq!(line.split(SEPARATOR).count(), 4);
        assert_eq!(line, "N/A \u{2022} 2024 \u{2022} N/A \u{2022} TMDB 7.8");
    }

    // =========================================================================
    // Truncation
    // =========================================================================

    #[test]
    fn truncate_keeps_short_text() {
        assert_eq!(truncate_chars("short", 130), "short");
    }

    #[test]
    fn truncate_long_overview_to_budget() {
        let out = truncate_chars(&lorem(500), 130);
        let body = out.strip_suffix(ELLIPSIS).expect("ellipsis");
        assert!(body.chars().count() <= 130);
        assert!(out.chars().count() <= 130);
    }

    #[test]
    fn truncate_counts_chars_not_bytes() {
        let text = "é".repeat(20);
        let out = truncate_chars(&text, 10);
        assert_eq!(out, format!("{}...", "é".repeat(7)));
    }

    #[test]
    fn truncate_budget_below_ellipsis_is_plain_cut() {
        assert_eq!(truncate_chars("abcdef", 2), "ab");
        assert_eq!(truncate_chars("abcdef", 0), "");
        assert_eq!(truncate_chars("abcdef", 3), "...");
    }

    #[test]
    fn truncate_policy_is_single_line() {
        let lines = OverviewPolicy::Truncate { max_chars: 130 }.apply(&lorem(600));
        assert_eq!(lines.len(), 1);
    }

    // =========================================================================
    // Wrapping
    // =========================================================================

    #[test]
    fn wrap_breaks_on_words() {
        let lines = wrap_words("the quick brown fox jumps", 10);
        assert_eq!(lines, vec!["the quick", "brown fox", "jumps"]);
    }

    #[test]
    fn wrap_splits_overlong_words() {
        let lines = wrap_words("abcdefghijkl xy", 5);
        assert_eq!(lines, vec!["abcde", "fghij", "kl xy"]);
    }

    #[test]
    fn wrap_policy_caps_lines_with_ellipsis() {
        let policy = OverviewPolicy::Wrap {
            width_chars: 20,
            max_lines: 2,
        };
        let lines = policy.apply(&lorem(500));
        assert_eq!(lines.len(), 2);
        assert!(lines[1].ends_with(ELLIPSIS));
        for line in &lines {
            assert!(line.chars().count() <= 20, "{line:?} too long");
        }
    }

    #[test]
    fn wrap_policy_narrower_than_ellipsis_stays_in_width() {
        let policy = OverviewPolicy::Wrap {
            width_chars: 2,
            max_lines: 1,
        };
        assert_eq!(policy.apply("abc def ghi"), vec!["ab"]);
    }

    #[test]
    fn wrap_policy_leaves_fitting_text_alone() {
        let policy = OverviewPolicy::Wrap {
            width_chars: 40,
            max_lines: 2,
        };
        assert_eq!(policy.apply("A short overview."), vec!["A short overview."]);
    }

    #[test]
    fn empty_overview_has_no_lines() {
        let policy = OverviewPolicy::Truncate { max_chars: 130 };
        assert!(policy.apply("   ").is_empty());
    }

    // =========================================================================
    // DisplayText
    // =========================================================================

    #[test]
    fn resolve_caps_title_but_not_filename() {
        let mut record = series(Some(2));
        record.title = "An Extremely Long Series Title That Keeps Going On".into();
        let rules = DisplayRules {
            title_max_chars: Some(38),
            overview: OverviewPolicy::Truncate { max_chars: 130 },
            rating_label: None,
            caption: "Now Trending".into(),
        };
        let text = DisplayText::resolve(&record, &rules);
        assert!(text.title.chars().count() <= 38);
        assert!(text.title.ends_with(ELLIPSIS));
        assert_eq!(
            record.canonical_filename(),
            "An_Extremely_Long_Series_Title_That_Keeps_Going_On.jpg"
        );
        assert_eq!(text.caption, "Now Trending");
    }
}
