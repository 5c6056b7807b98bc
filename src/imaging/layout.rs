//! Named layout presets.
//!
//! A [`Layout`] fixes everything about a wallpaper except the record being
//! shown: canvas size, where the backdrop, overlay and logo go, where each of
//! the four text blocks is painted, the drop shadow, and the text rules
//! (title cap, overview policy, caption).
//!
//! | Preset | Canvas | Backdrop | Overview |
//! |---|---|---|---|
//! | `trending` | 3840×1500 | 1500px tall at (1175, 0) | truncate to 130 chars, one line |
//! | `trending-wrapped` | 3840×1500 | 1500px tall at (1175, 0) | wrap at 70 chars, 2 lines |
//! | `library` | 1920×1080 | 1080px tall at (0, 0) | wrap at 80 chars, 2 lines |
//!
//! The two trending presets share the canvas and backdrop geometry but
//! differ in wrap policy and in logo/text offsets; they are kept as separate
//! presets rather than merged into one.

use super::calculations::Fit;
use super::params::{BLACK, GREY, Point, TextStyle, WHITE};
use crate::metadata::{DisplayRules, OverviewPolicy};
use image::Rgba;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Complete description of one wallpaper layout.
#[derive(Debug, Clone, PartialEq)]
pub struct Layout {
    pub preset: Preset,
    pub canvas: (u32, u32),
    /// Canvas fill when no template is supplied, and the color transparency
    /// is flattened against.
    pub background: Rgba<u8>,
    pub backdrop_fit: Fit,
    pub backdrop_origin: Point,
    pub overlay_origin: Point,
    pub logo_origin: Point,
    pub title: TextStyle,
    pub overview: TextStyle,
    pub metadata: TextStyle,
    pub caption: TextStyle,
    pub shadow_offset: Point,
    pub shadow_color: Rgba<u8>,
    pub rules: DisplayRules,
}

impl Layout {
    /// Replace the caption text, keeping everything else.
    pub fn with_caption(mut self, caption: impl Into<String>) -> Self {
        self.rules.caption = caption.into();
        self
    }

    pub fn with_rating_label(mut self, label: Option<String>) -> Self {
        self.rules.rating_label = label;
        self
    }
}

/// Layout preset names as used in `config.toml`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Preset {
    Trending,
    TrendingWrapped,
    Library,
}

impl Preset {
    pub const ALL: [Preset; 3] = [Preset::Trending, Preset::TrendingWrapped, Preset::Library];

    pub fn name(self) -> &'static str {
        match self {
            Preset::Trending => "trending",
            Preset::TrendingWrapped => "trending-wrapped",
            Preset::Library => "library",
        }
    }

    pub fn layout(self) -> Layout {
        match self {
            Preset::Trending => trending(),
            Preset::TrendingWrapped => trending_wrapped(),
            Preset::Library => library(),
        }
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Preset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Preset::ALL
            .into_iter()
            .find(|p| p.name() == s)
            .ok_or_else(|| {
                let names: Vec<&str> = Preset::ALL.iter().map(|p| p.name()).collect();
                format!("unknown layout preset '{s}' (expected one of {names:?})")
            })
    }
}

const TRENDING_CAPTION: &str = "Now Trending on TMDB";
const LIBRARY_CAPTION: &str = "Available now on Plex";

fn style(x: i32, y: i32, px: f32, color: Rgba<u8>) -> TextStyle {
    TextStyle {
        origin: Point::new(x, y),
        px,
        color,
    }
}

fn trending() -> Layout {
    Layout {
        preset: Preset::Trending,
        canvas: (3840, 1500),
        background: BLACK,
        backdrop_fit: Fit::Height(1500),
        backdrop_origin: Point::new(1175, 0),
        overlay_origin: Point::new(1175, 0),
        logo_origin: Point::new(220, 530),
        title: style(200, 540, 190.0, WHITE),
        overview: style(210, 780, 50.0, GREY),
        metadata: style(210, 860, 50.0, GREY),
        caption: style(210, 930, 70.0, WHITE),
        shadow_offset: Point::new(2, 2),
        shadow_color: BLACK,
        rules: DisplayRules {
            title_max_chars: Some(38),
            overview: OverviewPolicy::Truncate { max_chars: 130 },
            rating_label: Some("TMDB".to_string()),
            caption: TRENDING_CAPTION.to_string(),
        },
    }
}

fn trending_wrapped() -> Layout {
    Layout {
        preset: Preset::TrendingWrapped,
        logo_origin: Point::new(220, 420),
        title: style(200, 430, 190.0, WHITE),
        overview: style(210, 670, 50.0, GREY),
        metadata: style(210, 820, 50.0, GREY),
        caption: style(210, 900, 70.0, WHITE),
        rules: DisplayRules {
            overview: OverviewPolicy::Wrap {
                width_chars: 70,
                max_lines: 2,
            },
            ..trending().rules
        },
        ..trending()
    }
}

fn library() -> Layout {
    Layout {
        preset: Preset::Library,
        canvas: (1920, 1080),
        background: BLACK,
        backdrop_fit: Fit::Height(1080),
        backdrop_origin: Point::new(0, 0),
        overlay_origin: Point::new(0, 0),
        logo_origin: Point::new(100, 400),
        title: style(100, 500, 100.0, WHITE),
        caption: style(100, 615, 35.0, WHITE),
        metadata: style(100, 670, 35.0, GREY),
        overview: style(100, 720, 35.0, GREY),
        shadow_offset: Point::new(1, 1),
        shadow_color: BLACK,
        rules: DisplayRules {
            title_max_chars: Some(38),
            overview: OverviewPolicy::Wrap {
                width_chars: 80,
                max_lines: 2,
            },
            rating_label: None,
            caption: LIBRARY_CAPTION.to_string(),
        },
    }
}
