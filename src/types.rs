//! Shared types passed between the source adapters, the layout engine and
//! the reconciler.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Which kind of title a record describes. Selects the layout preset and
/// which of runtime / season count applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Movie,
    Series,
}

impl MediaKind {
    pub fn label(self) -> &'static str {
        match self {
            MediaKind::Movie => "movie",
            MediaKind::Series => "series",
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Kind-specific extent of a title. Movies carry a runtime, series a season
/// count, never both. Either may be unknown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MediaDetails {
    Movie { runtime_minutes: Option<u32> },
    Series { season_count: Option<u32> },
}

impl MediaDetails {
    pub fn kind(&self) -> MediaKind {
        match self {
            MediaDetails::Movie { .. } => MediaKind::Movie,
            MediaDetails::Series { .. } => MediaKind::Series,
        }
    }
}

/// Opaque handle a [`MediaSource`](crate::source::MediaSource) resolves to
/// image bytes. Both shipped adapters store an absolute URL here.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BackdropRef(pub String);

impl BackdropRef {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// One trending or recently added title.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaRecord {
    /// Unique within one fetch batch.
    pub id: String,
    pub title: String,
    pub overview: String,
    /// ISO-like date (`2024-05-01`); at least the year is expected but not
    /// required.
    pub date: String,
    pub rating: f32,
    /// Comma-joined genre names.
    pub genres: String,
    pub details: MediaDetails,
    /// `None` when the source has no artwork for the title.
    pub backdrop: Option<BackdropRef>,
}

impl MediaRecord {
    pub fn kind(&self) -> MediaKind {
        self.details.kind()
    }

    pub fn is_movie(&self) -> bool {
        self.kind() == MediaKind::Movie
    }

    /// Output filename for this record, see [`crate::naming`].
    pub fn canonical_filename(&self) -> String {
        crate::naming::canonical_filename(&self.title)
    }
}

/// A finished wallpaper, flattened to RGB.
#[derive(Debug, Clone)]
pub struct RenderedAsset {
    pub canonical_filename: String,
    pub pixels: image::RgbImage,
    pub source_record_id: String,
}
