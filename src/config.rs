//! Run configuration.
//!
//! Handles loading, validating, and merging `trendwall.toml`. The file is
//! optional and sparse: stock defaults are the base layer and the user file
//! overrides only the keys it names.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! output_dir = "wallpapers"
//!
//! [source]
//! kind = "tmdb"             # "tmdb" or "plex"
//! movies = true
//! series = true
//!
//! [tmdb]
//! token_env = "TMDB_TOKEN"  # env var holding the API read access token
//! language = "en-US"
//! window = "week"           # "day" or "week"
//! pages = 1
//!
//! [plex]
//! base_url = "http://localhost:32400"
//! token_env = "PLEX_TOKEN"
//! order_by = "added"        # "added" or "aired"
//! limit = 3
//!
//! [layout]
//! # movie = "trending"      # preset per kind; default depends on source
//! # series = "trending"
//! # assets_dir = "assets"   # per-preset canvas.png / overlay.png / logo.png
//! # caption = "..."         # replaces the preset's caption
//! jpeg_quality = 90
//!
//! [font]
//! url = "https://github.com/googlefonts/roboto/raw/main/src/hinted/Roboto-Light.ttf"
//! cache_dir = ".cache/fonts"
//! # path = "/usr/share/fonts/truetype/roboto/Roboto-Light.ttf"
//!
//! [fetch]
//! timeout_secs = 10
//! delay_ms = 0
//!
//! [sink]
//! # command = ["rsync", "-a", "--delete", "{dir}/", "frame:/photos/"]
//! ```
//!
//! Relative paths are resolved against the working directory. Unknown keys
//! are rejected to catch typos early.

use crate::imaging::{Layout, Preset, Quality};
use crate::source::{PlexOrder, TrendingWindow};
use crate::types::MediaKind;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Config file read when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "trendwall.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("cannot serialize stock defaults: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Complete run configuration.
///
/// All fields have defaults. Unknown keys are rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Directory the wallpapers are reconciled into.
    pub output_dir: PathBuf,
    pub source: SourceConfig,
    pub tmdb: TmdbConfig,
    pub plex: PlexConfig,
    pub layout: LayoutConfig,
    pub font: FontConfig,
    pub fetch: FetchConfig,
    pub sink: SinkConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("wallpapers"),
            source: SourceConfig::default(),
            tmdb: TmdbConfig::default(),
            plex: PlexConfig::default(),
            layout: LayoutConfig::default(),
            font: FontConfig::default(),
            fetch: FetchConfig::default(),
            sink: SinkConfig::default(),
        }
    }
}

impl Config {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.source.movies && !self.source.series {
            return Err(ConfigError::Validation(
                "source: at least one of movies / series must be enabled".into(),
            ));
        }
        if self.tmdb.pages == 0 {
            return Err(ConfigError::Validation("tmdb.pages must be at least 1".into()));
        }
        if self.plex.limit == 0 {
            return Err(ConfigError::Validation("plex.limit must be at least 1".into()));
        }
        if self.source.kind == SourceKind::Plex && self.plex.base_url.trim().is_empty() {
            return Err(ConfigError::Validation(
                "plex.base_url must be set when source.kind = \"plex\"".into(),
            ));
        }
        if !(1..=100).contains(&self.layout.jpeg_quality) {
            return Err(ConfigError::Validation(
                "layout.jpeg_quality must be 1-100".into(),
            ));
        }
        if self.fetch.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "fetch.timeout_secs must be at least 1".into(),
            ));
        }
        if let Some(command) = &self.sink.command
            && command.first().is_none_or(|program| program.trim().is_empty())
        {
            return Err(ConfigError::Validation(
                "sink.command must name a program".into(),
            ));
        }
        Ok(())
    }

    /// Media kinds enabled in `[source]`, movies first.
    pub fn kinds(&self) -> Vec<MediaKind> {
        let mut kinds = Vec::new();
        if self.source.movies {
            kinds.push(MediaKind::Movie);
        }
        if self.source.series {
            kinds.push(MediaKind::Series);
        }
        kinds
    }

    /// Preset for `kind`: the configured one, else the source's natural one.
    pub fn preset_for(&self, kind: MediaKind) -> Preset {
        let configured = match kind {
            MediaKind::Movie => self.layout.movie,
            MediaKind::Series => self.layout.series,
        };
        configured.unwrap_or(match self.source.kind {
            SourceKind::Tmdb => Preset::Trending,
            SourceKind::Plex => Preset::Library,
        })
    }

    /// Fully resolved layout for `kind`, with caption and rating label
    /// adjusted for the configured source.
    pub fn layout_for(&self, kind: MediaKind) -> Layout {
        let layout = self.preset_for(kind).layout().with_rating_label(match self.source.kind {
            SourceKind::Tmdb => Some("TMDB".to_string()),
            SourceKind::Plex => None,
        });
        match &self.layout.caption {
            Some(caption) => layout.with_caption(caption.clone()),
            None => layout,
        }
    }

    pub fn quality(&self) -> Quality {
        Quality::new(self.layout.jpeg_quality)
    }
}

/// Which backend lists the current titles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Tmdb,
    Plex,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SourceConfig {
    pub kind: SourceKind,
    pub movies: bool,
    pub series: bool,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            kind: SourceKind::Tmdb,
            movies: true,
            series: true,
        }
    }
}

/// TMDB trending settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TmdbConfig {
    /// Environment variable holding the API read access token.
    pub token_env: String,
    pub language: String,
    pub window: TrendingWindow,
    /// Trending pages per media kind, 20 titles each.
    pub pages: u32,
}

impl Default for TmdbConfig {
    fn default() -> Self {
        Self {
            token_env: "TMDB_TOKEN".to_string(),
            language: "en-US".to_string(),
            window: TrendingWindow::Week,
            pages: 1,
        }
    }
}

/// Plex library settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PlexConfig {
    pub base_url: String,
    /// Environment variable holding the `X-Plex-Token`.
    pub token_env: String,
    pub order_by: PlexOrder,
    /// Newest titles kept per media kind.
    pub limit: usize,
}

impl Default for PlexConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:32400".to_string(),
            token_env: "PLEX_TOKEN".to_string(),
            order_by: PlexOrder::Added,
            limit: 3,
        }
    }
}

/// Wallpaper layout settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LayoutConfig {
    /// Preset for movies. Defaults to `trending` for TMDB, `library` for Plex.
    pub movie: Option<Preset>,
    /// Preset for series. Same defaults as `movie`.
    pub series: Option<Preset>,
    /// Directory holding `<preset>/canvas.png`, `overlay.png`, `logo.png`.
    pub assets_dir: Option<PathBuf>,
    /// Replaces the preset's caption line.
    pub caption: Option<String>,
    pub jpeg_quality: u32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            movie: None,
            series: None,
            assets_dir: None,
            caption: None,
            jpeg_quality: 90,
        }
    }
}

pub const DEFAULT_FONT_URL: &str =
    "https://github.com/googlefonts/roboto/raw/main/src/hinted/Roboto-Light.ttf";

/// Font resource settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FontConfig {
    /// Downloaded once and cached.
    pub url: String,
    /// Local font file; when set, `url` is never fetched.
    pub path: Option<PathBuf>,
    pub cache_dir: PathBuf,
}

impl Default for FontConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_FONT_URL.to_string(),
            path: None,
            cache_dir: PathBuf::from(".cache/fonts"),
        }
    }
}

/// Network settings shared by every request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FetchConfig {
    pub timeout_secs: u64,
    /// Pause after each backdrop download.
    pub delay_ms: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 10,
            delay_ms: 0,
        }
    }
}

impl FetchConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn delay(&self) -> Option<Duration> {
        (self.delay_ms > 0).then(|| Duration::from_millis(self.delay_ms))
    }
}

/// Post-run mirroring command.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SinkConfig {
    /// Program and arguments; `{dir}` is replaced with the output directory.
    pub command: Option<Vec<String>>,
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// Unset optional keys are absent from the table.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    Ok(toml::Value::try_from(Config::default())?)
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load a config file as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
/// Returns `Err` if the file exists but contains invalid TOML.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<Config, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: Config = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `path`, falling back to stock defaults when it is missing.
///
/// Merges user values on top of stock defaults, rejects unknown keys,
/// and validates the result.
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let base = stock_defaults_value()?;
    let overlay = load_raw_config(path)?;
    resolve_config(base, overlay)
}

/// Returns a fully-commented stock `trendwall.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# trendwall configuration
# =======================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Unknown keys cause an error.

# Directory the wallpapers are written to. Files in it that do not belong
# to a current title are deleted on every run (hidden files are left alone).
output_dir = "wallpapers"

# ---------------------------------------------------------------------------
# Where current titles come from
# ---------------------------------------------------------------------------
[source]
# "tmdb" for trending titles, "plex" for the newest items of a Plex library.
kind = "tmdb"
movies = true
series = true

# ---------------------------------------------------------------------------
# TMDB
# ---------------------------------------------------------------------------
[tmdb]
# Name of the environment variable holding the API read access token.
token_env = "TMDB_TOKEN"
language = "en-US"
# Trending window: "day" or "week".
window = "week"
# Pages of 20 titles fetched per media kind.
pages = 1

# ---------------------------------------------------------------------------
# Plex
# ---------------------------------------------------------------------------
[plex]
base_url = "http://localhost:32400"
# Name of the environment variable holding the X-Plex-Token.
token_env = "PLEX_TOKEN"
# "added" (date added to the library) or "aired" (release date).
order_by = "added"
# Newest titles kept per media kind.
limit = 3

# ---------------------------------------------------------------------------
# Layout
# ---------------------------------------------------------------------------
[layout]
# Preset per media kind: "trending", "trending-wrapped" or "library".
# Defaults to "trending" for TMDB and "library" for Plex.
# movie = "trending"
# series = "trending-wrapped"

# Directory with optional template images per preset:
#   <assets_dir>/<preset>/canvas.png   base image at the preset's canvas size
#   <assets_dir>/<preset>/overlay.png  vignette pasted over the backdrop
#   <assets_dir>/<preset>/logo.png     pasted on top of everything
# Missing files are synthesized (solid canvas, fade overlay, no logo).
# assets_dir = "assets"

# Replaces the preset caption ("Now Trending on TMDB", "Available now on Plex").
# caption = "Now Trending"

# JPEG quality (1 = worst, 100 = best).
jpeg_quality = 90

# ---------------------------------------------------------------------------
# Font
# ---------------------------------------------------------------------------
[font]
# Downloaded once, then served from cache_dir.
url = "https://github.com/googlefonts/roboto/raw/main/src/hinted/Roboto-Light.ttf"
cache_dir = ".cache/fonts"
# Use a local font file instead; url is then never fetched.
# path = "/usr/share/fonts/truetype/roboto/Roboto-Light.ttf"

# ---------------------------------------------------------------------------
# Network
# ---------------------------------------------------------------------------
[fetch]
# Per-request timeout.
timeout_secs = 10
# Pause after each backdrop download, to go easy on the server.
delay_ms = 0

# ---------------------------------------------------------------------------
# Sink
# ---------------------------------------------------------------------------
[sink]
# Command run after every sync to mirror the output directory elsewhere.
# "{dir}" is replaced with output_dir. A failing command is reported but
# does not fail the run.
# command = ["rsync", "-a", "--delete", "{dir}/", "frame:/photos/"]
"##
}
