//! Font resource loading.
//!
//! The font is resolved once, before any record is processed, and the
//! resulting [`FontPainter`] is shared by every text block of every render.
//!
//! Resolution order:
//!
//! 1. `font.path`, when configured. No network.
//! 2. `<cache_dir>/<key>.ttf`, where `key` is the first 16 hex digits of
//!    SHA-256 over `font.url`.
//! 3. Fetch `font.url`, write it to the cache, use it.
//!
//! A cached file that no longer parses is treated as a miss and replaced.
//! Failing to write the cache only costs a fetch on the next run.

use crate::config::FontConfig;
use crate::imaging::FontPainter;
use crate::source::{Fetch, FetchError, HttpClient};
use sha2::{Digest, Sha256};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Error, Debug)]
pub enum FontError {
    #[error("cannot read font {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("font download failed: {0}")]
    Fetch(#[from] FetchError),
    #[error("{0} is not a usable TrueType/OpenType font")]
    Invalid(String),
}

/// Cache filename for a font URL.
pub fn cache_key(url: &str) -> String {
    let digest = format!("{:x}", Sha256::digest(url.as_bytes()));
    format!("{}.ttf", &digest[..16])
}

/// Resolve the configured font, fetching over `http` on a cache miss.
pub fn load_font(config: &FontConfig, http: &HttpClient) -> Result<FontPainter, FontError> {
    load_font_with(config, |url| http.get_bytes(url))
}

/// [`load_font`] with the download step supplied by the caller.
pub fn load_font_with<F>(config: &FontConfig, fetch: F) -> Result<FontPainter, FontError>
where
    F: FnOnce(&str) -> Result<Vec<u8>, FetchError>,
{
    if let Some(path) = &config.path {
        let bytes = fs::read(path).map_err(|source| FontError::Read {
            path: path.clone(),
            source,
        })?;
        info!(path = %path.display(), "using local font");
        return FontPainter::from_bytes(bytes).ok_or_else(|| FontError::Invalid(path.display().to_string()));
    }

    let cached = config.cache_dir.join(cache_key(&config.url));
    if let Some(painter) = read_cached(&cached) {
        debug!(path = %cached.display(), "font cache hit");
        return Ok(painter);
    }

    info!(url = %config.url, "downloading font");
    let bytes = fetch(&config.url)?;
    let painter =
        FontPainter::from_bytes(bytes.clone()).ok_or_else(|| FontError::Invalid(config.url.clone()))?;
    if let Err(e) = write_cache(&cached, &bytes) {
        warn!(path = %cached.display(), error = %e, "could not cache font");
    }
    Ok(painter)
}

fn read_cached(path: &Path) -> Option<FontPainter> {
    let bytes = fs::read(path).ok()?;
    let painter = FontPainter::from_bytes(bytes);
    if painter.is_none() {
        warn!(path = %path.display(), "cached font is corrupt, fetching again");
    }
    painter
}

fn write_cache(path: &Path, bytes: &[u8]) -> io::Result<()> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)?;
    }
    let tmp = path.with_extension("ttf.part");
    fs::write(&tmp, bytes)?;
    fs::rename(&tmp, path)
}
