//! TMDB trending adapter.
//!
//! One run issues, per enabled media kind:
//!
//! 1. `genre/{movie|tv}/list` once, for genre id → name.
//! 2. `trending/{movie|tv}/{window}` for pages `1..=pages`.
//! 3. `movie/{id}` or `tv/{id}` per title, for runtime or season count.
//!
//! Only step 2 is load-bearing. A failed genre list leaves genre text empty
//! and a failed detail lookup leaves the runtime / season count unknown.

use super::{Fetch, FetchError, HttpClient, MediaSource};
use crate::types::{BackdropRef, MediaDetails, MediaKind, MediaRecord};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;
use tracing::{debug, info, warn};

pub const API_BASE: &str = "https://api.themoviedb.org/3";
pub const IMAGE_BASE: &str = "https://image.tmdb.org/t/p/original";

/// Time window TMDB aggregates trending scores over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendingWindow {
    Day,
    Week,
}

impl TrendingWindow {
    pub fn as_str(self) -> &'static str {
        match self {
            TrendingWindow::Day => "day",
            TrendingWindow::Week => "week",
        }
    }
}

impl fmt::Display for TrendingWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Deserialize)]
struct TrendingPage {
    #[serde(default)]
    results: Vec<TrendingItem>,
    #[serde(default = "one")]
    total_pages: u32,
}

fn one() -> u32 {
    1
}

/// One entry of a trending page. Movies carry `title`/`release_date`,
/// shows `name`/`first_air_date`.
#[derive(Debug, Deserialize)]
struct TrendingItem {
    id: u64,
    title: Option<String>,
    name: Option<String>,
    #[serde(default)]
    overview: String,
    release_date: Option<String>,
    first_air_date: Option<String>,
    #[serde(default)]
    vote_average: f32,
    #[serde(default)]
    genre_ids: Vec<u32>,
    backdrop_path: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GenreList {
    genres: Vec<Genre>,
}

#[derive(Debug, Deserialize)]
struct Genre {
    id: u32,
    name: String,
}

#[derive(Debug, Deserialize)]
struct MovieDetails {
    runtime: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct TvDetails {
    number_of_seasons: Option<u32>,
}

/// TMDB path segment for a media kind.
fn kind_segment(kind: MediaKind) -> &'static str {
    match kind {
        MediaKind::Movie => "movie",
        MediaKind::Series => "tv",
    }
}

/// Round a vote average to one decimal place.
fn round_rating(vote_average: f32) -> f32 {
    (vote_average * 10.0).round() / 10.0
}

/// Comma-joined names for `ids`, skipping ids the lookup does not know.
fn genre_text(ids: &[u32], names: &HashMap<u32, String>) -> String {
    ids.iter()
        .filter_map(|id| names.get(id).map(String::as_str))
        .collect::<Vec<_>>()
        .join(", ")
}

fn backdrop_ref(path: Option<&str>) -> Option<BackdropRef> {
    path.filter(|p| !p.is_empty())
        .map(|p| BackdropRef(format!("{IMAGE_BASE}{p}")))
}

fn to_record(
    item: TrendingItem,
    kind: MediaKind,
    genres: &HashMap<u32, String>,
    details: MediaDetails,
) -> MediaRecord {
    let (title, date) = match kind {
        MediaKind::Movie => (item.title.or(item.name), item.release_date),
        MediaKind::Series => (item.name.or(item.title), item.first_air_date),
    };
    MediaRecord {
        id: format!("tmdb:{}:{}", kind_segment(kind), item.id),
        title: title.unwrap_or_default(),
        overview: item.overview,
        date: date.unwrap_or_default(),
        rating: round_rating(item.vote_average),
        genres: genre_text(&item.genre_ids, genres),
        details,
        backdrop: backdrop_ref(item.backdrop_path.as_deref()),
    }
}

/// Trending titles from TMDB.
#[derive(Debug, Clone)]
pub struct TmdbSource<F = HttpClient> {
    api: F,
    images: F,
    language: String,
    window: TrendingWindow,
    pages: u32,
    kinds: Vec<MediaKind>,
}

impl TmdbSource {
    /// `http` is used as-is for image downloads and with `token` as bearer
    /// for API calls.
    pub fn new(
        http: HttpClient,
        token: String,
        language: &str,
        window: TrendingWindow,
        pages: u32,
        kinds: Vec<MediaKind>,
    ) -> Self {
        Self::with_fetch(http.clone().with_bearer(token), http, language, window, pages, kinds)
    }
}

impl<F: Fetch> TmdbSource<F> {
    /// `api` must carry the TMDB credentials; `images` must not.
    pub fn with_fetch(
        api: F,
        images: F,
        language: &str,
        window: TrendingWindow,
        pages: u32,
        kinds: Vec<MediaKind>,
    ) -> Self {
        Self {
            api,
            images,
            language: language.to_string(),
            window,
            pages,
            kinds,
        }
    }

    fn lang(&self) -> Vec<(&'static str, String)> {
        vec![("language", self.language.clone())]
    }

    fn genres(&self, kind: MediaKind) -> HashMap<u32, String> {
        let url = format!("{API_BASE}/genre/{}/list", kind_segment(kind));
        match self.api.get_json::<GenreList>(&url, &self.lang()) {
            Ok(list) => list.genres.into_iter().map(|g| (g.id, g.name)).collect(),
            Err(e) => {
                warn!(%kind, error = %e, "genre lookup failed, genres will be blank");
                HashMap::new()
            }
        }
    }

    fn details(&self, kind: MediaKind, id: u64) -> MediaDetails {
        let url = format!("{API_BASE}/{}/{id}", kind_segment(kind));
        match kind {
            MediaKind::Movie => {
                let runtime = self
                    .api
                    .get_json::<MovieDetails>(&url, &self.lang())
                    .inspect_err(|e| warn!(id, error = %e, "movie detail lookup failed"))
                    .ok()
                    .and_then(|d| d.runtime)
                    .filter(|&m| m > 0);
                MediaDetails::Movie {
                    runtime_minutes: runtime,
                }
            }
            MediaKind::Series => {
                let seasons = self
                    .api
                    .get_json::<TvDetails>(&url, &self.lang())
                    .inspect_err(|e| warn!(id, error = %e, "series detail lookup failed"))
                    .ok()
                    .and_then(|d| d.number_of_seasons);
                MediaDetails::Series {
                    season_count: seasons,
                }
            }
        }
    }

    fn trending_page(&self, kind: MediaKind, page: u32) -> Result<TrendingPage, FetchError> {
        let url = format!("{API_BASE}/trending/{}/{}", kind_segment(kind), self.window);
        let mut query = self.lang();
        query.push(("page", page.to_string()));
        self.api.get_json(&url, &query)
    }
}

impl<F: Fetch> MediaSource for TmdbSource<F> {
    fn name(&self) -> &str {
        "tmdb"
    }

    fn list_current(&self) -> Result<Vec<MediaRecord>, FetchError> {
        let mut records = Vec::new();
        let mut seen = HashSet::new();

        for &kind in &self.kinds {
            let genres = self.genres(kind);
            for page in 1..=self.pages {
                let listing = self.trending_page(kind, page)?;
                debug!(%kind, page, items = listing.results.len(), "trending page");
                for item in listing.results {
                    if !seen.insert((kind, item.id)) {
                        continue;
                    }
                    let details = self.details(kind, item.id);
                    records.push(to_record(item, kind, &genres, details));
                }
                if page >= listing.total_pages {
                    break;
                }
            }
        }

        info!(count = records.len(), window = %self.window, "fetched trending titles");
        Ok(records)
    }

    fn resolve_backdrop(&self, backdrop: &BackdropRef) -> Result<Vec<u8>, FetchError> {
        self.images.get_bytes(backdrop.as_str())
    }
}
