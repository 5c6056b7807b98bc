//! Plex library adapter: the newest movies and shows on a media server.

use super::{Fetch, FetchError, HttpClient, MediaSource};
use crate::types::{BackdropRef, MediaDetails, MediaKind, MediaRecord};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::info;

/// Which date "newest" is measured by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlexOrder {
    /// Original release / first air date.
    Aired,
    /// Date the item was added to the library.
    Added,
}

impl fmt::Display for PlexOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PlexOrder::Aired => "aired",
            PlexOrder::Added => "added",
        })
    }
}

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(rename = "MediaContainer")]
    container: Container,
}

#[derive(Debug, Default, Deserialize)]
struct Container {
    #[serde(rename = "Metadata", default)]
    metadata: Vec<Item>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Item {
    rating_key: String,
    title: String,
    #[serde(default)]
    summary: String,
    originally_available_at: Option<String>,
    #[serde(default)]
    added_at: i64,
    audience_rating: Option<f32>,
    rating: Option<f32>,
    /// Milliseconds.
    duration: Option<u64>,
    child_count: Option<u32>,
    art: Option<String>,
    #[serde(rename = "Genre", default)]
    genre: Vec<Tag>,
}

#[derive(Debug, Deserialize)]
struct Tag {
    tag: String,
}

/// Plex `type` filter value for a media kind.
fn plex_type(kind: MediaKind) -> u8 {
    match kind {
        MediaKind::Movie => 1,
        MediaKind::Series => 2,
    }
}

/// Newest first by `order`, then cut to `limit`. Items without a release
/// date sort last under [`PlexOrder::Aired`].
fn newest(mut items: Vec<Item>, order: PlexOrder, limit: usize) -> Vec<Item> {
    match order {
        // ISO dates compare correctly as strings.
        PlexOrder::Aired => items.sort_by(|a, b| b.originally_available_at.cmp(&a.originally_available_at)),
        PlexOrder::Added => items.sort_by(|a, b| b.added_at.cmp(&a.added_at)),
    }
    items.truncate(limit);
    items
}

fn to_record(item: Item, kind: MediaKind, base_url: &str, token: &str) -> MediaRecord {
    let details = match kind {
        MediaKind::Movie => MediaDetails::Movie {
            runtime_minutes: item
                .duration
                .map(|ms| (ms / 60_000) as u32)
                .filter(|&m| m > 0),
        },
        MediaKind::Series => MediaDetails::Series {
            season_count: item.child_count,
        },
    };
    let rating = item.audience_rating.or(item.rating).unwrap_or(0.0);
    MediaRecord {
        id: format!("plex:{}", item.rating_key),
        title: item.title,
        overview: item.summary,
        date: item.originally_available_at.unwrap_or_default(),
        rating: (rating * 10.0).round() / 10.0,
        genres: item
            .genre
            .into_iter()
            .map(|g| g.tag)
            .collect::<Vec<_>>()
            .join(", "),
        details,
        backdrop: item
            .art
            .filter(|a| !a.is_empty())
            .map(|art| BackdropRef(format!("{base_url}{art}?X-Plex-Token={token}"))),
    }
}

/// Recently released or added titles from a Plex server.
#[derive(Debug, Clone)]
pub struct PlexSource<F = HttpClient> {
    http: F,
    base_url: String,
    token: String,
    order: PlexOrder,
    limit: usize,
    kinds: Vec<MediaKind>,
}

impl<F: Fetch> PlexSource<F> {
    pub fn new(
        http: F,
        base_url: &str,
        token: String,
        order: PlexOrder,
        limit: usize,
        kinds: Vec<MediaKind>,
    ) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
            order,
            limit,
            kinds,
        }
    }
}

impl<F: Fetch> MediaSource for PlexSource<F> {
    fn name(&self) -> &str {
        "plex"
    }

    fn list_current(&self) -> Result<Vec<MediaRecord>, FetchError> {
        let url = format!("{}/library/all", self.base_url);
        let mut records = Vec::new();
        for &kind in &self.kinds {
            let query = [
                ("type", plex_type(kind).to_string()),
                ("X-Plex-Token", self.token.clone()),
            ];
            let envelope: Envelope = self.http.get_json(&url, &query)?;
            let items = newest(envelope.container.metadata, self.order, self.limit);
            records.extend(
                items
                    .into_iter()
                    .map(|item| to_record(item, kind, &self.base_url, &self.token)),
            );
        }
        info!(count = records.len(), order = %self.order, "fetched library titles");
        Ok(records)
    }

    fn resolve_backdrop(&self, backdrop: &BackdropRef) -> Result<Vec<u8>, FetchError> {
        self.http.get_bytes(backdrop.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::tests::MockFetch;

    const MOVIES: &str = r#"{
        "MediaContainer": {
            "size": 3,
            "Metadata": [
                {
                    "ratingKey": "101",
                    "type": "movie",
                    "title": "Old Classic",
                    "summary": "An older film.",
                    "originallyAvailableAt": "1985-07-03",
                    "addedAt": 1700000300,
                    "rating": 7.44,
                    "duration": 6960000,
                    "art": "/library/metadata/101/art/1699999999",
                    "Genre": [{"tag": "Adventure"}, {"tag": "Comedy"}]
                },
                {
                    "ratingKey": "102",
                    "type": "movie",
                    "title": "New Release",
                    "summary": "A new film.",
                    "originallyAvailableAt": "2024-05-01",
                    "addedAt": 1700000100,
                    "audienceRating": 8.1,
                    "rating": 6.0,
                    "duration": 5700000,
                    "art": "/library/metadata/102/art/1700000000"
                },
                {
                    "ratingKey": "103",
                    "type": "movie",
                    "title": "Undated",
                    "addedAt": 1700000200
                }
            ]
        }
    }"#;

    fn items() -> Vec<Item> {
        let envelope: Envelope = serde_json::from_str(MOVIES).unwrap();
        envelope.container.metadata
    }

    #[test]
    fn aired_order_puts_newest_release_first() {
        let titles: Vec<_> = newest(items(), PlexOrder::Aired, 10)
            .into_iter()
            .map(|i| i.title)
            .collect();
        assert_eq!(titles, vec!["New Release", "Old Classic", "Undated"]);
    }

    #[test]
    fn added_order_uses_added_at() {
        let titles: Vec<_> = newest(items(), PlexOrder::Added, 2)
            .into_iter()
            .map(|i| i.title)
            .collect();
        assert_eq!(titles, vec!["Old Classic", "Undated"]);
    }

    #[test]
    fn movie_item_becomes_record() {
        let item = items().into_iter().next().unwrap();
        let record = to_record(item, MediaKind::Movie, "http://plex:32400", "tok");
        assert_eq!(record.id, "plex:101");
        assert_eq!(record.genres, "Adventure, Comedy");
        assert_eq!(record.rating, 7.4);
        assert_eq!(
            record.details,
            MediaDetails::Movie {
                runtime_minutes: Some(116)
            }
        );
        assert_eq!(
            record.backdrop.unwrap().as_str(),
            "http://plex:32400/library/metadata/101/art/1699999999?X-Plex-Token=tok"
        );
    }

    #[test]
    fn audience_rating_wins_over_critic_rating() {
        let item = items().into_iter().nth(1).unwrap();
        let record = to_record(item, MediaKind::Movie, "http://plex:32400", "tok");
        assert_eq!(record.rating, 8.1);
    }

    #[test]
    fn item_without_art_has_no_backdrop() {
        let item = items().into_iter().nth(2).unwrap();
        let record = to_record(item, MediaKind::Movie, "http://plex:32400", "tok");
        assert!(record.backdrop.is_none());
        assert_eq!(record.date, "");
        assert_eq!(
            record.details,
            MediaDetails::Movie {
                runtime_minutes: None
            }
        );
    }

    #[test]
    fn show_uses_child_count_for_seasons() {
        let envelope: Envelope = serde_json::from_str(
            r#"{"MediaContainer":{"Metadata":[{"ratingKey":"7","title":"Show","childCount":3,"addedAt":1}]}}"#,
        )
        .unwrap();
        let item = envelope.container.metadata.into_iter().next().unwrap();
        let record = to_record(item, MediaKind::Series, "http://plex:32400", "tok");
        assert_eq!(
            record.details,
            MediaDetails::Series {
                season_count: Some(3)
            }
        );
    }

    #[test]
    fn empty_container_parses() {
        let envelope: Envelope = serde_json::from_str(r#"{"MediaContainer":{"size":0}}"#).unwrap();
        assert!(envelope.container.metadata.is_empty());
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let http = HttpClient::new(std::time::Duration::from_secs(1)).unwrap();
        let source = PlexSource::new(
            http,
            "http://plex:32400/",
            "tok".into(),
            PlexOrder::Added,
            3,
            vec![MediaKind::Movie],
        );
        assert_eq!(source.base_url, "http://plex:32400");
    }

    // =========================================================================
    // list_current against canned responses
    // =========================================================================

    const BASE: &str = "http://plex:32400";

    fn listing_key(plex_type: u8) -> String {
        format!("{BASE}/library/all?type={plex_type}&X-Plex-Token=tok")
    }

    fn source(fetch: &MockFetch, kinds: Vec<MediaKind>) -> PlexSource<&MockFetch> {
        PlexSource::new(fetch, BASE, "tok".into(), PlexOrder::Aired, 2, kinds)
    }

    #[test]
    fn listing_keeps_newest_per_kind() {
        let fetch = MockFetch::new()
            .with_body(&listing_key(1), MOVIES)
            .with_body(
                &listing_key(2),
                r#"{"MediaContainer":{"Metadata":[{"ratingKey":"7","title":"Show","childCount":1,"addedAt":1}]}}"#,
            );

        let records = source(&fetch, vec![MediaKind::Movie, MediaKind::Series])
            .list_current()
            .unwrap();

        let ids: Vec<_> = records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["plex:102", "plex:101", "plex:7"]);
        assert_eq!(fetch.get_requests(), vec![listing_key(1), listing_key(2)]);
    }

    #[test]
    fn failed_listing_aborts() {
        let fetch = MockFetch::new()
            .with_body(&listing_key(1), MOVIES)
            .with_status(&listing_key(2), 401);

        let err = source(&fetch, vec![MediaKind::Movie, MediaKind::Series])
            .list_current()
            .unwrap_err();

        assert!(matches!(err, FetchError::Status { status: 401, .. }), "{err:?}");
        assert!(!err.to_string().contains("tok"), "{err}");
    }

    #[test]
    fn backdrop_is_fetched_with_token_url() {
        let url = format!("{BASE}/library/metadata/102/art/1700000000?X-Plex-Token=tok");
        let fetch = MockFetch::new().with_bytes(&url, vec![9]);
        let bytes = source(&fetch, vec![MediaKind::Movie])
            .resolve_backdrop(&BackdropRef(url.clone()))
            .unwrap();
        assert_eq!(bytes, vec![9]);
        assert_eq!(fetch.get_requests(), vec![url]);
    }
}
