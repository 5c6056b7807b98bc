//! Metadata and backdrop sources.
//!
//! Every backend implements [`MediaSource`]: list the titles that are
//! current right now, and turn a [`BackdropRef`] into image bytes. The rest
//! of the pipeline never knows which backend it is talking to.
//!
//! | Backend | Listing | Backdrop |
//! |---|---|---|
//! | [`TmdbSource`] | trending movies / shows, N pages | `image.tmdb.org` original |
//! | [`PlexSource`] | newest library items by release or add date | server `art` with token |
//!
//! [`list_current`](MediaSource::list_current) failing means the source is
//! unavailable and the run must not touch the output directory.
//! [`resolve_backdrop`](MediaSource::resolve_backdrop) failing affects one
//! record only.

mod http;
mod plex;
mod tmdb;

pub use http::{Fetch, HttpClient, redact_url};
pub use plex::{PlexOrder, PlexSource};
pub use tmdb::{TmdbSource, TrendingWindow};

use crate::types::{BackdropRef, MediaRecord};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("HTTP client setup failed: {0}")]
    Client(#[source] reqwest::Error),
    #[error("request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },
    #[error("unexpected response from {url}: {source}")]
    Parse {
        url: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("environment variable {0} is not set")]
    MissingToken(String),
}

/// A backend that knows which titles are current and where their artwork is.
pub trait MediaSource {
    /// Short name for logs and the run report.
    fn name(&self) -> &str;

    /// The complete current batch. An error aborts the run.
    fn list_current(&self) -> Result<Vec<MediaRecord>, FetchError>;

    /// Raw image bytes for one backdrop.
    fn resolve_backdrop(&self, backdrop: &BackdropRef) -> Result<Vec<u8>, FetchError>;
}

impl<T: MediaSource + ?Sized> MediaSource for Box<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn list_current(&self) -> Result<Vec<MediaRecord>, FetchError> {
        (**self).list_current()
    }

    fn resolve_backdrop(&self, backdrop: &BackdropRef) -> Result<Vec<u8>, FetchError> {
        (**self).resolve_backdrop(backdrop)
    }
}

/// Read a credential from the environment variable `var`.
pub fn token_from_env(var: &str) -> Result<String, FetchError> {
    match std::env::var(var) {
        Ok(token) if !token.trim().is_empty() => Ok(token.trim().to_string()),
        _ => Err(FetchError::MissingToken(var.to_string())),
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::HashMap;

    /// In-memory source that records every backdrop request.
    ///
    /// Backdrops not registered with [`MockSource::with_backdrop`] resolve
    /// to an HTTP 404.
    #[derive(Default)]
    pub struct MockSource {
        pub records: Vec<MediaRecord>,
        pub backdrops: HashMap<String, Vec<u8>>,
        pub unavailable: bool,
        pub requests: RefCell<Vec<String>>,
    }

    impl MockSource {
        pub fn new(records: Vec<MediaRecord>) -> Self {
            Self {
                records,
                ..Self::default()
            }
        }

        pub fn with_backdrop(mut self, reference: &str, bytes: Vec<u8>) -> Self {
            self.backdrops.insert(reference.to_string(), bytes);
            self
        }

        pub fn unavailable() -> Self {
            Self {
                unavailable: true,
                ..Self::default()
            }
        }

        pub fn get_requests(&self) -> Vec<String> {
            self.requests.borrow().clone()
        }
    }

    impl MediaSource for MockSource {
        fn name(&self) -> &str {
            "mock"
        }

        fn list_current(&self) -> Result<Vec<MediaRecord>, FetchError> {
            if self.unavailable {
                return Err(FetchError::Status {
                    url: "mock://trending".into(),
                    status: 503,
                });
            }
            Ok(self.records.clone())
        }

        fn resolve_backdrop(&self, backdrop: &BackdropRef) -> Result<Vec<u8>, FetchError> {
            self.requests.borrow_mut().push(backdrop.as_str().to_string());
            self.backdrops
                .get(backdrop.as_str())
                .cloned()
                .ok_or_else(|| FetchError::Status {
                    url: backdrop.as_str().to_string(),
                    status: 404,
                })
        }
    }

    /// Canned HTTP responses keyed by request, see [`request_key`].
    ///
    /// Unregistered requests answer HTTP 404. Every request is recorded.
    #[derive(Default)]
    pub struct MockFetch {
        pub responses: HashMap<String, Result<Vec<u8>, u16>>,
        pub requests: RefCell<Vec<String>>,
    }

    /// `url` with `query` appended as `?k=v&k=v`, unescaped.
    pub fn request_key(url: &str, query: &[(&str, String)]) -> String {
        if query.is_empty() {
            return url.to_string();
        }
        let pairs: Vec<String> = query.iter().map(|(k, v)| format!("{k}={v}")).collect();
        format!("{url}?{}", pairs.join("&"))
    }

    impl MockFetch {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_body(mut self, key: &str, body: &str) -> Self {
            self.responses.insert(key.to_string(), Ok(body.as_bytes().to_vec()));
            self
        }

        pub fn with_bytes(mut self, key: &str, bytes: Vec<u8>) -> Self {
            self.responses.insert(key.to_string(), Ok(bytes));
            self
        }

        pub fn with_status(mut self, key: &str, status: u16) -> Self {
            self.responses.insert(key.to_string(), Err(status));
            self
        }

        pub fn get_requests(&self) -> Vec<String> {
            self.requests.borrow().clone()
        }

        fn respond(&self, key: String) -> Result<Vec<u8>, FetchError> {
            self.requests.borrow_mut().push(key.clone());
            match self.responses.get(&key) {
                Some(Ok(body)) => Ok(body.clone()),
                Some(Err(status)) => Err(FetchError::Status {
                    url: redact_url(&key),
                    status: *status,
                }),
                None => Err(FetchError::Status {
                    url: redact_url(&key),
                    status: 404,
                }),
            }
        }
    }

    impl Fetch for MockFetch {
        fn get_bytes(&self, url: &str) -> Result<Vec<u8>, FetchError> {
            self.respond(url.to_string())
        }

        fn get_text(&self, url: &str, query: &[(&str, String)]) -> Result<String, FetchError> {
            let body = self.respond(request_key(url, query))?;
            Ok(String::from_utf8_lossy(&body).into_owned())
        }
    }

    #[test]
    fn mock_fetch_answers_registered_requests() {
        let fetch = MockFetch::new()
            .with_body("http://host/a?page=1", r#"{"ok":true}"#)
            .with_status("http://host/down", 503);

        let value: serde_json::Value = fetch.get_json("http://host/a", &[("page", "1".into())]).unwrap();
        assert_eq!(value["ok"], true);
        assert!(matches!(fetch.get_bytes("http://host/down"), Err(FetchError::Status { status: 503, .. })));
        assert!(matches!(fetch.get_bytes("http://host/b"), Err(FetchError::Status { status: 404, .. })));
        assert_eq!(
            fetch.get_requests(),
            vec!["http://host/a?page=1", "http://host/down", "http://host/b"]
        );
    }

    #[test]
    fn mock_records_backdrop_requests() {
        let source = MockSource::new(Vec::new()).with_backdrop("a", vec![1, 2, 3]);
        assert_eq!(source.resolve_backdrop(&BackdropRef("a".into())).unwrap(), vec![1, 2, 3]);
        assert!(source.resolve_backdrop(&BackdropRef("b".into())).is_err());
        assert_eq!(source.get_requests(), vec!["a", "b"]);
    }

    #[test]
    fn boxed_source_delegates() {
        let source: Box<dyn MediaSource> = Box::new(MockSource::unavailable());
        assert_eq!(source.name(), "mock");
        assert!(matches!(source.list_current(), Err(FetchError::Status { status: 503, .. })));
    }

    #[test]
    fn missing_token_names_the_variable() {
        let err = token_from_env("TRENDWALL_TEST_DEFINITELY_UNSET").unwrap_err();
        assert_eq!(
            err.to_string(),
            "environment variable TRENDWALL_TEST_DEFINITELY_UNSET is not set"
        );
    }
}
