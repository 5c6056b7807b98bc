//! Blocking HTTP client shared by the source adapters and the font loader.

use super::FetchError;
use reqwest::blocking::{Client, RequestBuilder};
use reqwest::header::ACCEPT;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

const USER_AGENT: &str = concat!("trendwall/", env!("CARGO_PKG_VERSION"));

/// Thin wrapper over [`reqwest::blocking::Client`] with a per-request
/// timeout and optional bearer token.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    bearer: Option<String>,
}

impl HttpClient {
    pub fn new(timeout: Duration) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(FetchError::Client)?;
        Ok(Self {
            client,
            bearer: None,
        })
    }

    /// Send `Authorization: Bearer <token>` with every request.
    pub fn with_bearer(mut self, token: String) -> Self {
        self.bearer = Some(token);
        self
    }

    fn get(&self, url: &str) -> RequestBuilder {
        let request = self.client.get(url);
        match &self.bearer {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }
}

/// GET access as the source adapters and the font loader need it.
///
/// [`HttpClient`] is the network implementation. Tests substitute canned
/// responses keyed by URL.
pub trait Fetch {
    /// Fetch a body as raw bytes. Any non-2xx status is an error.
    fn get_bytes(&self, url: &str) -> Result<Vec<u8>, FetchError>;

    /// Fetch a JSON body as text, with `query` appended to `url`.
    fn get_text(&self, url: &str, query: &[(&str, String)]) -> Result<String, FetchError>;

    /// Fetch and deserialize a JSON body.
    fn get_json<T: DeserializeOwned>(&self, url: &str, query: &[(&str, String)]) -> Result<T, FetchError> {
        let body = self.get_text(url, query)?;
        serde_json::from_str(&body).map_err(|source| FetchError::Parse {
            url: redact_url(url),
            source,
        })
    }
}

impl<T: Fetch + ?Sized> Fetch for &T {
    fn get_bytes(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        (**self).get_bytes(url)
    }

    fn get_text(&self, url: &str, query: &[(&str, String)]) -> Result<String, FetchError> {
        (**self).get_text(url, query)
    }
}

impl Fetch for HttpClient {
    fn get_bytes(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let shown = redact_url(url);
        debug!(url = %shown, "GET");
        let response = self.get(url).send().map_err(|source| FetchError::Http {
            url: shown.clone(),
            source: source.without_url(),
        })?;
        if !response.status().is_success() {
            return Err(FetchError::Status {
                url: shown,
                status: response.status().as_u16(),
            });
        }
        let bytes = response.bytes().map_err(|source| FetchError::Http {
            url: shown,
            source: source.without_url(),
        })?;
        Ok(bytes.to_vec())
    }

    fn get_text(&self, url: &str, query: &[(&str, String)]) -> Result<String, FetchError> {
        let shown = redact_url(url);
        let keys: Vec<&str> = query.iter().map(|(key, _)| *key).collect();
        debug!(url = %shown, ?keys, "GET json");
        let response = self
            .get(url)
            .header(ACCEPT, "application/json")
            .query(query)
            .send()
            .map_err(|source| FetchError::Http {
                url: shown.clone(),
                source: source.without_url(),
            })?;
        if !response.status().is_success() {
            return Err(FetchError::Status {
                url: shown,
                status: response.status().as_u16(),
            });
        }
        response.text().map_err(|source| FetchError::Http {
            url: shown,
            source: source.without_url(),
        })
    }
}

/// Drop the query string so tokens never reach logs or error messages.
pub fn redact_url(url: &str) -> String {
    match url.split_once('?') {
        Some((base, _)) => format!("{base}?..."),
        None => url.to_string(),
    }
}
