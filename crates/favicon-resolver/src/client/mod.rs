//! Outbound HTTP for the pipeline: page, manifest and icon fetches.
//!
//! Every request carries its own timeout and a desktop-browser header set;
//! some sites serve a different or blocked page to anything that does not
//! look like a browser. Nothing here retries.

mod icon;
mod manifest;
mod page;

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::Client;

use crate::error::ResolveError;

pub use icon::{decode_data_uri, IconImage};
pub use page::{looks_like_bot_challenge, PageDocument};

/// Upper bound for connection setup, independent of per-request timeouts.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(3);

/// Per-stage timeouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTimeouts {
    pub page: Duration,
    pub manifest: Duration,
    pub icon: Duration,
}

impl Default for FetchTimeouts {
    fn default() -> Self {
        Self {
            page: Duration::from_millis(5000),
            manifest: Duration::from_millis(2000),
            icon: Duration::from_millis(2500),
        }
    }
}

/// Thin wrapper over a shared [`reqwest::Client`].
///
/// Cloning is cheap; all clones share one connection pool.
#[derive(Debug, Clone)]
pub struct FetchClient {
    client: Client,
    headers: HeaderMap,
    timeouts: FetchTimeouts,
}

impl FetchClient {
    /// Builds a client with the given `User-Agent` and timeouts.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed (e.g., invalid TLS config).
    pub fn new(user_agent: &str, timeouts: FetchTimeouts) -> Result<Self, ResolveError> {
        let client = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .build()?;
        Ok(Self::with_client(client, user_agent, timeouts))
    }

    /// Wraps an existing client, e.g. one with DNS overrides.
    ///
    /// Browser headers are attached per request, so they apply regardless of
    /// how `client` was configured.
    #[must_use]
    pub fn with_client(client: Client, user_agent: &str, timeouts: FetchTimeouts) -> Self {
        Self {
            client,
            headers: browser_headers(user_agent),
            timeouts,
        }
    }

    fn get(&self, url: &str, timeout: Duration) -> reqwest::RequestBuilder {
        self.client
            .get(url)
            .headers(self.headers.clone())
            .timeout(timeout)
    }
}

fn browser_headers(user_agent: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    let static_headers: [(reqwest::header::HeaderName, &'static str); 9] = [
        (
            reqwest::header::ACCEPT,
            "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,*/*;q=0.8",
        ),
        (reqwest::header::ACCEPT_LANGUAGE, "en-US,en;q=0.9"),
        (reqwest::header::CACHE_CONTROL, "max-age=0"),
        (
            reqwest::header::HeaderName::from_static("sec-ch-ua"),
            "\"Chromium\";v=\"124\", \"Google Chrome\";v=\"124\", \"Not-A.Brand\";v=\"99\"",
        ),
        (reqwest::header::HeaderName::from_static("sec-ch-ua-mobile"), "?0"),
        (
            reqwest::header::HeaderName::from_static("sec-ch-ua-platform"),
            "\"macOS\"",
        ),
        (reqwest::header::HeaderName::from_static("sec-fetch-dest"), "document"),
        (reqwest::header::HeaderName::from_static("sec-fetch-site"), "none"),
        (reqwest::header::HeaderName::from_static("sec-fetch-user"), "?1"),
    ];
    for (name, value) in static_headers {
        headers.insert(name, HeaderValue::from_static(value));
    }

    match HeaderValue::from_str(user_agent) {
        Ok(ua) => {
            headers.insert(reqwest::header::USER_AGENT, ua);
        }
        Err(_) => {
            tracing::warn!(user_agent, "user agent is not a valid header value; using default");
            headers.insert(
                reqwest::header::USER_AGENT,
                HeaderValue::from_static(favicon_core::app_config::DEFAULT_USER_AGENT),
            );
        }
    }

    headers
}
