//! End-to-end resolution: classify, discover, rank, validate.

use std::sync::Arc;
use std::time::Duration;

use favicon_core::{AppConfig, OverrideTable, Sentinel};
use reqwest::Url;
use serde::Serialize;

use crate::candidate::{CandidateSource, IconCandidate, DEFAULT_ICON_SIZE};
use crate::client::{FetchClient, FetchTimeouts, IconImage};
use crate::diagnostics::{Classification, Diagnostics};
use crate::error::ResolveError;
use crate::head::scan_head;
use crate::manifest::manifest_candidates;
use crate::path::resolve_href;
use crate::query::{classify_query, QueryTarget};
use crate::rank::{rank_candidates, TouchIconPolicy};

/// Nominal size reported for the proxy candidate. It is appended after
/// ranking, so the value only shows up in diagnostics.
const PROXY_ICON_SIZE: i32 = 64;

#[derive(Debug, Clone)]
pub struct ResolverSettings {
    pub user_agent: String,
    pub timeouts: FetchTimeouts,
    pub target_size: i32,
    /// Favicon-by-host service URL with a `{host}` placeholder.
    pub proxy_template: Option<String>,
    pub touch_icon_policy: TouchIconPolicy,
}

impl Default for ResolverSettings {
    fn default() -> Self {
        Self::from_app_config(&AppConfig::default())
    }
}

impl ResolverSettings {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            user_agent: config.user_agent.clone(),
            timeouts: FetchTimeouts {
                page: Duration::from_millis(config.page_timeout_ms),
                manifest: Duration::from_millis(config.manifest_timeout_ms),
                icon: Duration::from_millis(config.icon_timeout_ms),
            },
            target_size: i32::from(config.target_size),
            proxy_template: config.proxy_template.clone(),
            touch_icon_policy: TouchIconPolicy::default(),
        }
    }

    fn proxy_url(&self, base: &Url) -> Option<String> {
        let template = self.proxy_template.as_deref()?;
        let host = base.host_str()?;
        Some(template.replace("{host}", host))
    }
}

/// Per-call switches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolveOptions {
    /// Skip validation: text mode returns the top-ranked candidate, image
    /// mode downloads only that candidate.
    pub fast: bool,
}

impl ResolveOptions {
    #[must_use]
    pub fn fast() -> Self {
        Self { fast: true }
    }
}

/// Text-mode outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Resolution {
    Icon { url: String },
    Localhost,
    NotFound,
}

impl Resolution {
    fn sentinel(sentinel: Sentinel) -> Self {
        match sentinel {
            Sentinel::Localhost => Resolution::Localhost,
            Sentinel::NotFound => Resolution::NotFound,
        }
    }

    /// The icon URL, or the sentinel's `data:` URI.
    #[must_use]
    pub fn to_text(&self) -> String {
        match self {
            Resolution::Icon { url } => url.clone(),
            Resolution::Localhost => Sentinel::Localhost.data_uri(),
            Resolution::NotFound => Sentinel::NotFound.data_uri(),
        }
    }

    #[must_use]
    pub fn into_text(self) -> String {
        match self {
            Resolution::Icon { url } => url,
            other => other.to_text(),
        }
    }

    fn describe(&self) -> String {
        match self {
            Resolution::Icon { url } => url.clone(),
            Resolution::Localhost => Sentinel::Localhost.to_string(),
            Resolution::NotFound => Sentinel::NotFound.to_string(),
        }
    }
}

/// What discovery produced before any validation.
enum Discovery {
    Sentinel(Sentinel),
    Static(String),
    /// Absolute URLs in validation order; never empty.
    Candidates(Vec<String>),
}

/// Resolves website references to icons.
///
/// Cheap to clone; clones share the HTTP connection pool, settings and
/// override table. No state is carried between calls.
#[derive(Debug, Clone)]
pub struct FaviconResolver {
    client: FetchClient,
    settings: Arc<ResolverSettings>,
    overrides: Arc<OverrideTable>,
}

impl FaviconResolver {
    /// # Errors
    ///
    /// Returns [`ResolveError::Http`] if the HTTP client cannot be built.
    pub fn new(settings: ResolverSettings, overrides: OverrideTable) -> Result<Self, ResolveError> {
        let client = FetchClient::new(&settings.user_agent, settings.timeouts)?;
        Ok(Self::from_parts(client, settings, overrides))
    }

    /// Uses a caller-built `reqwest::Client` (custom DNS, proxies).
    #[must_use]
    pub fn with_http_client(
        client: reqwest::Client,
        settings: ResolverSettings,
        overrides: OverrideTable,
    ) -> Self {
        let client = FetchClient::with_client(client, &settings.user_agent, settings.timeouts);
        Self::from_parts(client, settings, overrides)
    }

    fn from_parts(client: FetchClient, settings: ResolverSettings, overrides: OverrideTable) -> Self {
        Self {
            client,
            settings: Arc::new(settings),
            overrides: Arc::new(overrides),
        }
    }

    /// Icon URL for `query`, or a sentinel `data:` URI.
    pub async fn resolve_as_text(&self, query: &str) -> String {
        self.resolve(query, ResolveOptions::default())
            .await
            .into_text()
    }

    /// Icon bytes for `query`, or sentinel SVG bytes.
    pub async fn resolve_as_image(&self, query: &str) -> IconImage {
        self.resolve_image(query, ResolveOptions::default()).await
    }

    pub async fn resolve(&self, query: &str, options: ResolveOptions) -> Resolution {
        let mut diagnostics = Diagnostics::new(query);
        self.resolve_traced(query, options, &mut diagnostics).await
    }

    pub async fn resolve_image(&self, query: &str, options: ResolveOptions) -> IconImage {
        let mut diagnostics = Diagnostics::new(query);

        let image = match self.discover(query, &mut diagnostics).await {
            Discovery::Sentinel(sentinel) => return IconImage::sentinel(sentinel),
            Discovery::Static(url) => self.download_one(&url, &mut diagnostics).await,
            Discovery::Candidates(urls) if options.fast => match urls.first() {
                Some(url) => self.download_one(url, &mut diagnostics).await,
                None => None,
            },
            Discovery::Candidates(urls) => self
                .client
                .first_valid_icon(&urls, &mut diagnostics)
                .await
                .map(|(_, image)| image),
        };

        image.unwrap_or_else(|| {
            tracing::info!(query, "no icon found");
            IconImage::sentinel(Sentinel::NotFound)
        })
    }

    /// Every candidate URL in validation order, without fetching any icon.
    ///
    /// Sentinel outcomes give a single `data:` URI.
    pub async fn list_candidates(&self, query: &str) -> Vec<String> {
        let mut diagnostics = Diagnostics::new(query);
        match self.discover(query, &mut diagnostics).await {
            Discovery::Sentinel(sentinel) => vec![sentinel.data_uri()],
            Discovery::Static(url) => vec![url],
            Discovery::Candidates(urls) => urls,
        }
    }

    /// Runs a fast-mode resolution and returns its trace.
    pub async fn debug(&self, query: &str) -> Diagnostics {
        let mut diagnostics = Diagnostics::new(query);
        self.resolve_traced(query, ResolveOptions::fast(), &mut diagnostics)
            .await;
        diagnostics
    }

    async fn resolve_traced(
        &self,
        query: &str,
        options: ResolveOptions,
        diagnostics: &mut Diagnostics,
    ) -> Resolution {
        let resolution = match self.discover(query, diagnostics).await {
            Discovery::Sentinel(sentinel) => Resolution::sentinel(sentinel),
            Discovery::Static(url) => Resolution::Icon { url },
            Discovery::Candidates(urls) if options.fast => urls
                .into_iter()
                .next()
                .map_or(Resolution::NotFound, |url| Resolution::Icon { url }),
            Discovery::Candidates(urls) => {
                match self.client.first_valid_icon(&urls, diagnostics).await {
                    Some((url, _)) => Resolution::Icon { url },
                    None => Resolution::NotFound,
                }
            }
        };

        diagnostics.outcome = Some(resolution.describe());
        tracing::debug!(query, outcome = %resolution.describe(), "resolved");
        resolution
    }

    async fn download_one(&self, url: &str, diagnostics: &mut Diagnostics) -> Option<IconImage> {
        match self.client.fetch_icon(url).await {
            Ok(image) => Some(image),
            Err(e) => {
                diagnostics.record_failure(&e);
                None
            }
        }
    }

    async fn discover(&self, query: &str, diagnostics: &mut Diagnostics) -> Discovery {
        let (normalized, url) = match classify_query(query) {
            Ok(QueryTarget::Remote { normalized, url }) => (normalized, url),
            Ok(QueryTarget::Localhost) => {
                diagnostics.classification = Some(Classification::Localhost);
                return Discovery::Sentinel(Sentinel::Localhost);
            }
            Err(e) => {
                diagnostics.classification = Some(Classification::Invalid);
                diagnostics.record_failure(&e);
                return Discovery::Sentinel(Sentinel::NotFound);
            }
        };
        diagnostics.normalized = Some(normalized.clone());

        if let Some(icon) = self.overrides.lookup(&normalized) {
            tracing::debug!(query, icon = %icon, "static override hit");
            diagnostics.classification = Some(Classification::StaticHit);
            diagnostics.candidates = vec![IconCandidate::new(
                icon.as_str(),
                DEFAULT_ICON_SIZE,
                CandidateSource::Static,
            )];
            diagnostics.paths = vec![icon.clone()];
            return Discovery::Static(icon);
        }
        diagnostics.classification = Some(Classification::Remote);

        let (base, found, bot_challenge) = self.page_candidates(&url, diagnostics).await;
        diagnostics.base_url = Some(base.to_string());

        let mut ranked = rank_candidates(
            found,
            self.settings.target_size,
            self.settings.touch_icon_policy,
        );

        let mut paths: Vec<String> = Vec::with_capacity(ranked.len() + 2);
        for candidate in &ranked {
            if let Some(path) = resolve_href(&candidate.href, &base) {
                if !paths.contains(&path) {
                    paths.push(path);
                }
            }
        }

        // Hrefs that resolve to nothing do not count as a yield.
        let page_yielded = !paths.is_empty();
        if !page_yielded {
            let last_resort = IconCandidate::last_resort();
            if let Some(path) = resolve_href(&last_resort.href, &base) {
                paths.push(path);
            }
            ranked.push(last_resort);
        }

        if !page_yielded || bot_challenge {
            if let Some(proxy) = self.settings.proxy_url(&base) {
                ranked.push(IconCandidate::new(
                    proxy.as_str(),
                    PROXY_ICON_SIZE,
                    CandidateSource::WellKnown,
                ));
                if !paths.contains(&proxy) {
                    paths.push(proxy);
                }
            }
        }

        diagnostics.candidates = ranked;
        diagnostics.paths.clone_from(&paths);
        Discovery::Candidates(paths)
    }

    /// Fetches the page and its manifest.
    ///
    /// Returns the effective base URL, the unranked page and manifest
    /// candidates, and whether the page was a bot challenge. Failures only
    /// shrink the candidate list.
    async fn page_candidates(
        &self,
        url: &Url,
        diagnostics: &mut Diagnostics,
    ) -> (Url, Vec<IconCandidate>, bool) {
        let page = match self.client.fetch_page(url).await {
            Ok(page) => page,
            Err(e) => {
                tracing::info!(url = %url, error = %e, "page unavailable");
                diagnostics.record_failure(&e);
                return (url.clone(), Vec::new(), false);
            }
        };

        diagnostics.redirected = page.redirected;
        diagnostics.bot_challenge = page.bot_challenge;
        diagnostics.html_length = Some(page.body.len());
        let base = page.final_url;

        if page.bot_challenge {
            tracing::info!(url = %base, "bot challenge page");
            diagnostics.record_failure(&ResolveError::BotChallenge {
                url: base.to_string(),
            });
            return (base, Vec::new(), true);
        }

        let scan = scan_head(&page.body);
        diagnostics.tags = scan.tags;
        let mut found = scan.icons;

        if let Some(manifest_url) = scan
            .manifest
            .as_deref()
            .and_then(|href| resolve_href(href, &base))
        {
            diagnostics.manifest = Some(manifest_url.clone());
            match self.client.fetch_manifest(&manifest_url).await {
                Ok(manifest) => {
                    let icons = manifest_candidates(&manifest);
                    diagnostics.manifest_icons = icons.iter().map(|c| c.href.clone()).collect();
                    found.extend(icons);
                }
                Err(e) => {
                    tracing::debug!(url = %manifest_url, error = %e, "manifest unavailable");
                    diagnostics.record_failure(&e);
                }
            }
        }

        (base, found, false)
    }
}
