//! Per-call trace of what the pipeline saw and decided.

use serde::Serialize;

use crate::candidate::IconCandidate;
use crate::error::ResolveError;

/// How the query was classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Classification {
    Invalid,
    Localhost,
    StaticHit,
    Remote,
}

/// Everything recorded during one resolution.
///
/// Created fresh for each call and filled in by each stage; nothing is
/// shared between calls.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Diagnostics {
    pub query: String,
    pub normalized: Option<String>,
    pub classification: Option<Classification>,
    /// Effective base for relative hrefs, after redirects.
    pub base_url: Option<String>,
    pub redirected: bool,
    pub bot_challenge: bool,
    pub html_length: Option<usize>,
    /// Raw `<link>`/`<meta>` tags seen in the head.
    pub tags: Vec<String>,
    pub manifest: Option<String>,
    pub manifest_icons: Vec<String>,
    /// Candidates in rank order, before path resolution.
    pub candidates: Vec<IconCandidate>,
    /// Absolute URLs in the order they are (or would be) validated.
    pub paths: Vec<String>,
    pub failures: Vec<String>,
    pub outcome: Option<String>,
}

impl Diagnostics {
    #[must_use]
    pub fn new(query: &str) -> Self {
        Self {
            query: query.to_string(),
            ..Self::default()
        }
    }

    pub fn record_failure(&mut self, error: &ResolveError) {
        tracing::debug!(query = %self.query, error = %error, "resolution step failed");
        self.failures.push(error.to_string());
    }
}
