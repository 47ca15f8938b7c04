use thiserror::Error;

/// Failures inside the resolution pipeline.
///
/// Apart from [`ResolveError::Http`] (raised while building the HTTP client),
/// none of these reach callers of the resolver entry points: each one removes
/// a single source of candidates, or ends in the `notfound` sentinel, and is
/// recorded in [`crate::Diagnostics`].
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid query \"{query}\": {reason}")]
    InvalidQuery { query: String, reason: String },

    #[error("page unreachable at {url}: {reason}")]
    UnreachablePage { url: String, reason: String },

    #[error("timed out fetching {url}")]
    Timeout { url: String },

    #[error("bot challenge served by {url}")]
    BotChallenge { url: String },

    #[error("manifest unavailable at {url}: {reason}")]
    ManifestUnavailable { url: String, reason: String },

    #[error("JSON deserialization error for manifest {url}: {source}")]
    ManifestMalformed {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("icon rejected at {url}: {reason}")]
    IconRejected { url: String, reason: String },

    #[error("no candidate validated ({tried} tried)")]
    NoCandidateValidated { tried: usize },
}

impl ResolveError {
    /// Maps a transport error from `url` to `Timeout` or `UnreachablePage`.
    pub(crate) fn from_transport(url: &str, err: &reqwest::Error) -> Self {
        if err.is_timeout() {
            ResolveError::Timeout {
                url: url.to_owned(),
            }
        } else {
            ResolveError::UnreachablePage {
                url: url.to_owned(),
                reason: err.to_string(),
            }
        }
    }
}
