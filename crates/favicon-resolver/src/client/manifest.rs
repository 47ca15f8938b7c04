use reqwest::StatusCode;

use super::FetchClient;
use crate::error::ResolveError;
use crate::manifest::{parse_manifest, ManifestDocument};

impl FetchClient {
    /// Fetches and parses the web app manifest at `url` under the manifest
    /// timeout.
    ///
    /// # Errors
    ///
    /// - [`ResolveError::ManifestUnavailable`]: network failure, timeout, or
    ///   a status other than 200.
    /// - [`ResolveError::ManifestMalformed`]: the body is not a manifest.
    pub async fn fetch_manifest(&self, url: &str) -> Result<ManifestDocument, ResolveError> {
        let unavailable = |reason: String| ResolveError::ManifestUnavailable {
            url: url.to_owned(),
            reason,
        };

        let response = self
            .get(url, self.timeouts.manifest)
            .header(
                reqwest::header::ACCEPT,
                "application/manifest+json,application/json;q=0.9,*/*;q=0.8",
            )
            .send()
            .await
            .map_err(|e| unavailable(e.to_string()))?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(unavailable(format!("HTTP {}", status.as_u16())));
        }

        let body = response
            .text()
            .await
            .map_err(|e| unavailable(e.to_string()))?;

        parse_manifest(&body).map_err(|e| ResolveError::ManifestMalformed {
            url: url.to_owned(),
            source: e,
        })
    }
}
