use reqwest::{StatusCode, Url};

use super::FetchClient;
use crate::error::ResolveError;

/// A fetched HTML page.
#[derive(Debug, Clone)]
pub struct PageDocument {
    pub body: String,
    /// URL after redirects; relative hrefs resolve against this.
    pub final_url: Url,
    pub redirected: bool,
    /// The body is an anti-bot interstitial rather than the site itself.
    pub bot_challenge: bool,
}

impl FetchClient {
    /// Fetches the HTML at `url` under the page timeout.
    ///
    /// # Errors
    ///
    /// - [`ResolveError::Timeout`]: no response within the page timeout.
    /// - [`ResolveError::UnreachablePage`]: network failure or a status
    ///   other than 200.
    pub async fn fetch_page(&self, url: &Url) -> Result<PageDocument, ResolveError> {
        let response = self
            .get(url.as_str(), self.timeouts.page)
            .send()
            .await
            .map_err(|e| ResolveError::from_transport(url.as_str(), &e))?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(ResolveError::UnreachablePage {
                url: url.to_string(),
                reason: format!("HTTP {}", status.as_u16()),
            });
        }

        let final_url = response.url().clone();
        let redirected = final_url != *url;
        let body = response
            .text()
            .await
            .map_err(|e| ResolveError::from_transport(url.as_str(), &e))?;
        let bot_challenge = looks_like_bot_challenge(&body);

        Ok(PageDocument {
            body,
            final_url,
            redirected,
            bot_challenge,
        })
    }
}

/// Heuristic match on common anti-bot interstitials (Cloudflare and
/// similar).
///
/// The interstitial title, cookie notice and `cf-chl-` token also show up on
/// ordinary pages, so they only count together.
#[must_use]
pub fn looks_like_bot_challenge(body: &str) -> bool {
    let lowered = body.to_ascii_lowercase();
    let has_cloudflare_banner = lowered.contains("attention required! | cloudflare");
    let has_challenge_platform = lowered.contains("/cdn-cgi/challenge-platform/");
    let has_ddos_guard = lowered.contains("<title>ddos-guard</title>");
    let has_just_a_moment = lowered.contains("just a moment...");
    let has_cookie_gate = lowered.contains("please enable cookies");
    let has_cf_chl = lowered.contains("cf-chl-");

    has_cloudflare_banner
        || has_challenge_platform
        || has_ddos_guard
        || (has_just_a_moment && has_cookie_gate)
        || (has_just_a_moment && has_cf_chl)
}
