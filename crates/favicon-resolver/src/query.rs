//! Query classification.

use std::net::IpAddr;

use reqwest::Url;

use crate::error::ResolveError;

/// What a validated query points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryTarget {
    /// A loopback or unspecified host; answered with the localhost sentinel.
    Localhost,
    /// A remote website.
    Remote {
        /// Query text after scheme normalization, used for override matching.
        normalized: String,
        url: Url,
    },
}

/// Validates and categorizes a raw query.
///
/// Bare domains get an `https://` prefix. Only `http` and `https` URLs whose
/// host is an IP literal, `localhost`, or a dotted name are accepted.
///
/// # Errors
///
/// Returns [`ResolveError::InvalidQuery`] for anything that cannot be
/// fetched as a website.
pub fn classify_query(raw: &str) -> Result<QueryTarget, ResolveError> {
    let trimmed = raw.trim();
    let invalid = |reason: &str| ResolveError::InvalidQuery {
        query: raw.to_owned(),
        reason: reason.to_owned(),
    };

    if trimmed.is_empty() {
        return Err(invalid("empty query"));
    }

    let normalized = if has_scheme(trimmed) {
        trimmed.to_owned()
    } else {
        format!("https://{trimmed}")
    };

    let url = Url::parse(&normalized).map_err(|e| invalid(&e.to_string()))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid("scheme must be http or https"));
    }

    let host = url.host_str().ok_or_else(|| invalid("missing host"))?;

    if is_loopback_host(host) {
        return Ok(QueryTarget::Localhost);
    }

    if parse_ip(host).is_none() && !host.trim_end_matches('.').contains('.') {
        return Err(invalid("host is not a domain name"));
    }

    Ok(QueryTarget::Remote { normalized, url })
}

fn has_scheme(query: &str) -> bool {
    query.find("://").is_some_and(|i| {
        i > 0
            && query[..i]
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
    })
}

fn parse_ip(host: &str) -> Option<IpAddr> {
    host.trim_start_matches('[')
        .trim_end_matches(']')
        .parse::<IpAddr>()
        .ok()
}

fn is_loopback_host(host: &str) -> bool {
    let host = host.trim_end_matches('.').to_ascii_lowercase();
    if host == "localhost" || host.ends_with(".localhost") {
        return true;
    }
    parse_ip(&host).is_some_and(|ip| ip.is_loopback() || ip.is_unspecified())
}
