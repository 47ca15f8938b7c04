//! Turns any href form into an absolute URL anchored at the page.

use reqwest::Url;

/// Resolves `href` against `base`.
///
/// Rules, first match wins:
/// 1. `data:image/...` passes through unchanged.
/// 2. `http://` / `https://` passes through unchanged.
/// 3. `//host/path` takes the base scheme.
/// 4. `/path` is appended to the base origin.
/// 5. Anything else is appended to the base origin plus base path, joined by
///    exactly one `/`.
///
/// Note rule 5 treats the base path as a directory, so `icon.png` on
/// `https://a.com/blog/post` gives `https://a.com/blog/post/icon.png`, not
/// RFC 3986 sibling resolution.
///
/// Returns `None` for empty hrefs and for non-image `data:` URIs.
#[must_use]
pub fn resolve_href(href: &str, base: &Url) -> Option<String> {
    let href = href.trim();
    if href.is_empty() {
        return None;
    }

    let lower = href.get(..8).unwrap_or(href).to_ascii_lowercase();

    if lower.starts_with("data:") {
        return href
            .get(..11)
            .filter(|p| p.eq_ignore_ascii_case("data:image/"))
            .map(|_| href.to_string());
    }

    if lower.starts_with("http://") || lower.starts_with("https://") {
        return Some(href.to_string());
    }

    if href.starts_with("//") {
        return Some(format!("{}:{href}", base.scheme()));
    }

    let origin = origin(base);

    if href.starts_with('/') {
        return Some(format!("{origin}{href}"));
    }

    let relative = href.trim_start_matches("./");
    let path = base.path().trim_end_matches('/');
    Some(format!("{origin}{path}/{relative}"))
}

/// `scheme://host[:port]` of `base`.
#[must_use]
pub fn origin(base: &Url) -> String {
    base.origin().ascii_serialization()
}
