//! Placeholder icons served when no real icon applies.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

const LOCALHOST_SVG: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 144 144"><rect width="144" height="144" rx="32" fill="#2b2d31"/><path d="M36 48h72v44H36z" fill="none" stroke="#f2f3f5" stroke-width="8" stroke-linejoin="round"/><path d="M56 108h32M72 92v16" stroke="#f2f3f5" stroke-width="8" stroke-linecap="round"/></svg>"##;

const NOTFOUND_SVG: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 144 144"><rect width="144" height="144" rx="32" fill="#d9dadc"/><circle cx="72" cy="72" r="36" fill="none" stroke="#6d6f78" stroke-width="8"/><path d="M36 72h72M72 36c-14 18-14 54 0 72M72 36c14 18 14 54 0 72" fill="none" stroke="#6d6f78" stroke-width="6"/></svg>"##;

pub const SVG_MIME: &str = "image/svg+xml";

// Keep characters that are safe inside a data URI unescaped so the
// encoded SVG stays readable.
const DATA_URI_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'/')
    .remove(b':')
    .remove(b'=')
    .remove(b'(')
    .remove(b')')
    .remove(b',')
    .remove(b'\'');

/// Fixed outcomes returned instead of a discovered icon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentinel {
    /// The query targets a loopback host.
    Localhost,
    /// No candidate validated, or the query was unusable.
    NotFound,
}

impl Sentinel {
    #[must_use]
    pub fn svg(self) -> &'static str {
        match self {
            Sentinel::Localhost => LOCALHOST_SVG,
            Sentinel::NotFound => NOTFOUND_SVG,
        }
    }

    #[must_use]
    pub fn mime_type(self) -> &'static str {
        SVG_MIME
    }

    /// `data:image/svg+xml,...` form, usable directly as an `<img src>`.
    #[must_use]
    pub fn data_uri(self) -> String {
        format!(
            "data:{SVG_MIME},{}",
            utf8_percent_encode(self.svg(), DATA_URI_SET)
        )
    }
}

impl std::fmt::Display for Sentinel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Sentinel::Localhost => write!(f, "localhost"),
            Sentinel::NotFound => write!(f, "notfound"),
        }
    }
}
