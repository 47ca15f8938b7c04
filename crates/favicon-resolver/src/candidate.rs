use serde::Serialize;

/// Size assumed when an icon declares none, or an unparsable one.
pub const DEFAULT_ICON_SIZE: i32 = 48;

/// Size given to `<meta name="apple-touch-icon">` declarations.
pub const APPLE_META_ICON_SIZE: i32 = 100;

/// Size of the synthetic `/favicon.ico` candidate: ranks behind anything
/// declared by the page.
pub const LAST_RESORT_SIZE: i32 = -1024;

pub const ROOT_FAVICON_PATH: &str = "/favicon.ico";

/// Where a candidate was discovered.
///
/// Variant order mirrors discovery order, which is also the tie-break order
/// of the ranker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum CandidateSource {
    Static,
    HtmlMeta,
    HtmlLink,
    Manifest,
    WellKnown,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IconCandidate {
    pub href: String,
    pub size: i32,
    pub is_touch_icon: bool,
    pub source: CandidateSource,
}

impl IconCandidate {
    #[must_use]
    pub fn new(href: impl Into<String>, size: i32, source: CandidateSource) -> Self {
        Self {
            href: href.into(),
            size,
            is_touch_icon: false,
            source,
        }
    }

    #[must_use]
    pub fn touch(mut self, is_touch_icon: bool) -> Self {
        self.is_touch_icon = is_touch_icon;
        self
    }

    /// `/favicon.ico` at the site root, tried when nothing else was found.
    #[must_use]
    pub fn last_resort() -> Self {
        Self::new(ROOT_FAVICON_PATH, LAST_RESORT_SIZE, CandidateSource::WellKnown)
    }
}

/// Leading number of a `sizes` value: `"32x32"` → 32, `"16x16 32x32"` → 16.
///
/// Empty, `"any"`, zero, and otherwise unparsable values give
/// [`DEFAULT_ICON_SIZE`].
#[must_use]
pub fn parse_size(sizes: &str) -> i32 {
    let trimmed = sizes.trim_start();
    let digits_end = trimmed
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(trimmed.len());

    match trimmed[..digits_end].parse::<i32>() {
        Ok(size) if size > 0 => size,
        _ => DEFAULT_ICON_SIZE,
    }
}
