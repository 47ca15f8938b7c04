//! Web app manifest icons.

use serde::Deserialize;

use crate::candidate::{parse_size, CandidateSource, IconCandidate};

/// The part of a web app manifest this crate reads.
#[derive(Debug, Default, Deserialize)]
pub struct ManifestDocument {
    #[serde(default)]
    pub icons: Vec<ManifestIcon>,
}

#[derive(Debug, Deserialize)]
pub struct ManifestIcon {
    #[serde(default)]
    pub src: Option<String>,
    #[serde(default)]
    pub sizes: Option<String>,
}

/// Parses a manifest body.
///
/// # Errors
///
/// Returns the `serde_json` error when the body is not JSON or `icons` does
/// not have the expected shape.
pub fn parse_manifest(body: &str) -> Result<ManifestDocument, serde_json::Error> {
    serde_json::from_str(body)
}

/// One candidate per icon entry with a non-empty `src`. Manifest icons are
/// never touch icons.
#[must_use]
pub fn manifest_candidates(manifest: &ManifestDocument) -> Vec<IconCandidate> {
    manifest
        .icons
        .iter()
        .filter_map(|icon| {
            let src = icon.src.as_deref()?.trim();
            if src.is_empty() {
                return None;
            }
            let size = parse_size(icon.sizes.as_deref().unwrap_or_default());
            Some(IconCandidate::new(src, size, CandidateSource::Manifest))
        })
        .collect()
}
