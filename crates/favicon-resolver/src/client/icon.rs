use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use favicon_core::Sentinel;
use percent_encoding::percent_decode_str;
use reqwest::header::CONTENT_TYPE;
use reqwest::StatusCode;

use super::FetchClient;
use crate::diagnostics::Diagnostics;
use crate::error::ResolveError;

/// Icons larger than this are rejected without reading the rest of the body.
const MAX_ICON_BYTES: usize = 5 * 1024 * 1024;

const IMAGE_ACCEPT: &str = "image/avif,image/webp,image/apng,image/svg+xml,image/*,*/*;q=0.8";

/// Raw icon bytes and their MIME type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IconImage {
    pub bytes: Vec<u8>,
    pub mime_type: String,
}

impl IconImage {
    #[must_use]
    pub fn sentinel(sentinel: Sentinel) -> Self {
        Self {
            bytes: sentinel.svg().as_bytes().to_vec(),
            mime_type: sentinel.mime_type().to_string(),
        }
    }
}

impl FetchClient {
    /// Downloads the icon at `url` and checks that it is an image.
    ///
    /// `data:image/...` URIs are decoded locally without a request.
    ///
    /// # Errors
    ///
    /// - [`ResolveError::Timeout`]: no response within the icon timeout.
    /// - [`ResolveError::IconRejected`]: network failure, a status other
    ///   than 200, a non-image `content-type`, or an oversized body.
    pub async fn fetch_icon(&self, url: &str) -> Result<IconImage, ResolveError> {
        let rejected = |reason: String| ResolveError::IconRejected {
            url: url.to_owned(),
            reason,
        };

        if url.get(..5).is_some_and(|p| p.eq_ignore_ascii_case("data:")) {
            return decode_data_uri(url).ok_or_else(|| rejected("undecodable data URI".into()));
        }

        let response = self
            .get(url, self.timeouts.icon)
            .header(reqwest::header::ACCEPT, IMAGE_ACCEPT)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ResolveError::Timeout {
                        url: url.to_owned(),
                    }
                } else {
                    rejected(e.to_string())
                }
            })?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(rejected(format!("HTTP {}", status.as_u16())));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        if !content_type.to_ascii_lowercase().contains("image") {
            return Err(rejected(format!("content-type {content_type:?} is not an image")));
        }

        if response
            .content_length()
            .is_some_and(|len| len > MAX_ICON_BYTES as u64)
        {
            return Err(rejected("body too large".into()));
        }

        let bytes = response.bytes().await.map_err(|e| {
            if e.is_timeout() {
                ResolveError::Timeout {
                    url: url.to_owned(),
                }
            } else {
                rejected(e.to_string())
            }
        })?;
        if bytes.len() > MAX_ICON_BYTES {
            return Err(rejected("body too large".into()));
        }

        Ok(IconImage {
            bytes: bytes.to_vec(),
            mime_type: mime_essence(&content_type),
        })
    }

    /// Tries `urls` in order and returns the first that serves an image.
    ///
    /// Rejections are recorded on `diagnostics`. `None` means every candidate
    /// failed.
    pub async fn first_valid_icon(
        &self,
        urls: &[String],
        diagnostics: &mut Diagnostics,
    ) -> Option<(String, IconImage)> {
        for url in urls {
            match self.fetch_icon(url).await {
                Ok(image) => {
                    tracing::debug!(url = %url, mime = %image.mime_type, "icon validated");
                    return Some((url.clone(), image));
                }
                Err(e) => diagnostics.record_failure(&e),
            }
        }
        diagnostics.record_failure(&ResolveError::NoCandidateValidated { tried: urls.len() });
        None
    }
}

/// Decodes a `data:image/...` URI, base64 or percent-encoded.
///
/// Returns `None` for non-image or malformed URIs.
#[must_use]
pub fn decode_data_uri(uri: &str) -> Option<IconImage> {
    if !uri.get(..5)?.eq_ignore_ascii_case("data:") {
        return None;
    }
    let (meta, payload) = uri[5..].split_once(',')?;

    let mut params = meta.split(';');
    let mime_type = params.next().unwrap_or_default().trim().to_ascii_lowercase();
    if !mime_type.starts_with("image/") {
        return None;
    }
    let is_base64 = params.any(|p| p.trim().eq_ignore_ascii_case("base64"));

    let bytes = if is_base64 {
        let compact: String = payload.chars().filter(|c| !c.is_ascii_whitespace()).collect();
        let decoded = percent_decode_str(&compact).decode_utf8().ok()?;
        STANDARD.decode(decoded.as_bytes()).ok()?
    } else {
        percent_decode_str(payload).collect()
    };

    if bytes.is_empty() {
        return None;
    }

    Some(IconImage { bytes, mime_type })
}

fn mime_essence(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_base64_data_uri() {
        let image = decode_data_uri("data:image/png;base64,iVBORw0KGgo=").expect("decodes");
        assert_eq!(image.mime_type, "image/png");
        assert_eq!(image.bytes, b"\x89PNG\r\n\x1a\n");
    }

    #[test]
    fn decodes_percent_encoded_svg() {
        let image =
            decode_data_uri("data:image/svg+xml,%3Csvg%20xmlns%3D%22x%22%2F%3E").expect("decodes");
        assert_eq!(image.mime_type, "image/svg+xml");
        assert_eq!(image.bytes, br#"<svg xmlns="x"/>"#);
    }

    #[test]
    fn sentinel_data_uris_decode_back_to_svg() {
        for sentinel in [Sentinel::Localhost, Sentinel::NotFound] {
            let image = decode_data_uri(&sentinel.data_uri()).expect("decodes");
            assert_eq!(image, IconImage::sentinel(sentinel));
        }
    }

    #[test]
    fn rejects_non_image_and_malformed_uris() {
        assert!(decode_data_uri("data:text/html,<b>hi</b>").is_none());
        assert!(decode_data_uri("data:image/png;base64").is_none());
        assert!(decode_data_uri("data:image/png;base64,!!!!").is_none());
        assert!(decode_data_uri("data:image/png,").is_none());
        assert!(decode_data_uri("https://example.com/icon.png").is_none());
    }

    #[test]
    fn mime_essence_strips_parameters() {
        assert_eq!(mime_essence("image/SVG+xml; charset=utf-8"), "image/svg+xml");
        assert_eq!(mime_essence("image/x-icon"), "image/x-icon");
    }
}
