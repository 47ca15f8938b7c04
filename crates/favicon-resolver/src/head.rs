//! Icon discovery in an HTML `<head>` by tag-boundary scanning.
//!
//! This is deliberately not an HTML parser. It finds `<link>` and `<meta>`
//! tags by their opening markers, reads their attributes with a small
//! tokenizer, and ignores everything else. Real-world markup is often
//! malformed; the scanner never fails, it just finds fewer tags.

use serde::Serialize;

use crate::candidate::{parse_size, CandidateSource, IconCandidate, APPLE_META_ICON_SIZE};

/// Everything icon-related found in a document head.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HeadScan {
    /// Candidates in discovery order: touch-icon metas, then icon links.
    pub icons: Vec<IconCandidate>,
    /// `href` of the last `<link rel="manifest">`, unresolved.
    pub manifest: Option<String>,
    /// Raw icon-relevant tags, kept for diagnostics.
    pub tags: Vec<String>,
}

/// Scans `html` for icon `<link>` tags, Apple touch-icon `<meta>` tags and
/// the manifest link.
#[must_use]
pub fn scan_head(html: &str) -> HeadScan {
    let head = truncate_at_head_end(html);
    let head = strip_scripts(head);

    let mut scan = HeadScan::default();

    for tag in find_tags(&head, "meta") {
        let attrs = parse_attributes(tag);
        let name = attr(&attrs, "name").unwrap_or_default().to_ascii_lowercase();
        if !name.contains("apple-touch-icon") {
            continue;
        }
        let Some(content) = attr(&attrs, "content").map(clean_href) else {
            continue;
        };
        if content.is_empty() {
            continue;
        }
        scan.tags.push(tag.to_string());
        scan.icons.push(
            IconCandidate::new(content, APPLE_META_ICON_SIZE, CandidateSource::HtmlMeta)
                .touch(true),
        );
    }

    for tag in find_tags(&head, "link") {
        let attrs = parse_attributes(tag);
        let rel = attr(&attrs, "rel").unwrap_or_default().to_ascii_lowercase();
        let href = attr(&attrs, "href").map(clean_href).unwrap_or_default();
        if href.is_empty() {
            continue;
        }

        if rel.contains("manifest") {
            scan.tags.push(tag.to_string());
            scan.manifest = Some(href.clone());
        }

        if rel.contains("icon") {
            let size = attr(&attrs, "sizes").map_or_else(|| parse_size(""), parse_size);
            let is_touch = rel.contains("apple-touch") || rel.contains("fluid");
            scan.tags.push(tag.to_string());
            scan.icons
                .push(IconCandidate::new(href, size, CandidateSource::HtmlLink).touch(is_touch));
        }
    }

    scan
}

/// Content before `</head>`, or the whole document when there is none.
fn truncate_at_head_end(html: &str) -> &str {
    match find_ascii_ci(html, "</head", 0) {
        Some(end) => &html[..end],
        None => html,
    }
}

/// Removes `<script>` elements so markup inside inline scripts is not
/// mistaken for real tags. An unterminated script drops the remainder.
fn strip_scripts(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut pos = 0;

    while let Some(start) = find_tag_open(html, "script", pos) {
        out.push_str(&html[pos..start]);
        let Some(close) = find_ascii_ci(html, "</script", start) else {
            return out;
        };
        pos = html[close..].find('>').map_or(html.len(), |i| close + i + 1);
    }

    out.push_str(&html[pos..]);
    out
}

/// Every `<name ...>` tag in `html`, including the angle brackets.
fn find_tags<'a>(html: &'a str, name: &str) -> Vec<&'a str> {
    let mut tags = Vec::new();
    let mut pos = 0;

    while let Some(start) = find_tag_open(html, name, pos) {
        let end = tag_end(html, start + 1 + name.len());
        tags.push(&html[start..end]);
        pos = end;
    }

    tags
}

/// Offset of the next `<name` that is followed by a tag-name boundary, so
/// `<link` does not match `<linkage`.
fn find_tag_open(html: &str, name: &str, from: usize) -> Option<usize> {
    let marker = format!("<{name}");
    let mut pos = from;

    while let Some(start) = find_ascii_ci(html, &marker, pos) {
        let after = start + marker.len();
        match html.as_bytes().get(after) {
            None => return Some(start),
            Some(b) if b.is_ascii_whitespace() || *b == b'>' || *b == b'/' => return Some(start),
            Some(_) => pos = after,
        }
    }

    None
}

/// Index just past the `>` that closes a tag whose attributes start at
/// `from`. Quoted attribute values may contain `>`. If a quote never closes,
/// the first raw `>` is used instead.
fn tag_end(html: &str, from: usize) -> usize {
    let bytes = html.as_bytes();
    let mut quote: Option<u8> = None;

    for (offset, &b) in bytes[from..].iter().enumerate() {
        match quote {
            Some(q) if b == q => quote = None,
            Some(_) => {}
            None if b == b'"' || b == b'\'' => quote = Some(b),
            None if b == b'>' => return from + offset + 1,
            None => {}
        }
    }

    html[from..]
        .find('>')
        .map_or(html.len(), |i| from + i + 1)
}

/// Lower-cased attribute names with their raw values, in source order.
///
/// Handles double-quoted, single-quoted, unquoted and valueless attributes.
fn parse_attributes(tag: &str) -> Vec<(String, String)> {
    let inner = tag.trim_start_matches('<');
    let inner = inner.strip_suffix('>').unwrap_or(inner);
    let bytes = inner.as_bytes();

    // Skip the tag name.
    let mut i = bytes
        .iter()
        .position(|b| b.is_ascii_whitespace() || *b == b'/')
        .unwrap_or(bytes.len());

    let mut attrs = Vec::new();

    loop {
        while i < bytes.len() && (bytes[i].is_ascii_whitespace() || bytes[i] == b'/') {
            i += 1;
        }
        if i >= bytes.len() {
            break;
        }

        let name_start = i;
        while i < bytes.len()
            && !bytes[i].is_ascii_whitespace()
            && bytes[i] != b'='
            && bytes[i] != b'/'
        {
            i += 1;
        }
        let name = inner[name_start..i].to_ascii_lowercase();

        while i < bytes.len() && bytes[i].is_ascii_whitespace() {
            i += 1;
        }
        if i >= bytes.len() || bytes[i] != b'=' {
            if !name.is_empty() {
                attrs.push((name, String::new()));
            }
            continue;
        }
        i += 1;
        while i < bytes.len() && bytes[i].is_ascii_whitespace() {
            i += 1;
        }

        let value = if i < bytes.len() && (bytes[i] == b'"' || bytes[i] == b'\'') {
            let quote = bytes[i];
            let value_start = i + 1;
            let value_end = bytes[value_start..]
                .iter()
                .position(|b| *b == quote)
                .map_or(bytes.len(), |p| value_start + p);
            i = (value_end + 1).min(bytes.len());
            &inner[value_start..value_end]
        } else {
            let value_start = i;
            while i < bytes.len() && !bytes[i].is_ascii_whitespace() {
                i += 1;
            }
            inner[value_start..i].trim_end_matches('/')
        };

        if !name.is_empty() {
            attrs.push((name, value.to_string()));
        }
    }

    attrs
}

fn attr<'a>(attrs: &'a [(String, String)], name: &str) -> Option<&'a str> {
    attrs
        .iter()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.as_str())
}

fn clean_href(raw: &str) -> String {
    raw.trim().replace("&amp;", "&")
}

/// ASCII case-insensitive `find` starting at byte offset `from`.
///
/// Lower-casing ASCII keeps byte offsets stable, so indices are valid in
/// the original string.
fn find_ascii_ci(haystack: &str, needle: &str, from: usize) -> Option<usize> {
    let hay = haystack.as_bytes();
    let needle = needle.as_bytes();
    if needle.is_empty() || from >= hay.len() || needle.len() > hay.len() - from {
        return None;
    }

    (from..=hay.len() - needle.len()).find(|&start| {
        hay[start..start + needle.len()]
            .iter()
            .zip(needle)
            .all(|(a, b)| a.eq_ignore_ascii_case(b))
    })
}

#[cfg(test)]
#[path = "head_test.rs"]
mod tests;
