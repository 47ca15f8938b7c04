//! Curated domain → icon table consulted before any network lookup.
//!
//! High-traffic sites and sites behind anti-bot interstitials are cheaper and
//! more reliable to answer from this table than by scraping. Matching is plain
//! substring containment of a token in the normalized query, first entry wins,
//! so more specific tokens (`mail.google.com`) must precede broader ones
//! (`google.com`).

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{AppConfig, ConfigError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverrideEntry {
    #[serde(rename = "match")]
    pub match_tokens: Vec<String>,
    /// Absolute icon URL, or a file name relative to the static asset host.
    pub icon: String,
}

impl OverrideEntry {
    fn new(tokens: &[&str], icon: &str) -> Self {
        Self {
            match_tokens: tokens.iter().map(|t| (*t).to_string()).collect(),
            icon: icon.to_string(),
        }
    }

    #[must_use]
    pub fn matches(&self, query: &str) -> bool {
        self.match_tokens
            .iter()
            .any(|token| !token.is_empty() && query.contains(token.as_str()))
    }
}

#[derive(Debug, Deserialize)]
pub struct OverridesFile {
    pub overrides: Vec<OverrideEntry>,
}

#[derive(Debug, Clone, Default)]
pub struct OverrideTable {
    entries: Vec<OverrideEntry>,
    static_host: Option<String>,
}

impl OverrideTable {
    #[must_use]
    pub fn new(entries: Vec<OverrideEntry>, static_host: Option<String>) -> Self {
        Self {
            entries,
            static_host,
        }
    }

    /// Table with no entries; every query goes through live discovery.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn builtin() -> Self {
        Self::new(builtin_entries(), None)
    }

    #[must_use]
    pub fn with_static_host(mut self, static_host: Option<String>) -> Self {
        self.static_host = static_host;
        self
    }

    /// Table described by `config`: the YAML file at `overrides_path` when
    /// set, otherwise the built-in table, joined onto `static_host`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the overrides file cannot be loaded.
    pub fn from_app_config(config: &AppConfig) -> Result<Self, ConfigError> {
        let entries = match &config.overrides_path {
            Some(path) => {
                let entries = load_overrides(path)?;
                tracing::info!(path = %path.display(), count = entries.len(), "loaded override table");
                entries
            }
            None => builtin_entries(),
        };
        Ok(Self::new(entries, config.static_host.clone()))
    }

    #[must_use]
    pub fn entries(&self) -> &[OverrideEntry] {
        &self.entries
    }

    #[must_use]
    pub fn find(&self, query: &str) -> Option<&OverrideEntry> {
        self.entries.iter().find(|entry| entry.matches(query))
    }

    /// Absolute icon URL for the first entry matching `query`.
    ///
    /// An entry whose icon is a bare file name only resolves when a static
    /// host is configured; otherwise the lookup misses and live discovery
    /// runs as usual.
    #[must_use]
    pub fn lookup(&self, query: &str) -> Option<String> {
        let entry = self.find(query)?;
        let resolved = self.icon_url(&entry.icon);
        if resolved.is_none() {
            tracing::warn!(
                icon = %entry.icon,
                "override icon is a file name but no static host is configured"
            );
        }
        resolved
    }

    fn icon_url(&self, icon: &str) -> Option<String> {
        if is_absolute_icon(icon) {
            return Some(icon.to_string());
        }
        let host = self.static_host.as_deref()?;
        Some(format!(
            "{}/{}",
            host.trim_end_matches('/'),
            icon.trim_start_matches('/')
        ))
    }
}

fn is_absolute_icon(icon: &str) -> bool {
    icon.starts_with("https://") || icon.starts_with("http://") || icon.starts_with("data:image/")
}

/// Load and validate an override table from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_overrides(path: &Path) -> Result<Vec<OverrideEntry>, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::OverridesFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let file: OverridesFile = serde_yaml::from_str(&content)?;
    validate_overrides(&file.overrides)?;

    Ok(file.overrides)
}

fn validate_overrides(entries: &[OverrideEntry]) -> Result<(), ConfigError> {
    let mut seen_tokens = HashSet::new();

    for (index, entry) in entries.iter().enumerate() {
        if entry.icon.trim().is_empty() {
            return Err(ConfigError::Validation(format!(
                "override #{index} has an empty icon"
            )));
        }

        if entry.match_tokens.iter().all(|t| t.trim().is_empty()) {
            return Err(ConfigError::Validation(format!(
                "override #{index} ('{}') has no match tokens",
                entry.icon
            )));
        }

        for token in &entry.match_tokens {
            if !seen_tokens.insert(token.as_str()) {
                return Err(ConfigError::Validation(format!(
                    "duplicate match token: '{token}' (icon '{}')",
                    entry.icon
                )));
            }
        }
    }

    Ok(())
}

fn builtin_entries() -> Vec<OverrideEntry> {
    vec![
        OverrideEntry::new(
            &["twitter.com"],
            "https://upload.wikimedia.org/wikipedia/commons/6/6f/Logo_of_Twitter.svg",
        ),
        OverrideEntry::new(
            &["instagram.com"],
            "https://static.cdninstagram.com/rsrc.php/v3/ys/r/aM-g435MtEX.png",
        ),
        OverrideEntry::new(
            &["keep.google.com"],
            "https://ssl.gstatic.com/keep/keep_2023q4.ico",
        ),
        OverrideEntry::new(
            &["contacts.google.com"],
            "https://ssl.gstatic.com/images/branding/product/2x/contacts_2022_96dp.png",
        ),
        OverrideEntry::new(
            &["photos.google.com"],
            "https://ssl.gstatic.com/social/photosui/images/logo/2x/photos_96dp.png",
        ),
        OverrideEntry::new(
            &["messages.google.com"],
            "https://ssl.gstatic.com/android-messages-web/images/2022.3/2x/messages_2022_96dp.png",
        ),
        OverrideEntry::new(
            &["google.com/maps", "maps.google.com"],
            "https://maps.gstatic.com/mapfiles/maps_lite/pwa/icons/maps15_bnuw3a_round_192x192.png",
        ),
        OverrideEntry::new(
            &["calendar.google.com"],
            "https://www.gstatic.com/calendar/images/manifest/logo_2020q4_192.png",
        ),
        OverrideEntry::new(
            &["mail.google.com", "gmail.com"],
            "https://ssl.gstatic.com/ui/v1/icons/mail/rfr/gmail.ico",
        ),
        OverrideEntry::new(
            &["google.com"],
            "https://www.google.com/images/branding/googleg/1x/googleg_standard_color_128dp.png",
        ),
        OverrideEntry::new(
            &["outlook.office365.com"],
            "https://upload.wikimedia.org/wikipedia/commons/thumb/d/df/Microsoft_Office_Outlook_%282018%E2%80%93present%29.svg/258px-Microsoft_Office_Outlook_%282018%E2%80%93present%29.svg.png",
        ),
        OverrideEntry::new(
            &["twitch.tv"],
            "https://upload.wikimedia.org/wikipedia/commons/7/74/Twitch-icon-5.png",
        ),
        OverrideEntry::new(
            &["icloud.com/mail/"],
            "https://upload.wikimedia.org/wikipedia/commons/4/4e/Mail_%28iOS%29.svg",
        ),
        OverrideEntry::new(
            &["spotify.com"],
            "https://upload.wikimedia.org/wikipedia/commons/1/19/Spotify_logo_without_text.svg",
        ),
        OverrideEntry::new(
            &["whatsapp.com"],
            "https://upload.wikimedia.org/wikipedia/commons/1/19/WhatsApp_logo-color-vertical.svg",
        ),
        OverrideEntry::new(
            &["reddit.com"],
            "https://www.redditstatic.com/desktop2x/img/favicon/android-icon-192x192.png",
        ),
        OverrideEntry::new(
            &[
                "amazon.com",
                "amazon.ca",
                "amazon.fr",
                "amazon.de",
                "amazon.it",
                "amazon.co.uk",
            ],
            "https://upload.wikimedia.org/wikipedia/commons/4/4a/Amazon_icon.svg",
        ),
        OverrideEntry::new(
            &["youtube.com"],
            "https://www.youtube.com/s/desktop/32c4e480/img/favicon_144x144.png",
        ),
        OverrideEntry::new(
            &["linkedin.com"],
            "https://upload.wikimedia.org/wikipedia/commons/8/81/LinkedIn_icon.svg",
        ),
        OverrideEntry::new(
            &["monoprix.com", "monoprix.fr"],
            "https://client.monoprix.fr/images/favicons/apple-touch-icon.png",
        ),
        OverrideEntry::new(
            &["discord.com"],
            "https://assets-global.website-files.com/6257adef93867e50d84d30e2/636e0a69f118df70ad7828d4_icon_clyde_blurple_RGB.svg",
        ),
    ]
}

#[cfg(test)]
#[path = "overrides_test.rs"]
mod tests;
