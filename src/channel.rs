// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: (C) 2025 Cranky Kernel <crankykernel@proton.me>

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;

/// Country code used for channels with no resolvable country.
pub const UNKNOWN_ISO: &str = "XX";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelType {
    #[default]
    Tv,
    Radio,
    Youtube,
    Webcam,
}

impl ChannelType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Tv => "tv",
            Self::Radio => "radio",
            Self::Youtube => "youtube",
            Self::Webcam => "webcam",
        }
    }

    /// Name shown for channels whose feed entry has no usable name
    pub fn placeholder_name(&self) -> &'static str {
        match self {
            Self::Tv => "Unnamed TV channel",
            Self::Radio => "Unnamed radio station",
            Self::Youtube => "Unnamed YouTube channel",
            Self::Webcam => "Unnamed webcam",
        }
    }
}

impl fmt::Display for ChannelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Maps a raw feed type string onto a channel type, defaulting to TV.
pub fn normalize_type(raw: Option<&str>) -> ChannelType {
    match raw.map(|s| s.trim().to_lowercase()).as_deref() {
        Some("radio") => ChannelType::Radio,
        Some("youtube") => ChannelType::Youtube,
        Some("webcam") => ChannelType::Webcam,
        _ => ChannelType::Tv,
    }
}

impl<'de> Deserialize<'de> for ChannelType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value: Value = Deserialize::deserialize(deserializer)?;
        Ok(normalize_type(value.as_str()))
    }
}

/// Uppercases a country code, mapping empty values to the unknown sentinel.
pub fn display_iso(iso: Option<&str>) -> String {
    match iso.map(str::trim) {
        Some(code) if !code.is_empty() => code.to_uppercase(),
        _ => UNKNOWN_ISO.to_string(),
    }
}

/// Derives the stable identity of a channel from its display name.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_dash = false;

    for c in name.chars().flat_map(char::to_lowercase) {
        if c.is_whitespace() {
            pending_dash = true;
            continue;
        }
        if pending_dash {
            slug.push('-');
            pending_dash = false;
        }
        if c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' {
            slug.push(c);
        }
    }

    let trimmed = slug.trim_matches('-');
    if trimmed.is_empty() {
        "channel".to_string()
    } else {
        trimmed.to_string()
    }
}

fn deserialize_lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Value = Deserialize::deserialize(deserializer)?;

    Ok(match value {
        Value::String(s) if !s.trim().is_empty() => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

/// One entry of a channel fragment as written by the scrapers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Channel {
    #[serde(default, deserialize_with = "deserialize_lenient_string")]
    pub iso: Option<String>,
    #[serde(default, deserialize_with = "deserialize_lenient_string")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "deserialize_lenient_string")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "deserialize_lenient_string")]
    pub logo: Option<String>,
    #[serde(default, rename = "type")]
    pub channel_type: ChannelType,
    #[serde(default, deserialize_with = "deserialize_lenient_string")]
    pub url: Option<String>,
    #[serde(default, deserialize_with = "deserialize_lenient_string")]
    pub source: Option<String>,
    #[serde(default, deserialize_with = "deserialize_lenient_string")]
    pub source_name: Option<String>,
    #[serde(default, deserialize_with = "deserialize_lenient_string")]
    pub category: Option<String>,
    #[serde(default, deserialize_with = "deserialize_lenient_string")]
    pub youtube_id: Option<String>,
    #[serde(default, deserialize_with = "deserialize_lenient_string")]
    pub embed_url: Option<String>,
}

impl Channel {
    pub fn new(iso: &str, name: &str, url: &str) -> Self {
        Self {
            iso: Some(iso.to_string()),
            name: Some(name.to_string()),
            description: None,
            logo: None,
            channel_type: ChannelType::Tv,
            url: Some(url.to_string()),
            source: None,
            source_name: None,
            category: None,
            youtube_id: None,
            embed_url: None,
        }
    }

    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .unwrap_or_else(|| self.channel_type.placeholder_name())
    }

    pub fn display_iso(&self) -> String {
        display_iso(self.iso.as_deref())
    }

    pub fn slug(&self) -> String {
        slugify(self.display_name())
    }

    pub fn key(&self) -> ChannelKey {
        ChannelKey::new(&self.display_iso(), &self.slug())
    }

    pub fn source_label(&self) -> &str {
        self.source_name.as_deref().unwrap_or("")
    }

    /// The locator handed to a player, if this channel has one.
    pub fn playable_url(&self) -> Option<String> {
        if let Some(url) = self.url.as_deref() {
            return Some(url.to_string());
        }
        if let Some(id) = self.youtube_id.as_deref() {
            return Some(format!("https://www.youtube.com/watch?v={}", id));
        }
        self.embed_url.clone()
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Composite (country, slug) identity shared by favorites, trash and deep links.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChannelKey {
    pub iso: String,
    pub slug: String,
}

impl ChannelKey {
    pub fn new(iso: &str, slug: &str) -> Self {
        Self {
            iso: display_iso(Some(iso)),
            slug: slug.trim().to_lowercase(),
        }
    }

    pub fn matches(&self, iso: &str, slug: &str) -> bool {
        self.iso.eq_ignore_ascii_case(iso.trim()) && self.slug.eq_ignore_ascii_case(slug.trim())
    }
}

impl fmt::Display for ChannelKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.iso, self.slug)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Al Jazeera English"), "al-jazeera-english");
        assert_eq!(slugify("  "), "channel");
        assert_eq!(slugify("Canal+"), "canal");
        assert_eq!(slugify("  France  24 "), "france-24");
        assert_eq!(slugify("-News-"), "news");
        assert_eq!(slugify("Télé"), "tl");
    }

    #[test]
    fn test_normalize_type() {
        assert_eq!(normalize_type(Some("radio")), ChannelType::Radio);
        assert_eq!(normalize_type(Some("WEBCAM")), ChannelType::Webcam);
        assert_eq!(normalize_type(Some("podcast")), ChannelType::Tv);
        assert_eq!(normalize_type(None), ChannelType::Tv);
    }

    #[test]
    fn test_display_iso() {
        assert_eq!(display_iso(Some("fr")), "FR");
        assert_eq!(display_iso(Some("")), "XX");
        assert_eq!(display_iso(None), "XX");
    }

    #[test]
    fn test_channel_defaults_from_json() {
        let channel: Channel =
            serde_json::from_str(r#"{"iso":"fr","name":"  ","type":"radio","url":"http://a"}"#)
                .unwrap();
        assert_eq!(channel.channel_type, ChannelType::Radio);
        assert_eq!(channel.display_name(), "Unnamed radio station");
        assert_eq!(channel.key(), ChannelKey::new("FR", "unnamed-radio-station"));

        let bare: Channel = serde_json::from_str(r#"{"type":42}"#).unwrap();
        assert_eq!(bare.channel_type, ChannelType::Tv);
        assert_eq!(bare.display_iso(), "XX");
        assert!(bare.playable_url().is_none());
    }

    #[test]
    fn test_youtube_playable_url() {
        let mut channel = Channel::new("US", "Live", "");
        channel.url = None;
        channel.youtube_id = Some("abc123".to_string());
        assert_eq!(
            channel.playable_url().as_deref(),
            Some("https://www.youtube.com/watch?v=abc123")
        );
    }

    #[test]
    fn test_key_matches_case_insensitively() {
        let key = ChannelKey::new("fr", "TF1");
        assert_eq!(key.iso, "FR");
        assert!(key.matches("Fr", "tf1"));
        assert!(!key.matches("DE", "tf1"));
    }
}
