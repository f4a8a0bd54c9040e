// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: (C) 2025 Cranky Kernel <crankykernel@proton.me>

use crate::channel::{Channel, UNKNOWN_ISO};
use crate::country;
use url::form_urlencoded;

/// Finds the live channel behind a stored (country, slug) reference.
///
/// Slugs are recomputed from each channel's name. When several channels
/// share an identity, the first one in feed order wins.
pub fn resolve<'a>(feed: &'a [Channel], iso: &str, slug: &str) -> Option<&'a Channel> {
    feed.iter().find(|channel| channel.key().matches(iso, slug))
}

/// Selection state carried in a shareable link: `?country=FR&channel=tf1`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeepLink {
    pub country: Option<String>,
    pub channel: Option<String>,
}

impl DeepLink {
    pub fn new(country: &str, channel: Option<&str>) -> Self {
        let country = if country.eq_ignore_ascii_case(UNKNOWN_ISO) {
            Some(UNKNOWN_ISO.to_string())
        } else {
            country::canonical_code(country)
        };

        Self {
            country,
            channel: channel
                .map(|c| c.trim().to_lowercase())
                .filter(|c| !c.is_empty()),
        }
    }

    /// Accepts a full URL, a `?query` or a bare query string.
    pub fn parse(input: &str) -> Self {
        let input = input.trim();
        let query = match url::Url::parse(input) {
            Ok(url) => url.query().unwrap_or("").to_string(),
            Err(_) => match input.split_once('?') {
                Some((_, query)) => query.to_string(),
                None => input.to_string(),
            },
        };

        let mut country = None;
        let mut channel = None;
        for (key, value) in form_urlencoded::parse(query.as_bytes()) {
            match key.as_ref() {
                "country" => country = Some(value.into_owned()),
                "channel" => channel = Some(value.into_owned()),
                _ => {}
            }
        }

        match country.filter(|c| !c.trim().is_empty()) {
            Some(code) => Self::new(&code, channel.as_deref()),
            None => Self::default(),
        }
    }

    pub fn to_query(&self) -> String {
        let mut parts = Vec::new();
        if let Some(country) = &self.country {
            parts.push(format!("country={}", urlencoding::encode(country)));
            if let Some(channel) = &self.channel {
                parts.push(format!("channel={}", urlencoding::encode(channel)));
            }
        }
        if parts.is_empty() {
            String::new()
        } else {
            format!("?{}", parts.join("&"))
        }
    }
}
