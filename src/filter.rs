// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: (C) 2025 Cranky Kernel <crankykernel@proton.me>

use crate::channel::{Channel, ChannelType};

/// Display filters over a loaded feed. `None` means "all".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChannelFilter {
    pub channel_type: Option<ChannelType>,
    pub source: Option<String>,
    pub search: String,
}

impl ChannelFilter {
    pub fn matches(&self, channel: &Channel) -> bool {
        if let Some(channel_type) = self.channel_type {
            if channel.channel_type != channel_type {
                return false;
            }
        }

        if let Some(source) = &self.source {
            if channel.source_label() != source {
                return false;
            }
        }

        let query = self.search.trim().to_lowercase();
        query.is_empty()
            || channel.display_name().to_lowercase().contains(&query)
            || channel.source_label().to_lowercase().contains(&query)
    }

    pub fn apply<'a>(&self, feed: &'a [Channel]) -> Vec<&'a Channel> {
        feed.iter().filter(|channel| self.matches(channel)).collect()
    }
}

/// Distinct source names in feed order, for populating a source selector.
pub fn source_names(feed: &[Channel]) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for channel in feed {
        let name = channel.source_label();
        if !name.is_empty() && !names.iter().any(|n| n == name) {
            names.push(name.to_string());
        }
    }
    names
}

#[cfg(test)]
mod tests {
    use super::*;

    fn channel(name: &str, channel_type: ChannelType, source: &str) -> Channel {
        let mut channel = Channel::new("FR", name, &format!("http://{}", name));
        channel.channel_type = channel_type;
        channel.source_name = Some(source.to_string());
        channel
    }

    fn feed() -> Vec<Channel> {
        vec![
            channel("TF1", ChannelType::Tv, "iptv-org"),
            channel("France Inter", ChannelType::Radio, "iprd"),
            channel("Paris Cam", ChannelType::Webcam, "windy"),
            channel("France 24", ChannelType::Tv, "free-tv-iptv"),
        ]
    }

    fn names(channels: Vec<&Channel>) -> Vec<&str> {
        channels.into_iter().map(|c| c.display_name()).collect()
    }

    #[test]
    fn test_default_filter_keeps_everything() {
        let feed = feed();
        assert_eq!(ChannelFilter::default().apply(&feed).len(), 4);
    }

    #[test]
    fn test_type_and_source_filters() {
        let feed = feed();
        let tv = ChannelFilter {
            channel_type: Some(ChannelType::Tv),
            ..Default::default()
        };
        assert_eq!(names(tv.apply(&feed)), vec!["TF1", "France 24"]);

        let tv_from_iptv_org = ChannelFilter {
            source: Some("iptv-org".to_string()),
            ..tv
        };
        assert_eq!(names(tv_from_iptv_org.apply(&feed)), vec!["TF1"]);
    }

    #[test]
    fn test_search_matches_name_or_source() {
        let feed = feed();
        let france = ChannelFilter {
            search: "FRANCE".to_string(),
            ..Default::default()
        };
        assert_eq!(names(france.apply(&feed)), vec!["France Inter", "France 24"]);

        let windy = ChannelFilter {
            search: "wind".to_string(),
            ..Default::default()
        };
        assert_eq!(names(windy.apply(&feed)), vec!["Paris Cam"]);
    }

    #[test]
    fn test_source_names() {
        let mut feed = feed();
        feed.push(channel("TMC", ChannelType::Tv, "iptv-org"));
        assert_eq!(
            source_names(&feed),
            vec!["iptv-org", "iprd", "windy", "free-tv-iptv"]
        );
    }
}
