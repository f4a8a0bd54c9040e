// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: (C) 2025 Cranky Kernel <crankykernel@proton.me>

use anyhow::Result;
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use inquire::Select;
use serde_json::json;
use std::time::Duration;

use worldtv::filter::source_names;
use worldtv::source::DataSource;
use worldtv::storage::FileStorage;
use worldtv::{
    Browser, Channel, ChannelFilter, ChannelType, Config, FavouritesStore, FeedLoader, Player,
    Selection, TrashStore,
};

pub mod browse;
pub mod favorites;
pub mod trash;

pub use browse::BrowseCommand;
pub use favorites::FavoritesCommand;
pub use trash::TrashCommand;

/// Output format for command results
#[derive(Debug, Clone, Copy)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => anyhow::bail!("Invalid format: {}. Use 'text' or 'json'", s),
        }
    }
}

/// Channel list filters shared by the country and category commands
#[derive(Args, Debug, Clone, Default)]
pub struct FilterArgs {
    /// Channel type (all, tv, radio, youtube, webcam)
    #[arg(short = 't', long = "type", default_value = "all")]
    pub channel_type: String,

    /// Only channels from this source
    #[arg(short, long)]
    pub source: Option<String>,

    /// Case-insensitive text matched against name and source
    #[arg(long, default_value = "")]
    pub search: String,
}

impl FilterArgs {
    pub fn into_filter(self) -> Result<ChannelFilter> {
        let channel_type = match self.channel_type.to_lowercase().as_str() {
            "all" => None,
            "tv" => Some(ChannelType::Tv),
            "radio" => Some(ChannelType::Radio),
            "youtube" => Some(ChannelType::Youtube),
            "webcam" => Some(ChannelType::Webcam),
            other => anyhow::bail!(
                "Invalid type: {}. Use 'all', 'tv', 'radio', 'youtube' or 'webcam'",
                other
            ),
        };

        Ok(ChannelFilter {
            channel_type,
            source: self.source.filter(|s| !s.eq_ignore_ascii_case("all")),
            search: self.search,
        })
    }
}

/// Context for command execution: the browsing session and the player
pub struct CommandContext {
    pub browser: Browser<DataSource>,
    pub player: Player,
}

impl CommandContext {
    pub fn new(config: Config) -> Result<Self> {
        let source = DataSource::from_root(
            &config.data.root,
            Duration::from_secs(config.data.timeout_secs),
        )?;
        let loader = FeedLoader::new(source, config.data.sources.clone());

        let storage = FileStorage::new(config.storage_dir())?;
        let favourites = FavouritesStore::new(Box::new(storage.clone()));
        let trash = TrashStore::new(Box::new(storage));

        Ok(Self {
            browser: Browser::new(loader, favourites, trash),
            player: Player::new(config.player.clone()),
        })
    }

    /// Loads a selection behind a spinner
    pub async fn load(&mut self, selection: Selection) -> &[Channel] {
        let pb = spinner(&format!("Loading {}...", selection));
        let feed = self.browser.select(selection).await;
        pb.finish_and_clear();
        feed
    }

    /// Plays a channel; failures are reported but never fatal
    pub fn play(&self, channel: &Channel, detach: bool) {
        if !self.player.is_available() {
            eprintln!(
                "Warning: player '{}' is not available, set [player] command in the config",
                self.player.command_name()
            );
            return;
        }
        println!("Playing {} ({})", channel.display_name(), channel.display_iso());
        let result = if detach {
            self.player.play_detached(channel)
        } else {
            self.player.play(channel)
        };
        if let Err(e) = result {
            eprintln!("Warning: playback failed: {:#}", e);
        }
    }
}

pub fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg} [{elapsed_precise}]")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Prompt the user to pick one channel
pub fn prompt_channel_selection(channels: &[&Channel]) -> Result<Option<Channel>> {
    if channels.is_empty() {
        return Ok(None);
    }

    let labels: Vec<String> = channels
        .iter()
        .map(|c| format!("{} [{}] {}", c.display_name(), c.channel_type, c.source_label()))
        .collect();

    let selection = Select::new("Select channel:", labels).raw_prompt()?;
    Ok(channels.get(selection.index).map(|c| (*c).clone()))
}

pub fn print_channels(channels: &[&Channel], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            let rows: Vec<_> = channels
                .iter()
                .map(|c| {
                    json!({
                        "iso": c.display_iso(),
                        "slug": c.slug(),
                        "name": c.display_name(),
                        "type": c.channel_type,
                        "url": c.url,
                        "source": c.source,
                        "source_name": c.source_name,
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&rows)?);
        }
        OutputFormat::Text => {
            if channels.is_empty() {
                println!("No channels found");
            } else {
                for c in channels {
                    println!(
                        "{:2} | {:32} | {:7} | {}",
                        c.display_iso(),
                        c.slug(),
                        c.channel_type,
                        c.display_name()
                    );
                }
            }
        }
    }
    Ok(())
}

/// Source names present in a feed, the choices for `--source`
pub fn print_sources(feed: &[Channel], format: OutputFormat) -> Result<()> {
    let names = source_names(feed);
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&names)?),
        OutputFormat::Text => {
            if names.is_empty() {
                println!("No sources found");
            }
            for name in names {
                println!("{}", name);
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_args() {
        let filter = FilterArgs {
            channel_type: "Radio".to_string(),
            source: Some("all".to_string()),
            search: "inter".to_string(),
        }
        .into_filter()
        .unwrap();
        assert_eq!(filter.channel_type, Some(ChannelType::Radio));
        assert!(filter.source.is_none());
        assert_eq!(filter.search, "inter");

        let bad = FilterArgs {
            channel_type: "podcast".to_string(),
            ..Default::default()
        };
        assert!(bad.into_filter().is_err());
    }

    #[test]
    fn test_output_format() {
        assert!(matches!(OutputFormat::from_str("JSON"), Ok(OutputFormat::Json)));
        assert!(OutputFormat::from_str("m3u").is_err());
    }
}
