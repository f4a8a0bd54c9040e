// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: (C) 2025 Cranky Kernel <crankykernel@proton.me>

use super::{
    CommandContext, OutputFormat, print_channels, print_sources, prompt_channel_selection, spinner,
};
use anyhow::Result;
use worldtv::resolve::DeepLink;
use worldtv::session::DeepLinkOutcome;
use worldtv::{ChannelFilter, Selection, country};

pub enum BrowseCommand {
    Country {
        code: String,
        filter: ChannelFilter,
        format: OutputFormat,
        list_sources: bool,
    },
    Category {
        name: String,
        filter: ChannelFilter,
        format: OutputFormat,
        list_sources: bool,
    },
    Categories,
    Play {
        code: String,
        slug: Option<String>,
        detach: bool,
    },
    Open {
        link: String,
        detach: bool,
    },
    Link {
        code: String,
        slug: Option<String>,
    },
}

impl BrowseCommand {
    pub async fn execute(self, mut context: CommandContext) -> Result<()> {
        match self {
            Self::Country {
                code,
                filter,
                format,
                list_sources,
            } => {
                if country::candidate_codes(&code).is_empty() {
                    anyhow::bail!("Invalid country code: {}. Use an ISO alpha-2 or alpha-3 code", code);
                }
                let feed = context.load(Selection::Country(code)).await;
                if list_sources {
                    return print_sources(feed, format);
                }
                print_channels(&filter.apply(feed), format)
            }
            Self::Category {
                name,
                filter,
                format,
                list_sources,
            } => {
                let feed = context.load(Selection::Category(name)).await;
                if list_sources {
                    return print_sources(feed, format);
                }
                print_channels(&filter.apply(feed), format)
            }
            Self::Categories => {
                let pb = spinner("Loading categories...");
                let categories = context.browser.loader().load_categories().await;
                pb.finish_and_clear();

                if categories.is_empty() {
                    println!("No categories found");
                }
                for name in categories {
                    println!("{}", name);
                }
                Ok(())
            }
            Self::Play { code, slug, detach } => {
                context.load(Selection::Country(code.clone())).await;

                let channel = match slug {
                    Some(slug) => match context.browser.resolve(&code, &slug) {
                        Some(channel) => Some(channel.clone()),
                        None => {
                            println!("{}/{} is no longer available", code.to_uppercase(), slug);
                            None
                        }
                    },
                    None => {
                        let choices: Vec<_> = context.browser.feed().iter().collect();
                        if choices.is_empty() {
                            println!("No channels found");
                        }
                        prompt_channel_selection(&choices)?
                    }
                };

                if let Some(channel) = channel {
                    if let Some(link) = context.browser.deep_link(Some(&channel)) {
                        println!("Link: {}", link.to_query());
                    }
                    context.play(&channel, detach);
                }
                Ok(())
            }
            Self::Open { link, detach } => {
                let link = DeepLink::parse(&link);
                let pb = spinner("Restoring link...");
                let outcome = context.browser.open_deep_link(&link).await;
                pb.finish_and_clear();

                match outcome {
                    DeepLinkOutcome::NoSelection => println!("Link names no country"),
                    DeepLinkOutcome::Loaded { channel: Some(channel) } => {
                        context.play(&channel, detach)
                    }
                    DeepLinkOutcome::Loaded { channel: None } => {
                        if let Some(slug) = &link.channel {
                            println!("{} is no longer available", slug);
                        }
                        let feed: Vec<_> = context.browser.feed().iter().collect();
                        print_channels(&feed, OutputFormat::Text)?;
                    }
                }
                Ok(())
            }
            Self::Link { code, slug } => {
                let link = DeepLink::new(&code, slug.as_deref());
                if link.country.is_none() {
                    anyhow::bail!("Invalid country code: {}", code);
                }
                println!("{}", link.to_query());
                Ok(())
            }
        }
    }
}
