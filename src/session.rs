// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: (C) 2025 Cranky Kernel <crankykernel@proton.me>

use crate::channel::Channel;
use crate::country;
use crate::favourites::{ChannelEntry, FavouritesStore};
use crate::feed::{FeedLoader, Selection};
use crate::resolve::{DeepLink, resolve};
use crate::source::FragmentSource;
use crate::trash::TrashStore;
use anyhow::Result;
use tracing::{debug, info};

/// Handle for one in-flight load. Results carrying an outdated generation
/// are dropped instead of replacing the current feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadTicket {
    generation: u64,
    selection: Selection,
}

impl LoadTicket {
    pub fn selection(&self) -> &Selection {
        &self.selection
    }
}

/// Outcome of restoring a deep link.
#[derive(Debug, Clone, PartialEq)]
pub enum DeepLinkOutcome {
    /// The link named no country; nothing was restored.
    NoSelection,
    /// The country feed was loaded; `channel` is set if the slug resolved.
    Loaded { channel: Option<Channel> },
}

/// One browsing context: the current selection, its feed and the user's
/// favourites and trash.
#[derive(Debug)]
pub struct Browser<S> {
    loader: FeedLoader<S>,
    favourites: FavouritesStore,
    trash: TrashStore,
    generation: u64,
    selection: Option<Selection>,
    feed: Vec<Channel>,
    catalog: Option<Vec<Channel>>,
}

impl<S: FragmentSource> Browser<S> {
    pub fn new(loader: FeedLoader<S>, favourites: FavouritesStore, trash: TrashStore) -> Self {
        Self {
            loader,
            favourites,
            trash,
            generation: 0,
            selection: None,
            feed: Vec::new(),
            catalog: None,
        }
    }

    pub fn loader(&self) -> &FeedLoader<S> {
        &self.loader
    }

    pub fn favourites(&self) -> &FavouritesStore {
        &self.favourites
    }

    pub fn favourites_mut(&mut self) -> &mut FavouritesStore {
        &mut self.favourites
    }

    pub fn trash(&self) -> &TrashStore {
        &self.trash
    }

    pub fn selection(&self) -> Option<&Selection> {
        self.selection.as_ref()
    }

    pub fn feed(&self) -> &[Channel] {
        &self.feed
    }

    /// Switches to a new selection, invalidating any load still running.
    pub fn begin(&mut self, selection: Selection) -> LoadTicket {
        self.generation += 1;
        info!("Selecting {}", selection);
        self.selection = Some(selection.clone());
        self.feed.clear();
        LoadTicket {
            generation: self.generation,
            selection,
        }
    }

    pub async fn fetch(&self, ticket: &LoadTicket) -> Vec<Channel> {
        self.loader.load(&ticket.selection, &self.trash).await
    }

    /// Installs a loaded feed; returns false if the ticket is stale.
    pub fn apply(&mut self, ticket: &LoadTicket, feed: Vec<Channel>) -> bool {
        if ticket.generation != self.generation {
            debug!(
                "Dropping stale result for {} ({} channels)",
                ticket.selection,
                feed.len()
            );
            return false;
        }
        self.feed = feed;
        true
    }

    pub async fn select(&mut self, selection: Selection) -> &[Channel] {
        let ticket = self.begin(selection);
        let feed = self.fetch(&ticket).await;
        self.apply(&ticket, feed);
        &self.feed
    }

    /// Reloads the current selection, e.g. after a channel was restored from the trash.
    pub async fn reload(&mut self) -> &[Channel] {
        match self.selection.clone() {
            Some(selection) => self.select(selection).await,
            None => &self.feed,
        }
    }

    /// Resolves against the current feed; alpha-3 codes are accepted too.
    pub fn resolve(&self, iso: &str, slug: &str) -> Option<&Channel> {
        let iso = country::canonical_code(iso).unwrap_or_else(|| iso.to_string());
        resolve(&self.feed, &iso, slug)
    }

    /// Restores the selection named by a deep link and resolves its channel.
    pub async fn open_deep_link(&mut self, link: &DeepLink) -> DeepLinkOutcome {
        let Some(country) = link.country.clone() else {
            return DeepLinkOutcome::NoSelection;
        };

        self.select(Selection::Country(country.clone())).await;
        let channel = link
            .channel
            .as_deref()
            .and_then(|slug| self.resolve(&country, slug))
            .cloned();
        DeepLinkOutcome::Loaded { channel }
    }

    /// Deep link for the current country selection and optional channel.
    pub fn deep_link(&self, channel: Option<&Channel>) -> Option<DeepLink> {
        match &self.selection {
            Some(Selection::Country(code)) => {
                let slug = channel.map(Channel::slug);
                Some(DeepLink::new(code, slug.as_deref()))
            }
            _ => None,
        }
    }

    /// Resolves a favourite against the current feed, then the aggregate catalog.
    pub async fn resolve_favourite(&mut self, entry: &ChannelEntry) -> Option<Channel> {
        if let Some(channel) = resolve(&self.feed, &entry.iso, &entry.slug) {
            return Some(channel.clone());
        }
        if self.catalog.is_none() {
            self.catalog = Some(self.loader.load_catalog(&self.trash).await);
        }
        self.catalog
            .as_deref()
            .and_then(|catalog| resolve(catalog, &entry.iso, &entry.slug))
            .cloned()
    }

    pub fn add_favourite(&mut self, channel: &Channel) -> Result<bool> {
        self.favourites.add(channel)
    }

    /// Trashes a channel and drops it from the current feed and cached catalog.
    pub fn trash_channel(&mut self, channel: &Channel) -> Result<bool> {
        let added = self.trash.add(channel)?;
        let key = channel.key();
        self.feed.retain(|c| c.key() != key);
        if let Some(catalog) = self.catalog.as_mut() {
            catalog.retain(|c| c.key() != key);
        }
        Ok(added)
    }

    /// Takes a channel out of the trash; the feed must be reloaded to show it again.
    pub fn restore_channel(&mut self, iso: &str, slug: &str) -> Result<bool> {
        let restored = self.trash.remove(iso, slug)?;
        if restored {
            self.catalog = None;
        }
        Ok(restored)
    }

    pub fn empty_trash(&mut self) -> Result<bool> {
        let emptied = self.trash.clear()?;
        if emptied {
            self.catalog = None;
        }
        Ok(emptied)
    }
}
