// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: (C) 2025 Cranky Kernel <crankykernel@proton.me>

use crate::channel::Channel;
use crate::country;
use crate::source::{FragmentPath, FragmentSource};
use crate::trash::TrashStore;
use futures_util::future::join_all;
use serde_json::Value;
use std::collections::HashSet;
use std::fmt;
use tracing::{debug, warn};

/// What the user picked: a country code as typed, or a category name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    Country(String),
    Category(String),
}

impl fmt::Display for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Country(code) => write!(f, "country {}", code.to_uppercase()),
            Self::Category(name) => write!(f, "category {}", name),
        }
    }
}

/// Parses one fragment document. Anything unreadable yields no channels.
pub fn parse_fragment(content: &str) -> Vec<Channel> {
    let value: Value = match serde_json::from_str(content) {
        Ok(value) => value,
        Err(e) => {
            warn!("Ignoring malformed fragment: {}", e);
            return Vec::new();
        }
    };

    let Some(entries) = value.get("channels").and_then(Value::as_array) else {
        debug!("Fragment has no channels list");
        return Vec::new();
    };

    entries
        .iter()
        .filter_map(|entry| match serde_json::from_value::<Channel>(entry.clone()) {
            Ok(channel) => Some(channel),
            Err(e) => {
                debug!("Skipping unreadable channel entry: {}", e);
                None
            }
        })
        .collect()
}

/// Concatenates fragments in order, keeping the first channel seen for each url.
///
/// Channels without a url are always kept.
pub fn merge_fragments<I>(fragments: I) -> Vec<Channel>
where
    I: IntoIterator<Item = Vec<Channel>>,
{
    let mut seen: HashSet<String> = HashSet::new();
    let mut merged = Vec::new();

    for channel in fragments.into_iter().flatten() {
        match channel.url.as_deref() {
            Some(url) if !url.is_empty() => {
                if seen.insert(url.to_string()) {
                    merged.push(channel);
                }
            }
            _ => merged.push(channel),
        }
    }

    merged
}

/// Drops trashed channels from a merged list. The trash is read once per call.
pub fn hide_trashed(channels: Vec<Channel>, trash: &TrashStore) -> Vec<Channel> {
    let trashed = trash.keys();
    if trashed.is_empty() {
        return channels;
    }

    let total = channels.len();
    let visible: Vec<Channel> = channels
        .into_iter()
        .filter(|channel| !trashed.contains(&channel.key()))
        .collect();

    if visible.len() < total {
        debug!("Trash hid {} channel(s)", total - visible.len());
    }
    visible
}

/// Builds merged feeds from the per-source fragments of a data tree.
#[derive(Debug, Clone)]
pub struct FeedLoader<S> {
    source: S,
    sources: Vec<String>,
}

impl<S: FragmentSource> FeedLoader<S> {
    pub fn new(source: S, sources: Vec<String>) -> Self {
        Self { source, sources }
    }

    pub fn sources(&self) -> &[String] {
        &self.sources
    }

    /// Paths for every (scope, source) pair, scope-major.
    pub fn fragment_paths<F>(&self, scopes: &[String], path_for: F) -> Vec<FragmentPath>
    where
        F: Fn(&str, &str) -> FragmentPath,
    {
        scopes
            .iter()
            .flat_map(|scope| {
                self.sources
                    .iter()
                    .map(move |source| (scope.as_str(), source.as_str()))
            })
            .map(|(scope, source)| path_for(scope, source))
            .collect()
    }

    /// Fetches all paths concurrently; results come back in path order.
    async fn fetch_fragments(&self, paths: &[FragmentPath]) -> Vec<Vec<Channel>> {
        let fetches = paths.iter().map(|path| async move {
            match self.source.fetch(path).await {
                Ok(Some(content)) => {
                    let channels = parse_fragment(&content);
                    debug!("Fragment {}: {} channels", path, channels.len());
                    channels
                }
                Ok(None) => {
                    debug!("Fragment {} not present", path);
                    Vec::new()
                }
                Err(e) => {
                    warn!("Fragment {} could not be fetched: {:#}", path, e);
                    Vec::new()
                }
            }
        });

        join_all(fetches).await
    }

    async fn load_paths(&self, paths: &[FragmentPath], trash: &TrashStore) -> Vec<Channel> {
        let merged = merge_fragments(self.fetch_fragments(paths).await);
        hide_trashed(merged, trash)
    }

    /// Loads the merged feed for an ordered list of folder codes.
    pub async fn load_codes(&self, candidates: &[String], trash: &TrashStore) -> Vec<Channel> {
        if candidates.is_empty() {
            return Vec::new();
        }
        let paths = self.fragment_paths(candidates, FragmentPath::country);
        self.load_paths(&paths, trash).await
    }

    pub async fn load_country(&self, code: &str, trash: &TrashStore) -> Vec<Channel> {
        self.load_codes(&country::candidate_codes(code), trash)
            .await
    }

    pub async fn load_category(&self, category: &str, trash: &TrashStore) -> Vec<Channel> {
        let category = category.trim();
        if category.is_empty() {
            return Vec::new();
        }
        let paths = self.fragment_paths(&[category.to_string()], FragmentPath::category);
        self.load_paths(&paths, trash).await
    }

    pub async fn load(&self, selection: &Selection, trash: &TrashStore) -> Vec<Channel> {
        match selection {
            Selection::Country(code) => self.load_country(code, trash).await,
            Selection::Category(name) => self.load_category(name, trash).await,
        }
    }

    /// Category names from `cat_channels/categories.json`, sorted and unique.
    pub async fn load_categories(&self) -> Vec<String> {
        let path = FragmentPath::categories();
        let content = match self.source.fetch(&path).await {
            Ok(Some(content)) => content,
            Ok(None) => return Vec::new(),
            Err(e) => {
                warn!("Category list could not be fetched: {:#}", e);
                return Vec::new();
            }
        };

        let mut names: Vec<String> = match serde_json::from_str::<Vec<Value>>(&content) {
            Ok(values) => values
                .into_iter()
                .filter_map(|v| v.as_str().map(|s| s.trim().to_string()))
                .filter(|s| !s.is_empty())
                .collect(),
            Err(e) => {
                warn!("Ignoring malformed category list: {}", e);
                Vec::new()
            }
        };
        names.sort();
        names.dedup();
        names
    }

    /// The aggregate catalog across all countries and sources, minus the trash.
    pub async fn load_catalog(&self, trash: &TrashStore) -> Vec<Channel> {
        let catalog = match self.source.fetch(&FragmentPath::catalog()).await {
            Ok(Some(content)) => merge_fragments([parse_fragment(&content)]),
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!("Catalog could not be fetched: {:#}", e);
                Vec::new()
            }
        };
        hide_trashed(catalog, trash)
    }
}
