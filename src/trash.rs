// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: (C) 2025 Cranky Kernel <crankykernel@proton.me>

use crate::channel::{Channel, ChannelKey};
use crate::storage::{Storage, Subscribers};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, warn};

const TRASH_KEY: &str = "trash";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrashEntry {
    pub iso: String,
    pub slug: String,
    #[serde(default)]
    pub name: String,
}

impl TrashEntry {
    pub fn key(&self) -> ChannelKey {
        ChannelKey::new(&self.iso, &self.slug)
    }
}

/// Channels the user has hidden from every country and category view.
#[derive(Debug)]
pub struct TrashStore {
    storage: Box<dyn Storage>,
    subscribers: Subscribers,
}

impl TrashStore {
    pub fn new(storage: Box<dyn Storage>) -> Self {
        Self {
            storage,
            subscribers: Subscribers::default(),
        }
    }

    pub fn subscribe<F>(&mut self, callback: F)
    where
        F: Fn() + Send + 'static,
    {
        self.subscribers.push(Box::new(callback));
    }

    /// Current entries; unreadable state reads as an empty trash.
    pub fn entries(&self) -> Vec<TrashEntry> {
        let content = match self.storage.read(TRASH_KEY) {
            Ok(Some(content)) => content,
            Ok(None) => return Vec::new(),
            Err(e) => {
                warn!("Could not read trash: {:#}", e);
                return Vec::new();
            }
        };

        serde_json::from_str(&content).unwrap_or_else(|e| {
            warn!("Ignoring corrupt trash data: {}", e);
            Vec::new()
        })
    }

    fn save(&self, entries: &[TrashEntry]) -> Result<()> {
        let content =
            serde_json::to_string_pretty(entries).with_context(|| "Failed to serialize trash")?;
        self.storage.write(TRASH_KEY, &content)
    }

    fn update<F>(&mut self, mutate: F) -> Result<bool>
    where
        F: FnOnce(&mut Vec<TrashEntry>) -> bool,
    {
        let mut entries = self.entries();
        if !mutate(&mut entries) {
            return Ok(false);
        }
        self.save(&entries)?;
        self.subscribers.notify();
        Ok(true)
    }

    pub fn has(&self, iso: &str, slug: &str) -> bool {
        self.entries().iter().any(|e| e.key().matches(iso, slug))
    }

    /// Snapshot of every trashed identity, read from storage once.
    pub fn keys(&self) -> HashSet<ChannelKey> {
        self.entries().iter().map(TrashEntry::key).collect()
    }

    /// Returns false if the channel was already in the trash.
    pub fn add(&mut self, channel: &Channel) -> Result<bool> {
        let key = channel.key();
        let name = channel.display_name().to_string();
        debug!("Trashing {}", key);

        self.update(|entries| {
            if entries.iter().any(|e| e.key().matches(&key.iso, &key.slug)) {
                return false;
            }
            entries.push(TrashEntry {
                iso: key.iso,
                slug: key.slug,
                name,
            });
            true
        })
    }

    pub fn remove(&mut self, iso: &str, slug: &str) -> Result<bool> {
        debug!("Restoring {}/{}", iso, slug);
        self.update(|entries| {
            let before = entries.len();
            entries.retain(|e| !e.key().matches(iso, slug));
            entries.len() != before
        })
    }

    /// Returns false if the trash was already empty.
    pub fn clear(&mut self) -> Result<bool> {
        self.update(|entries| {
            if entries.is_empty() {
                return false;
            }
            entries.clear();
            true
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_add_is_idempotent() {
        let mut trash = TrashStore::new(Box::new(MemoryStorage::new()));
        let tf1 = Channel::new("fr", "TF1", "http://a");

        assert!(trash.add(&tf1).unwrap());
        assert!(!trash.add(&Channel::new("FR", "tf1", "http://b")).unwrap());

        let entries = trash.entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].iso, "FR");
        assert_eq!(entries[0].slug, "tf1");
        assert_eq!(entries[0].name, "TF1");
        assert!(trash.has("fr", "TF1"));
        assert!(trash.keys().contains(&tf1.key()));
    }

    #[test]
    fn test_remove_and_clear() {
        let mut trash = TrashStore::new(Box::new(MemoryStorage::new()));
        trash.add(&Channel::new("FR", "TF1", "http://a")).unwrap();
        trash.add(&Channel::new("DE", "ZDF", "http://z")).unwrap();

        assert!(!trash.remove("FR", "missing").unwrap());
        assert!(trash.remove("fr", "tf1").unwrap());
        assert!(!trash.has("FR", "tf1"));
        assert!(trash.has("DE", "zdf"));

        assert!(trash.clear().unwrap());
        assert!(trash.entries().is_empty());
        assert!(!trash.clear().unwrap());
    }

    #[test]
    fn test_persists_across_instances() {
        let storage = MemoryStorage::new();
        let mut trash = TrashStore::new(Box::new(storage.clone()));
        trash.add(&Channel::new("GB", "BBC One", "http://b")).unwrap();

        let reopened = TrashStore::new(Box::new(storage));
        assert!(reopened.has("GB", "bbc-one"));
    }

    #[test]
    fn test_corrupt_data_reads_empty() {
        let storage = MemoryStorage::new().with(TRASH_KEY, "{not a list");
        let mut trash = TrashStore::new(Box::new(storage));
        assert!(trash.entries().is_empty());

        trash.add(&Channel::new("FR", "TF1", "http://a")).unwrap();
        assert_eq!(trash.entries().len(), 1);
    }

    #[test]
    fn test_mutations_notify() {
        let count = Arc::new(AtomicUsize::new(0));
        let mut trash = TrashStore::new(Box::new(MemoryStorage::new()));
        let observed = Arc::clone(&count);
        trash.subscribe(move || {
            observed.fetch_add(1, Ordering::SeqCst);
        });

        let tf1 = Channel::new("FR", "TF1", "http://a");
        trash.add(&tf1).unwrap();
        trash.add(&tf1).unwrap();
        trash.remove("FR", "tf1").unwrap();
        trash.clear().unwrap();
        assert_eq!(count.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_clearing_empty_trash_is_silent() {
        let count = Arc::new(AtomicUsize::new(0));
        let storage = MemoryStorage::new();
        let mut trash = TrashStore::new(Box::new(storage.clone()));
        let observed = Arc::clone(&count);
        trash.subscribe(move || {
            observed.fetch_add(1, Ordering::SeqCst);
        });

        assert!(!trash.clear().unwrap());
        assert_eq!(count.load(Ordering::SeqCst), 0);
        assert!(storage.read(TRASH_KEY).unwrap().is_none());
    }
}
