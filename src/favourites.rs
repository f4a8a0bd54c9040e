// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: (C) 2025 Cranky Kernel <crankykernel@proton.me>

use crate::channel::{Channel, ChannelKey};
use crate::storage::{Storage, Subscribers};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

const FAVOURITES_KEY: &str = "favorites";

/// A reference to a channel by identity, not a copy of the feed record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelEntry {
    pub id: String,
    pub iso: String,
    pub slug: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub added_date: Option<DateTime<Utc>>,
}

impl ChannelEntry {
    pub fn key(&self) -> ChannelKey {
        ChannelKey::new(&self.iso, &self.slug)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FolderEntry {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub children: Vec<FavouriteEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum FavouriteEntry {
    Channel(ChannelEntry),
    Folder(FolderEntry),
}

impl FavouriteEntry {
    pub fn id(&self) -> &str {
        match self {
            Self::Channel(channel) => &channel.id,
            Self::Folder(folder) => &folder.id,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Channel(channel) => &channel.name,
            Self::Folder(folder) => &folder.name,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

/// One row of the depth-first listing of the forest.
#[derive(Debug, Clone, Copy)]
pub struct FlatRow<'a> {
    pub depth: usize,
    pub entry: &'a FavouriteEntry,
}

/// Globally unique entry id built from the current time and a random suffix.
pub fn new_id() -> String {
    format!(
        "{:x}-{:08x}",
        Utc::now().timestamp_millis(),
        rand::random::<u32>()
    )
}

/// The favorites forest: top-level entries, folders nesting to any depth.
///
/// All operations are plain tree transforms returning whether anything
/// changed; persistence lives in [`FavouritesStore`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FavouriteTree {
    #[serde(default)]
    pub items: Vec<FavouriteEntry>,
}

// Index path from the root to the entry with `id`.
fn locate(items: &[FavouriteEntry], id: &str) -> Option<Vec<usize>> {
    for (index, entry) in items.iter().enumerate() {
        if entry.id() == id {
            return Some(vec![index]);
        }
        if let FavouriteEntry::Folder(folder) = entry {
            if let Some(mut path) = locate(&folder.children, id) {
                path.insert(0, index);
                return Some(path);
            }
        }
    }
    None
}

// The child list addressed by a parent path (empty path is the root list).
fn container_mut<'a>(
    items: &'a mut Vec<FavouriteEntry>,
    parent: &[usize],
) -> Option<&'a mut Vec<FavouriteEntry>> {
    let mut current = items;
    for &index in parent {
        current = match current.get_mut(index) {
            Some(FavouriteEntry::Folder(folder)) => &mut folder.children,
            _ => return None,
        };
    }
    Some(current)
}

fn flatten<'a>(
    items: &'a [FavouriteEntry],
    prefix: &mut Vec<usize>,
    out: &mut Vec<(Vec<usize>, &'a FavouriteEntry)>,
) {
    for (index, entry) in items.iter().enumerate() {
        prefix.push(index);
        out.push((prefix.clone(), entry));
        if let FavouriteEntry::Folder(folder) = entry {
            flatten(&folder.children, prefix, out);
        }
        prefix.pop();
    }
}

impl FavouriteTree {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn find(&self, id: &str) -> Option<&FavouriteEntry> {
        let path = locate(&self.items, id)?;
        self.find_by_path(&path)
    }

    fn find_folder_mut(&mut self, folder_id: &str) -> Option<&mut FolderEntry> {
        let path = locate(&self.items, folder_id)?;
        let (last, parent) = path.split_last()?;
        match container_mut(&mut self.items, parent)?.get_mut(*last) {
            Some(FavouriteEntry::Folder(folder)) => Some(folder),
            _ => None,
        }
    }

    /// Detaches the entry wherever it sits in the forest.
    fn take(&mut self, id: &str) -> Option<FavouriteEntry> {
        let path = locate(&self.items, id)?;
        let (last, parent) = path.split_last()?;
        let container = container_mut(&mut self.items, parent)?;
        Some(container.remove(*last))
    }

    /// Depth-first rows, a folder immediately followed by its children.
    pub fn rows(&self) -> Vec<FlatRow<'_>> {
        let mut out = Vec::new();
        flatten(&self.items, &mut Vec::new(), &mut out);
        out.into_iter()
            .map(|(path, entry)| FlatRow {
                depth: path.len() - 1,
                entry,
            })
            .collect()
    }

    pub fn channel_entries(&self) -> Vec<&ChannelEntry> {
        self.rows()
            .into_iter()
            .filter_map(|row| match row.entry {
                FavouriteEntry::Channel(channel) => Some(channel),
                FavouriteEntry::Folder(_) => None,
            })
            .collect()
    }

    pub fn is_favourite(&self, iso: &str, slug: &str) -> bool {
        self.channel_entries()
            .iter()
            .any(|entry| entry.key().matches(iso, slug))
    }

    pub fn add_channel(&mut self, key: &ChannelKey, name: &str) -> bool {
        if self.is_favourite(&key.iso, &key.slug) {
            return false;
        }
        self.items.push(FavouriteEntry::Channel(ChannelEntry {
            id: new_id(),
            iso: key.iso.clone(),
            slug: key.slug.clone(),
            name: name.to_string(),
            added_date: Some(Utc::now()),
        }));
        true
    }

    pub fn add_folder(&mut self, name: &str) -> String {
        let id = new_id();
        self.items.push(FavouriteEntry::Folder(FolderEntry {
            id: id.clone(),
            name: name.to_string(),
            children: Vec::new(),
        }));
        id
    }

    pub fn rename_folder(&mut self, folder_id: &str, name: &str) -> bool {
        match self.find_folder_mut(folder_id) {
            Some(folder) => {
                folder.name = name.to_string();
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, id: &str) -> bool {
        self.take(id).is_some()
    }

    /// Moves an entry into a folder. An unknown folder, or one inside the
    /// moved subtree, puts the entry back at the top level instead.
    pub fn move_to_folder(&mut self, id: &str, folder_id: &str) -> bool {
        let Some(entry) = self.take(id) else {
            return false;
        };
        match self.find_folder_mut(folder_id) {
            Some(folder) => folder.children.push(entry),
            None => self.items.push(entry),
        }
        true
    }

    pub fn move_to_top_level(&mut self, id: &str) -> bool {
        let Some(entry) = self.take(id) else {
            return false;
        };
        self.items.push(entry);
        true
    }

    /// Swaps the entry with its neighbour in the depth-first listing, but
    /// only when both share the same parent list.
    pub fn move_up_down(&mut self, id: &str, direction: Direction) -> bool {
        let Some(target) = locate(&self.items, id) else {
            return false;
        };
        let mut rows = Vec::new();
        flatten(&self.items, &mut Vec::new(), &mut rows);
        let paths: Vec<Vec<usize>> = rows.into_iter().map(|(path, _)| path).collect();

        let Some(position) = paths.iter().position(|path| *path == target) else {
            return false;
        };

        let neighbour = match direction {
            Direction::Up => position.checked_sub(1),
            Direction::Down => Some(position + 1).filter(|&n| n < paths.len()),
        };
        let Some(neighbour) = neighbour else {
            return false;
        };

        let (from, to) = (&paths[position], &paths[neighbour]);
        let (Some((from_index, from_parent)), Some((to_index, to_parent))) =
            (from.split_last(), to.split_last())
        else {
            return false;
        };
        if from_parent != to_parent {
            return false;
        }

        match container_mut(&mut self.items, from_parent) {
            Some(container) => {
                container.swap(*from_index, *to_index);
                true
            }
            None => false,
        }
    }

    fn find_by_path(&self, path: &[usize]) -> Option<&FavouriteEntry> {
        let (last, parent) = path.split_last()?;
        let mut current = &self.items;
        for &index in parent {
            match current.get(index) {
                Some(FavouriteEntry::Folder(folder)) => current = &folder.children,
                _ => return None,
            }
        }
        current.get(*last)
    }
}

/// Persistent favorites: every mutation reads the stored tree, applies the
/// change, writes it back and notifies subscribers.
#[derive(Debug)]
pub struct FavouritesStore {
    storage: Box<dyn Storage>,
    subscribers: Subscribers,
}

impl FavouritesStore {
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

    /// The stored tree; missing or corrupt data reads as an empty tree.
    pub fn tree(&self) -> FavouriteTree {
        let content = match self.storage.read(FAVOURITES_KEY) {
            Ok(Some(content)) => content,
            Ok(None) => return FavouriteTree::default(),
            Err(e) => {
                warn!("Could not read favourites: {:#}", e);
                return FavouriteTree::default();
            }
        };

        serde_json::from_str(&content).unwrap_or_else(|e| {
            warn!("Ignoring corrupt favourites data: {}", e);
            FavouriteTree::default()
        })
    }

    fn save(&self, tree: &FavouriteTree) -> Result<()> {
        let content =
            serde_json::to_string_pretty(tree).with_context(|| "Failed to serialize favourites")?;
        self.storage.write(FAVOURITES_KEY, &content)
    }

    fn update<F>(&mut self, mutate: F) -> Result<bool>
    where
        F: FnOnce(&mut FavouriteTree) -> bool,
    {
        let mut tree = self.tree();
        if !mutate(&mut tree) {
            return Ok(false);
        }
        self.save(&tree)?;
        self.subscribers.notify();
        Ok(true)
    }

    pub fn is_favourite(&self, iso: &str, slug: &str) -> bool {
        self.tree().is_favourite(iso, slug)
    }

    /// Adds a top-level reference; returns false if the channel is already a favourite.
    pub fn add(&mut self, channel: &Channel) -> Result<bool> {
        let key = channel.key();
        let name = channel.display_name().to_string();
        debug!("Adding favourite {}", key);
        self.update(|tree| tree.add_channel(&key, &name))
    }

    pub fn remove(&mut self, id: &str) -> Result<bool> {
        debug!("Removing favourite {}", id);
        self.update(|tree| tree.remove(id))
    }

    pub fn add_folder(&mut self, name: &str) -> Result<String> {
        let mut created = String::new();
        self.update(|tree| {
            created = tree.add_folder(name);
            true
        })?;
        Ok(created)
    }

    pub fn rename_folder(&mut self, folder_id: &str, name: &str) -> Result<bool> {
        self.update(|tree| tree.rename_folder(folder_id, name))
    }

    pub fn move_to_folder(&mut self, id: &str, folder_id: &str) -> Result<bool> {
        self.update(|tree| tree.move_to_folder(id, folder_id))
    }

    pub fn move_to_top_level(&mut self, id: &str) -> Result<bool> {
        self.update(|tree| tree.move_to_top_level(id))
    }

    pub fn move_up_down(&mut self, id: &str, direction: Direction) -> Result<bool> {
        self.update(|tree| tree.move_up_down(id, direction))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn key(iso: &str, slug: &str) -> ChannelKey {
        ChannelKey::new(iso, slug)
    }

    fn top_ids(tree: &FavouriteTree) -> Vec<String> {
        tree.items.iter().map(|e| e.id().to_string()).collect()
    }

    fn id_of(tree: &FavouriteTree, slug: &str) -> String {
        tree.channel_entries()
            .into_iter()
            .find(|e| e.slug == slug)
            .map(|e| e.id.clone())
            .unwrap()
    }

    // [tf1, folder{ france-2, arte }, zdf]
    fn sample() -> (FavouriteTree, String) {
        let mut tree = FavouriteTree::default();
        tree.add_channel(&key("FR", "tf1"), "TF1");
        let folder = tree.add_folder("France");
        tree.add_channel(&key("FR", "france-2"), "France 2");
        tree.add_channel(&key("FR", "arte"), "Arte");
        let f2 = id_of(&tree, "france-2");
        let arte = id_of(&tree, "arte");
        assert!(tree.move_to_folder(&f2, &folder));
        assert!(tree.move_to_folder(&arte, &folder));
        tree.add_channel(&key("DE", "zdf"), "ZDF");
        (tree, folder)
    }

    fn order(tree: &FavouriteTree) -> Vec<String> {
        tree.rows()
            .iter()
            .map(|row| format!("{}{}", "  ".repeat(row.depth), row.entry.name()))
            .collect()
    }

    #[test]
    fn test_ids_are_unique() {
        let ids: std::collections::HashSet<String> = (0..100).map(|_| new_id()).collect();
        assert_eq!(ids.len(), 100);
    }

    #[test]
    fn test_add_same_key_twice() {
        let mut tree = FavouriteTree::default();
        assert!(tree.add_channel(&key("fr", "tf1"), "TF1"));
        assert!(!tree.add_channel(&key("FR", "TF1"), "TF1 HD"));
        assert_eq!(tree.items.len(), 1);
        assert!(tree.is_favourite("Fr", "tf1"));
    }

    #[test]
    fn test_add_detects_nested_duplicates() {
        let (mut tree, _) = sample();
        assert!(!tree.add_channel(&key("FR", "arte"), "Arte"));
        assert_eq!(tree.channel_entries().len(), 4);
    }

    #[test]
    fn test_remove_nested_and_missing() {
        let (mut tree, _) = sample();
        let before = tree.clone();
        assert!(!tree.remove("does-not-exist"));
        assert_eq!(tree, before);

        let arte = id_of(&tree, "arte");
        assert!(tree.remove(&arte));
        assert!(!tree.is_favourite("FR", "arte"));
        assert_eq!(order(&tree), vec!["TF1", "France", "  France 2", "ZDF"]);
    }

    #[test]
    fn test_move_to_unknown_folder_falls_back_to_top_level() {
        let (mut tree, _) = sample();
        let f2 = id_of(&tree, "france-2");
        assert!(tree.move_to_folder(&f2, "nope"));
        assert_eq!(
            order(&tree),
            vec!["TF1", "France", "  Arte", "ZDF", "France 2"]
        );
        assert!(!tree.move_to_folder("missing", "nope"));
    }

    #[test]
    fn test_folder_cannot_swallow_itself() {
        let (mut tree, folder) = sample();
        let inner = tree.add_folder("Inner");
        assert!(tree.move_to_folder(&inner, &folder));

        assert!(tree.move_to_folder(&folder, &inner));
        let last = tree.items.last().unwrap();
        assert_eq!(last.id(), folder);
        assert!(tree.find(&inner).is_some());
        assert_eq!(tree.channel_entries().len(), 4);
    }

    #[test]
    fn test_move_to_top_level() {
        let (mut tree, _) = sample();
        let arte = id_of(&tree, "arte");
        assert!(tree.move_to_top_level(&arte));
        assert_eq!(
            order(&tree),
            vec!["TF1", "France", "  France 2", "ZDF", "Arte"]
        );
        assert!(!tree.move_to_top_level("missing"));
    }

    #[test]
    fn test_move_up_down_within_same_parent() {
        let (mut tree, _) = sample();
        let arte = id_of(&tree, "arte");
        assert!(tree.move_up_down(&arte, Direction::Up));
        assert_eq!(
            order(&tree),
            vec!["TF1", "France", "  Arte", "  France 2", "ZDF"]
        );

        let tf1 = id_of(&tree, "tf1");
        let folder = tree.items[1].id().to_string();
        assert!(tree.move_up_down(&folder, Direction::Up));
        assert_eq!(top_ids(&tree)[0], folder);
        assert_eq!(top_ids(&tree)[1], tf1);
    }

    #[test]
    fn test_move_up_down_across_parents_is_refused() {
        let (mut tree, folder) = sample();
        let before = tree.clone();

        // first child of the folder: its predecessor is the folder header
        let f2 = id_of(&tree, "france-2");
        assert!(!tree.move_up_down(&f2, Direction::Up));
        // last child: its successor is a top-level entry
        let arte = id_of(&tree, "arte");
        assert!(!tree.move_up_down(&arte, Direction::Down));
        // folder header followed by its own child
        assert!(!tree.move_up_down(&folder, Direction::Down));
        // entry after the folder's last child
        let zdf = id_of(&tree, "zdf");
        assert!(!tree.move_up_down(&zdf, Direction::Up));
        // edges of the listing
        let tf1 = id_of(&tree, "tf1");
        assert!(!tree.move_up_down(&tf1, Direction::Up));
        assert!(!tree.move_up_down(&zdf, Direction::Down));
        assert!(!tree.move_up_down("missing", Direction::Down));

        assert_eq!(tree, before);
    }

    #[test]
    fn test_rename_folder() {
        let (mut tree, folder) = sample();
        assert!(tree.rename_folder(&folder, "Francophone"));
        assert_eq!(tree.find(&folder).map(FavouriteEntry::name), Some("Francophone"));
        let tf1 = id_of(&tree, "tf1");
        assert!(!tree.rename_folder(&tf1, "nope"));
    }

    #[test]
    fn test_serialized_shape() {
        let (tree, _) = sample();
        let value = serde_json::to_value(&tree).unwrap();
        let items = value["items"].as_array().unwrap();
        assert_eq!(items[0]["type"], "channel");
        assert_eq!(items[0]["iso"], "FR");
        assert_eq!(items[1]["type"], "folder");
        assert_eq!(items[1]["children"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_store_persists_and_notifies() {
        let storage = MemoryStorage::new();
        let count = Arc::new(AtomicUsize::new(0));
        let mut store = FavouritesStore::new(Box::new(storage.clone()));
        let observed = Arc::clone(&count);
        store.subscribe(move || {
            observed.fetch_add(1, Ordering::SeqCst);
        });

        let tf1 = Channel::new("fr", "TF1", "http://a");
        assert!(store.add(&tf1).unwrap());
        assert!(!store.add(&tf1).unwrap());
        let folder = store.add_folder("News").unwrap();
        let id = store.tree().channel_entries()[0].id.clone();
        assert!(store.move_to_folder(&id, &folder).unwrap());
        assert!(!store.remove("missing").unwrap());
        assert_eq!(count.load(Ordering::SeqCst), 3);

        let reopened = FavouritesStore::new(Box::new(storage));
        assert!(reopened.is_favourite("FR", "tf1"));
        assert_eq!(order(&reopened.tree()), vec!["News", "  TF1"]);
    }

    #[test]
    fn test_store_corrupt_data_reads_empty() {
        let storage = MemoryStorage::new().with(FAVOURITES_KEY, "[[[");
        let mut store = FavouritesStore::new(Box::new(storage));
        assert!(store.tree().is_empty());
        assert!(store.add(&Channel::new("FR", "TF1", "http://a")).unwrap());
        assert_eq!(store.tree().items.len(), 1);
    }
}
