// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: (C) 2025 Cranky Kernel <crankykernel@proton.me>

use anyhow::{Context, Result};
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

/// Whole-document persistence for client state.
pub trait Storage: Send + std::fmt::Debug {
    /// Returns the stored document, or `None` if nothing was saved yet.
    fn read(&self, key: &str) -> Result<Option<String>>;

    fn write(&self, key: &str, content: &str) -> Result<()>;
}

/// Stores each document as `<dir>/<key>.json`.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new<P: Into<PathBuf>>(dir: P) -> Result<Self> {
        let dir = dir.into();

        if !dir.exists() {
            fs::create_dir_all(&dir).with_context(|| {
                format!("Failed to create storage directory: {}", dir.display())
            })?;
        }

        Ok(Self { dir })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl Storage for FileStorage {
    fn read(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key);

        if !path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Ok(Some(content))
    }

    fn write(&self, key: &str, content: &str) -> Result<()> {
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");

        fs::write(&tmp, content)
            .with_context(|| format!("Failed to write {}", tmp.display()))?;
        fs::rename(&tmp, &path)
            .with_context(|| format!("Failed to replace {}", path.display()))?;

        Ok(())
    }
}

/// Process-local storage; clones share the same documents.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    documents: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(self, key: &str, content: &str) -> Self {
        if let Ok(mut documents) = self.documents.lock() {
            documents.insert(key.to_string(), content.to_string());
        }
        self
    }
}

impl Storage for MemoryStorage {
    fn read(&self, key: &str) -> Result<Option<String>> {
        let documents = self
            .documents
            .lock()
            .map_err(|_| anyhow::anyhow!("Memory storage lock poisoned"))?;
        Ok(documents.get(key).cloned())
    }

    fn write(&self, key: &str, content: &str) -> Result<()> {
        let mut documents = self
            .documents
            .lock()
            .map_err(|_| anyhow::anyhow!("Memory storage lock poisoned"))?;
        documents.insert(key.to_string(), content.to_string());
        Ok(())
    }
}

/// Subscriber list notified after every persisted store mutation.
#[derive(Default)]
pub struct Subscribers {
    callbacks: Vec<Box<dyn Fn() + Send>>,
}

impl Subscribers {
    pub fn push(&mut self, callback: Box<dyn Fn() + Send>) {
        self.callbacks.push(callback);
    }

    pub fn notify(&self) {
        for callback in &self.callbacks {
            callback();
        }
    }

    pub fn len(&self) -> usize {
        self.callbacks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.callbacks.is_empty()
    }
}

impl std::fmt::Debug for Subscribers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Subscribers({})", self.callbacks.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_file_storage_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path().join("state")).unwrap();

        assert!(storage.read("favorites").unwrap().is_none());
        storage.write("favorites", r#"{"items":[]}"#).unwrap();
        assert_eq!(
            storage.read("favorites").unwrap().as_deref(),
            Some(r#"{"items":[]}"#)
        );
        assert!(dir.path().join("state").join("favorites.json").exists());
    }

    #[test]
    fn test_memory_storage_clones_share_documents() {
        let storage = MemoryStorage::new();
        let other = storage.clone();
        storage.write("trash", "[]").unwrap();
        assert_eq!(other.read("trash").unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn test_subscribers_are_notified() {
        let count = Arc::new(AtomicUsize::new(0));
        let mut subscribers = Subscribers::default();
        for _ in 0..2 {
            let count = Arc::clone(&count);
            subscribers.push(Box::new(move || {
                count.fetch_add(1, Ordering::SeqCst);
            }));
        }
        subscribers.notify();
        assert_eq!(count.load(Ordering::SeqCst), 2);
        assert_eq!(subscribers.len(), 2);
    }
}
