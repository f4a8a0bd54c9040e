// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: (C) 2025 Cranky Kernel <crankykernel@proton.me>

use anyhow::{Context, Result};
use reqwest::{Client, StatusCode};
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::path::PathBuf;
use std::time::Duration;
use tokio::fs as async_fs;
use tracing::debug;

/// Location of one document below the data root, as path segments.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FragmentPath {
    segments: Vec<String>,
}

impl FragmentPath {
    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            segments: segments.into_iter().map(Into::into).collect(),
        }
    }

    /// `channels/<CODE>/<source>.json`
    pub fn country(code: &str, source: &str) -> Self {
        Self::new([
            "channels".to_string(),
            code.to_uppercase(),
            format!("{}.json", source),
        ])
    }

    /// `cat_channels/<category>/<source>.json`
    pub fn category(category: &str, source: &str) -> Self {
        Self::new([
            "cat_channels".to_string(),
            category.to_string(),
            format!("{}.json", source),
        ])
    }

    pub fn categories() -> Self {
        Self::new(["cat_channels", "categories.json"])
    }

    pub fn catalog() -> Self {
        Self::new(["channels.json"])
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Segments that would escape the data root are refused.
    fn is_safe(&self) -> bool {
        self.segments.iter().all(|s| {
            !s.is_empty() && s != "." && s != ".." && !s.contains('/') && !s.contains('\\')
        })
    }

    fn url_path(&self) -> String {
        self.segments
            .iter()
            .map(|s| urlencoding::encode(s).into_owned())
            .collect::<Vec<_>>()
            .join("/")
    }
}

impl fmt::Display for FragmentPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments.join("/"))
    }
}

/// Read access to the scraped data tree.
///
/// `Ok(None)` means the document does not exist, which is the normal case
/// for sources that do not cover a country or category.
pub trait FragmentSource {
    fn fetch(&self, path: &FragmentPath) -> impl Future<Output = Result<Option<String>>>;
}

/// Fetches fragments from a static file server.
#[derive(Debug, Clone)]
pub struct HttpSource {
    client: Client,
    base_url: url::Url,
}

impl HttpSource {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let mut base = base_url.to_string();
        if !base.ends_with('/') {
            base.push('/');
        }
        let base_url = url::Url::parse(&base).with_context(|| "Invalid data root URL")?;

        Ok(Self {
            client: Client::builder()
                .timeout(timeout)
                .user_agent(concat!("worldtv/", env!("CARGO_PKG_VERSION")))
                .build()?,
            base_url,
        })
    }

    fn url_for(&self, path: &FragmentPath) -> Result<url::Url> {
        self.base_url
            .join(&path.url_path())
            .with_context(|| format!("Invalid fragment path: {}", path))
    }
}

impl FragmentSource for HttpSource {
    async fn fetch(&self, path: &FragmentPath) -> Result<Option<String>> {
        if !path.is_safe() {
            return Ok(None);
        }
        let url = self.url_for(path)?;
        debug!("Requesting {}", url);

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .with_context(|| format!("Failed to send request to {}", url))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(anyhow::anyhow!(
                "HTTP request for {} failed with status: {}",
                url,
                response.status()
            ));
        }

        let body = response
            .text()
            .await
            .with_context(|| format!("Failed to read response body from {}", url))?;
        Ok(Some(body))
    }
}

/// Reads fragments from a local checkout of the data tree.
#[derive(Debug, Clone)]
pub struct DirSource {
    root: PathBuf,
}

impl DirSource {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self { root: root.into() }
    }

    fn path_for(&self, path: &FragmentPath) -> PathBuf {
        path.segments()
            .iter()
            .fold(self.root.clone(), |acc, segment| acc.join(segment))
    }
}

impl FragmentSource for DirSource {
    async fn fetch(&self, path: &FragmentPath) -> Result<Option<String>> {
        if !path.is_safe() {
            return Ok(None);
        }
        let file = self.path_for(path);
        match async_fs::read_to_string(&file).await {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => {
                Err(e).with_context(|| format!("Failed to read fragment: {}", file.display()))
            }
        }
    }
}

/// In-memory data tree, keyed by the slash-joined fragment path.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    documents: HashMap<String, String>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: &FragmentPath, content: impl Into<String>) {
        self.documents.insert(path.to_string(), content.into());
    }

    pub fn with(mut self, path: FragmentPath, content: impl Into<String>) -> Self {
        self.insert(&path, content);
        self
    }
}

impl FragmentSource for MemorySource {
    async fn fetch(&self, path: &FragmentPath) -> Result<Option<String>> {
        Ok(self.documents.get(&path.to_string()).cloned())
    }
}

/// The data root named in the configuration: a URL or a directory.
#[derive(Debug, Clone)]
pub enum DataSource {
    Http(HttpSource),
    Dir(DirSource),
}

impl DataSource {
    pub fn from_root(root: &str, timeout: Duration) -> Result<Self> {
        if root.starts_with("http://") || root.starts_with("https://") {
            Ok(Self::Http(HttpSource::new(root, timeout)?))
        } else {
            Ok(Self::Dir(DirSource::new(root)))
        }
    }
}

impl FragmentSource for DataSource {
    async fn fetch(&self, path: &FragmentPath) -> Result<Option<String>> {
        match self {
            Self::Http(source) => source.fetch(path).await,
            Self::Dir(source) => source.fetch(path).await,
        }
    }
}
