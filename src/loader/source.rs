//! Where layer documents are fetched from.
//!
//! Configuration is via environment variables:
//! - `RIDERSHIP_MAP_DATA_URL` - Base URL that relative layer paths are joined onto
//! - `RIDERSHIP_MAP_DATA_DIR` - Local directory read instead of HTTP (takes precedence)

use std::path::{Path, PathBuf};

use reqwest::Client;

use super::LoadError;

/// HTTP client for layer documents.
#[derive(Debug, Clone)]
pub struct DataClient {
    base_url: String,
    client: Client,
}

impl DataClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            client: Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URLs are used as-is; anything else is joined onto the base URL.
    pub fn url_for(&self, locator: &str) -> String {
        if locator.starts_with("http://") || locator.starts_with("https://") {
            return locator.to_string();
        }
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            locator.trim_start_matches('/')
        )
    }

    /// GET a document body. Non-success statuses are errors.
    pub async fn fetch(&self, locator: &str) -> Result<String, LoadError> {
        let url = self.url_for(locator);
        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(LoadError::Status { url, status });
        }
        Ok(response.text().await?)
    }
}

/// Source of layer documents.
#[derive(Debug, Clone)]
pub enum DataSource {
    Http(DataClient),
    Dir(PathBuf),
}

impl DataSource {
    /// Local directory if `RIDERSHIP_MAP_DATA_DIR` is set, else
    /// `RIDERSHIP_MAP_DATA_URL`, else the current directory.
    pub fn from_env() -> Self {
        if let Ok(dir) = std::env::var("RIDERSHIP_MAP_DATA_DIR") {
            return Self::Dir(PathBuf::from(dir));
        }
        if let Ok(url) = std::env::var("RIDERSHIP_MAP_DATA_URL") {
            return Self::Http(DataClient::new(url));
        }
        Self::Dir(PathBuf::from("."))
    }

    pub fn http(base_url: impl Into<String>) -> Self {
        Self::Http(DataClient::new(base_url))
    }

    pub fn dir(path: impl AsRef<Path>) -> Self {
        Self::Dir(path.as_ref().to_path_buf())
    }

    pub async fn fetch(&self, locator: &str) -> Result<String, LoadError> {
        match self {
            Self::Http(client) => client.fetch(locator).await,
            Self::Dir(root) => {
                let path = root.join(locator.trim_start_matches('/'));
                tokio::fs::read_to_string(&path)
                    .await
                    .map_err(|source| LoadError::Io { path, source })
            }
        }
    }

    /// URL the page uses for a static asset such as a marker icon.
    ///
    /// HTTP sources join relative paths onto the base URL. Directory sources
    /// keep them relative, since the viewer serves the directory itself.
    pub fn asset_url(&self, locator: &str) -> String {
        match self {
            Self::Http(client) => client.url_for(locator),
            Self::Dir(_) => locator.to_string(),
        }
    }

    /// Local directory the viewer serves assets from, if any.
    pub fn asset_root(&self) -> Option<&Path> {
        match self {
            Self::Http(_) => None,
            Self::Dir(root) => Some(root),
        }
    }

    pub fn describe(&self) -> String {
        match self {
            Self::Http(client) => client.base_url().to_string(),
            Self::Dir(root) => root.display().to_string(),
        }
    }
}
