//! Where the reference catalog comes from.
//!
//! The catalog is a JSON array of `{name, rarity, collection, minFloat?, maxFloat?}`
//! objects. It is fetched over HTTP by default, or read from a local file.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use crate::domain::SkinRecord;
use crate::error::CatalogError;

/// Public catalog used when nothing else is configured.
pub const DEFAULT_CATALOG_URL: &str =
    "https://raw.githubusercontent.com/wkRaphael/CCO-Tradeup-Script/refs/heads/main/skins.json";

/// Environment variable naming the catalog source (URL or path).
pub const CATALOG_ENV: &str = "TRADEUP_CATALOG";

/// A one-shot provider of catalog records.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    async fn fetch(&self) -> Result<Vec<SkinRecord>, CatalogError>;

    /// Short human-readable origin, for logs and status lines.
    fn describe(&self) -> String;
}

pub struct HttpCatalogSource {
    client: Client,
    url: String,
}

impl HttpCatalogSource {
    /// `timeout` is off by default: a hung request leaves the load in `Loading`.
    pub fn new(url: impl Into<String>, timeout: Option<Duration>) -> Result<Self, CatalogError> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| CatalogError::Transport(e.to_string()))?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

#[async_trait]
impl CatalogSource for HttpCatalogSource {
    async fn fetch(&self) -> Result<Vec<SkinRecord>, CatalogError> {
        debug!(url = %self.url, "fetching skins database");
        let resp = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| CatalogError::Transport(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(CatalogError::Status(resp.status().as_u16()));
        }

        resp.json::<Vec<SkinRecord>>()
            .await
            .map_err(|e| CatalogError::Decode(e.to_string()))
    }

    fn describe(&self) -> String {
        self.url.clone()
    }
}

pub struct FileCatalogSource {
    path: PathBuf,
}

impl FileCatalogSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl CatalogSource for FileCatalogSource {
    async fn fetch(&self) -> Result<Vec<SkinRecord>, CatalogError> {
        debug!(path = %self.path.display(), "reading skins database");
        let bytes = tokio::fs::read(&self.path).await.map_err(|e| CatalogError::Io {
            path: self.path.clone(),
            message: e.to_string(),
        })?;
        decode_catalog(&bytes)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// Decode a catalog document.
pub fn decode_catalog(bytes: &[u8]) -> Result<Vec<SkinRecord>, CatalogError> {
    serde_json::from_slice(bytes).map_err(|e| CatalogError::Decode(e.to_string()))
}

/// A catalog location as given on the command line or in the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogSpec {
    Http(String),
    File(PathBuf),
}

impl CatalogSpec {
    /// `http://` and `https://` strings are URLs; anything else is a path.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
            CatalogSpec::Http(trimmed.to_string())
        } else {
            CatalogSpec::File(Path::new(trimmed).to_path_buf())
        }
    }

    /// Explicit value, else `TRADEUP_CATALOG` (from the environment or `.env`),
    /// else the public catalog URL.
    pub fn resolve(explicit: Option<&str>) -> Self {
        if let Some(raw) = explicit {
            return Self::parse(raw);
        }
        dotenvy::dotenv().ok();
        match std::env::var(CATALOG_ENV) {
            Ok(raw) if !raw.trim().is_empty() => Self::parse(&raw),
            _ => CatalogSpec::Http(DEFAULT_CATALOG_URL.to_string()),
        }
    }

    pub fn into_source(self, timeout: Option<Duration>) -> Result<Arc<dyn CatalogSource>, CatalogError> {
        Ok(match self {
            CatalogSpec::Http(url) => Arc::new(HttpCatalogSource::new(url, timeout)?),
            CatalogSpec::File(path) => Arc::new(FileCatalogSource::new(path)),
        })
    }
}
