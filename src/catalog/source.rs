//! Catalog sources
//!
//! Where the food catalog comes from: a URL fetched with reqwest, or a local
//! JSON file. Loading runs in a background task and fills a
//! [`CatalogHandle`]; a failure leaves an empty catalog behind.

use async_trait::async_trait;
use reqwest::Client;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

use super::{CatalogHandle, FoodCatalog};

/// Errors that can occur while loading the catalog
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Failed to read catalog file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Invalid catalog JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Catalog server returned status {0}")]
    Status(u16),
}

/// Something that can produce the food catalog
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Human-readable origin, for logs
    fn describe(&self) -> String;

    /// Fetch and parse the catalog
    async fn fetch(&self) -> Result<FoodCatalog, CatalogError>;
}

/// Catalog read from a JSON file
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl CatalogSource for FileSource {
    fn describe(&self) -> String {
        format!("file {}", self.path.display())
    }

    async fn fetch(&self) -> Result<FoodCatalog, CatalogError> {
        let content = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| CatalogError::Io {
                path: self.path.clone(),
                error: e.to_string(),
            })?;

        Ok(serde_json::from_str(&content)?)
    }
}

/// Catalog fetched over HTTP
pub struct HttpSource {
    client: Client,
    url: String,
}

impl HttpSource {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, CatalogError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

#[async_trait]
impl CatalogSource for HttpSource {
    fn describe(&self) -> String {
        format!("url {}", self.url)
    }

    async fn fetch(&self) -> Result<FoodCatalog, CatalogError> {
        let response = self.client.get(&self.url).send().await?;

        if !response.status().is_success() {
            return Err(CatalogError::Status(response.status().as_u16()));
        }

        Ok(response.json::<FoodCatalog>().await?)
    }
}

/// Load the catalog from `source` into `handle`
pub async fn load_into(handle: &CatalogHandle, source: &dyn CatalogSource) {
    let origin = source.describe();
    tracing::info!(source = %origin, "Loading food catalog");

    match source.fetch().await {
        Ok(catalog) => {
            tracing::info!(
                source = %origin,
                foods = catalog.foods.len(),
                conversions = catalog.unit_conversions.len(),
                "Food catalog loaded"
            );
            handle.set_ready(catalog);
        }
        Err(e) => {
            tracing::error!(source = %origin, error = %e, "Failed to load food catalog, continuing with an empty one");
            handle.set_failed(e.to_string());
        }
    }
}

/// Start loading the catalog in the background
pub fn spawn_load(
    handle: CatalogHandle,
    source: Box<dyn CatalogSource>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        load_into(&handle, source.as_ref()).await;
    })
}
