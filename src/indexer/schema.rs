//! Loading of index schema documents and the product corpus

use crate::backend::IndexSchema;
use crate::indexer::error::{IndexerError, IndexerResult};
use crate::models::Product;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};

/// Reads the settings and mappings documents for a new generation
#[derive(Debug, Clone)]
pub struct SchemaLoader {
    settings_path: PathBuf,
    mappings_path: PathBuf,
}

impl SchemaLoader {
    pub fn new(settings_path: impl Into<PathBuf>, mappings_path: impl Into<PathBuf>) -> Self {
        Self {
            settings_path: settings_path.into(),
            mappings_path: mappings_path.into(),
        }
    }

    pub async fn load(&self) -> IndexerResult<IndexSchema> {
        let settings = read_json_object(&self.settings_path).await?;
        let mappings = read_json_object(&self.mappings_path).await?;
        Ok(IndexSchema { settings, mappings })
    }
}

/// Supplies the documents loaded into each new generation
#[async_trait]
pub trait ProductSource: Send + Sync {
    async fn load_products(&self) -> IndexerResult<Vec<Product>>;
}

/// Product corpus stored as a JSON array on disk
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl ProductSource for JsonFileSource {
    async fn load_products(&self) -> IndexerResult<Vec<Product>> {
        read_json(&self.path).await
    }
}

/// Fixed corpus held in memory
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    products: Vec<Product>,
}

impl StaticSource {
    pub fn new(products: Vec<Product>) -> Self {
        Self { products }
    }
}

#[async_trait]
impl ProductSource for StaticSource {
    async fn load_products(&self) -> IndexerResult<Vec<Product>> {
        Ok(self.products.clone())
    }
}

async fn read_json<T: DeserializeOwned>(path: &Path) -> IndexerResult<T> {
    let content = tokio::fs::read_to_string(path).await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            IndexerError::Configuration(format!("File not found: {}", path.display()))
        } else {
            IndexerError::Configuration(format!("Cannot read file {}: {}", path.display(), e))
        }
    })?;

    serde_json::from_str(&content).map_err(|e| {
        IndexerError::Configuration(format!("Invalid JSON in {}: {}", path.display(), e))
    })
}

async fn read_json_object(path: &Path) -> IndexerResult<serde_json::Value> {
    let value: serde_json::Value = read_json(path).await?;
    if !value.is_object() {
        return Err(IndexerError::Configuration(format!(
            "Expected a JSON object in {}",
            path.display()
        )));
    }
    Ok(value)
}
