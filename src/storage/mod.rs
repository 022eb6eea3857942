//!
//! confessions storage module
//! ---------------------------
//! Thin persistence layer for the single confession collection. The API layer
//! talks to it only through the `ConfessionStore` trait, which mirrors the
//! document-database operations the resource needs: insert, sorted
//! skip/limit listing, lookup by id, save, delete by id and count.
//!
//! Two backends are provided:
//! - `MemoryStore`: process-local, used in tests and when no data directory is set.
//! - `JsonFileStore`: durable JSON snapshot under a data directory.
//!
//! Both enforce the text schema bounds independently of the API validation and
//! give each read a consistent view, so a page and its total always agree.
//! Single-document writes are atomic; nothing stronger is offered.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use thiserror::Error;
use tracing::info;

use crate::confessions::{Confession, ConfessionId, NewConfession};

mod collection;
mod file;
mod memory;
pub mod schema;

pub use file::{JsonFileStore, SNAPSHOT_FILE};
pub use memory::MemoryStore;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("document {0} does not exist")]
    Missing(String),

    #[error("snapshot is corrupt: {0}")]
    Corrupt(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// A slice of the listing together with the collection size observed by the
/// same read.
#[derive(Debug, Clone, Default)]
pub struct PageSlice {
    pub items: Vec<Confession>,
    pub total: u64,
}

#[async_trait]
pub trait ConfessionStore: Send + Sync {
    /// Persist a new document and return it with its generated id.
    async fn insert(&self, new: NewConfession) -> Result<Confession, StoreError>;

    /// Documents ordered by `createdAt` descending, skipping `skip` and
    /// returning at most `limit`, plus the total document count.
    async fn find_page(&self, skip: u64, limit: u64) -> Result<PageSlice, StoreError>;

    async fn count(&self) -> Result<u64, StoreError>;

    async fn find_by_id(&self, id: &ConfessionId) -> Result<Option<Confession>, StoreError>;

    /// Overwrite a document previously read from the store. Last writer wins.
    async fn save(&self, doc: &Confession) -> Result<Confession, StoreError>;

    /// Returns false when nothing was removed.
    async fn delete_by_id(&self, id: &ConfessionId) -> Result<bool, StoreError>;
}

pub type SharedStore = Arc<dyn ConfessionStore>;

/// Open the store selected by configuration: a JSON snapshot under
/// `data_dir`, or a memory store when no directory is given.
pub async fn open_store(data_dir: Option<&Path>) -> Result<SharedStore> {
    match data_dir {
        Some(dir) => {
            let store = JsonFileStore::open(dir)
                .await
                .with_context(|| format!("While opening confession store under {}", dir.display()))?;
            Ok(Arc::new(store))
        }
        None => {
            info!(target: "storage", "no data directory configured; confessions are kept in memory only");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}

#[cfg(test)]
#[path = "storage_tests.rs"]
mod storage_tests;
