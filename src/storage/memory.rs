use async_trait::async_trait;
use parking_lot::RwLock;

use crate::confessions::{Confession, ConfessionId, NewConfession};
use super::collection::Collection;
use super::{ConfessionStore, PageSlice, StoreError};

/// Process-local store. Contents vanish with the process; used for tests and
/// for running without a data directory.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Collection>,
}

impl MemoryStore {
    pub fn new() -> Self { Self::default() }
}

#[async_trait]
impl ConfessionStore for MemoryStore {
    async fn insert(&self, new: NewConfession) -> Result<Confession, StoreError> {
        self.inner.write().insert(new)
    }

    async fn find_page(&self, skip: u64, limit: u64) -> Result<PageSlice, StoreError> {
        Ok(self.inner.read().page(skip, limit))
    }

    async fn count(&self) -> Result<u64, StoreError> {
        Ok(self.inner.read().count())
    }

    async fn find_by_id(&self, id: &ConfessionId) -> Result<Option<Confession>, StoreError> {
        Ok(self.inner.read().get(id))
    }

    async fn save(&self, doc: &Confession) -> Result<Confession, StoreError> {
        self.inner.write().save(doc)
    }

    async fn delete_by_id(&self, id: &ConfessionId) -> Result<bool, StoreError> {
        Ok(self.inner.write().delete(id))
    }
}
