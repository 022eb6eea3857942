//! JSON document store persisted as a single snapshot file.
//!
//! Layout: `<data dir>/confessions.json` holding every document plus the
//! insertion sequence counter. Each mutation is applied to a copy of the
//! collection, the copy is written to `confessions.json.tmp` and renamed over
//! the snapshot, and only then does it become visible to readers. A failed
//! write therefore leaves both disk and memory untouched.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::confessions::{Confession, ConfessionId, NewConfession};
use crate::tprintln;
use super::collection::{Collection, Row};
use super::{ConfessionStore, PageSlice, StoreError};

pub const SNAPSHOT_FILE: &str = "confessions.json";
const SNAPSHOT_VERSION: u32 = 1;

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Snapshot {
    version: u32,
    next_seq: u64,
    confessions: Vec<Row>,
}

pub struct JsonFileStore {
    dir: PathBuf,
    current: RwLock<Collection>,
    /// Serializes writers so snapshots hit the disk in commit order.
    writer: tokio::sync::Mutex<()>,
}

impl JsonFileStore {
    /// Open (or create) the store under `dir`, loading any existing snapshot.
    pub async fn open(dir: impl AsRef<Path>) -> Result<Self, StoreError> {
        let dir = dir.as_ref().to_path_buf();
        tokio::fs::create_dir_all(&dir).await?;
        let path = dir.join(SNAPSHOT_FILE);
        let collection = match tokio::fs::read(&path).await {
            Ok(bytes) => {
                let snap: Snapshot = serde_json::from_slice(&bytes)?;
                if snap.version != SNAPSHOT_VERSION {
                    return Err(StoreError::Corrupt(format!("unsupported snapshot version {}", snap.version)));
                }
                Collection::from_rows(snap.confessions, snap.next_seq)?
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Collection::default(),
            Err(e) => return Err(e.into()),
        };
        info!(target: "storage", "opened {} with {} confessions", path.display(), collection.count());
        Ok(Self { dir, current: RwLock::new(collection), writer: tokio::sync::Mutex::new(()) })
    }

    pub fn snapshot_path(&self) -> PathBuf { self.dir.join(SNAPSHOT_FILE) }

    async fn persist(&self, collection: &Collection) -> Result<(), StoreError> {
        let snap = Snapshot { version: SNAPSHOT_VERSION, next_seq: collection.next_seq(), confessions: collection.rows_in_order() };
        let bytes = serde_json::to_vec_pretty(&snap)?;
        let path = self.snapshot_path();
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, &bytes).await?;
        tokio::fs::rename(&tmp, &path).await?;
        tprintln!("storage.persist path={} bytes={}", path.display(), bytes.len());
        Ok(())
    }

    async fn mutate<R, F>(&self, f: F) -> Result<R, StoreError>
    where
        F: FnOnce(&mut Collection) -> Result<R, StoreError>,
    {
        let _writer = self.writer.lock().await;
        let mut next = self.current.read().clone();
        let out = f(&mut next)?;
        self.persist(&next).await?;
        *self.current.write() = next;
        debug!(target: "storage", "snapshot committed");
        Ok(out)
    }
}

#[async_trait]
impl ConfessionStore for JsonFileStore {
    async fn insert(&self, new: NewConfession) -> Result<Confession, StoreError> {
        self.mutate(|c| c.insert(new)).await
    }

    async fn find_page(&self, skip: u64, limit: u64) -> Result<PageSlice, StoreError> {
        Ok(self.current.read().page(skip, limit))
    }

    async fn count(&self) -> Result<u64, StoreError> {
        Ok(self.current.read().count())
    }

    async fn find_by_id(&self, id: &ConfessionId) -> Result<Option<Confession>, StoreError> {
        Ok(self.current.read().get(id))
    }

    async fn save(&self, doc: &Confession) -> Result<Confession, StoreError> {
        self.mutate(|c| c.save(doc)).await
    }

    async fn delete_by_id(&self, id: &ConfessionId) -> Result<bool, StoreError> {
        let id = *id;
        let _writer = self.writer.lock().await;
        if self.current.read().get(&id).is_none() {
            return Ok(false);
        }
        let mut next = self.current.read().clone();
        next.delete(&id);
        self.persist(&next).await?;
        *self.current.write() = next;
        Ok(true)
    }
}
