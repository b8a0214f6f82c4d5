//! "My List": an ordered, id-unique list of favorites persisted under one
//! storage key.

use async_trait::async_trait;
use futures::future::BoxFuture;
use std::future::IntoFuture;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::models::FavoriteEntry;

pub const STORAGE_KEY: &str = "cineflow.mylist.v1";

static TEMP_SEQ: AtomicU64 = AtomicU64::new(0);

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("could not encode list: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Durable string storage keyed by name.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get_item(&self, key: &str) -> Result<Option<String>, StoreError>;
    async fn set_item(&self, key: &str, value: String) -> Result<(), StoreError>;
}

/// One JSON file per key inside `dir`. Writes go to a uniquely named temp
/// file first and are renamed into place.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

#[async_trait]
impl KeyValueStore for FileStore {
    async fn get_item(&self, key: &str) -> Result<Option<String>, StoreError> {
        match tokio::fs::read_to_string(self.path_for(key)).await {
            Ok(raw) => Ok(Some(raw)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn set_item(&self, key: &str, value: String) -> Result<(), StoreError> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let path = self.path_for(key);
        let seq = TEMP_SEQ.fetch_add(1, Ordering::Relaxed);
        let tmp = self
            .dir
            .join(format!("{key}.json.{}-{seq}.tmp", std::process::id()));
        tokio::fs::write(&tmp, value).await?;
        tokio::fs::rename(&tmp, &path).await?;
        Ok(())
    }
}

/// Write of the full list captured at mutation time. In-memory state has
/// already changed; awaiting this makes it durable. A write older than one
/// already persisted is skipped.
#[must_use = "the list is only persisted when the write is awaited"]
pub struct PendingWrite {
    changed: bool,
    write: BoxFuture<'static, Result<(), StoreError>>,
}

impl PendingWrite {
    /// Whether the mutation altered the list.
    pub fn changed(&self) -> bool {
        self.changed
    }
}

impl IntoFuture for PendingWrite {
    type Output = Result<(), StoreError>;
    type IntoFuture = BoxFuture<'static, Result<(), StoreError>>;

    fn into_future(self) -> Self::IntoFuture {
        self.write
    }
}

pub struct FavoritesStore {
    storage: Arc<dyn KeyValueStore>,
    entries: Vec<FavoriteEntry>,
    generation: u64,
    /// Generation of the list currently on storage.
    persisted: Arc<Mutex<u64>>,
}

impl FavoritesStore {
    /// Reads the persisted list. Missing or unreadable storage yields an empty list.
    pub async fn load(storage: Arc<dyn KeyValueStore>) -> Self {
        let entries = match storage.get_item(STORAGE_KEY).await {
            Ok(Some(raw)) => match serde_json::from_str::<Vec<FavoriteEntry>>(&raw) {
                Ok(entries) => entries,
                Err(e) => {
                    warn!(error = %e, "Stored list is malformed, starting empty");
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!(error = %e, "Failed to read stored list, starting empty");
                Vec::new()
            }
        };
        info!(count = entries.len(), "Loaded my list");
        Self {
            storage,
            entries,
            generation: 0,
            persisted: Arc::new(Mutex::new(0)),
        }
    }

    /// Inserts at the front unless an entry with the same id exists.
    pub fn add(&mut self, entry: FavoriteEntry) -> PendingWrite {
        let changed = !self.contains(entry.id);
        if changed {
            debug!(id = entry.id, "Adding to my list");
            self.entries.insert(0, entry);
        }
        self.pending(changed)
    }

    pub fn remove(&mut self, id: i64) -> PendingWrite {
        let before = self.entries.len();
        self.entries.retain(|e| e.id != id);
        let changed = self.entries.len() != before;
        if changed {
            debug!(id, "Removed from my list");
        }
        self.pending(changed)
    }

    pub fn contains(&self, id: i64) -> bool {
        self.entries.iter().any(|e| e.id == id)
    }

    pub fn list(&self) -> &[FavoriteEntry] {
        &self.entries
    }

    fn pending(&mut self, changed: bool) -> PendingWrite {
        self.generation += 1;
        let generation = self.generation;
        let storage = Arc::clone(&self.storage);
        let persisted = Arc::clone(&self.persisted);
        let encoded = serde_json::to_string(&self.entries);
        PendingWrite {
            changed,
            write: Box::pin(async move {
                let mut last = persisted.lock().await;
                if *last >= generation {
                    debug!(generation, latest = *last, "Skipping superseded list write");
                    return Ok(());
                }
                storage.set_item(STORAGE_KEY, encoded?).await?;
                *last = generation;
                Ok::<(), StoreError>(())
            }),
        }
    }
}
