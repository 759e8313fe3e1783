use crate::date_key::DateKey;
use crate::errors::{MergeError, PersistFailure};
use crate::models::{DayRecord, PartialDayRecord};
use crate::store::DayStore;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::{
    collections::BTreeMap,
    path::PathBuf,
    sync::Arc,
};
use tokio::{fs, sync::Mutex};
use tracing::{info, warn};

/// Durable home of the calendar snapshot.
#[async_trait]
pub trait SnapshotStore: Send + Sync + 'static {
    async fn load(&self) -> Result<DayStore, PersistFailure>;
    async fn save(&self, store: &DayStore) -> Result<(), PersistFailure>;
}

/// On-disk shape: `{ "data": { "YYYY-MM-DD": { ... } } }`.
#[derive(Debug, Default, Deserialize)]
struct SnapshotIn {
    #[serde(default)]
    data: BTreeMap<String, serde_json::Value>,
}

#[derive(Debug, Serialize)]
struct SnapshotOut<'a> {
    data: BTreeMap<&'a DateKey, &'a DayRecord>,
}

/// Builds a store from raw persisted entries, skipping ones that do not
/// validate instead of refusing the whole file.
fn store_from_snapshot(snapshot: SnapshotIn) -> DayStore {
    let mut store = DayStore::new();
    for (raw_key, raw_record) in snapshot.data {
        let key = match raw_key.parse::<DateKey>() {
            Ok(key) => key,
            Err(err) => {
                warn!(key = %raw_key, "skipping persisted entry with bad date key: {err}");
                continue;
            }
        };
        let partial = match serde_json::from_value::<PartialDayRecord>(raw_record) {
            Ok(partial) => partial,
            Err(err) => {
                warn!(key = %raw_key, "skipping malformed persisted record: {err}");
                continue;
            }
        };
        if let Err(err) = store.merge(key, &partial) {
            warn!(key = %raw_key, "skipping invalid persisted record: {err}");
        }
    }
    store
}

pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn staging_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|name| name.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl SnapshotStore for JsonFileStore {
    async fn load(&self) -> Result<DayStore, PersistFailure> {
        let bytes = match fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                info!(path = %self.path.display(), "no snapshot yet, starting empty");
                return Ok(DayStore::new());
            }
            Err(source) => {
                return Err(PersistFailure::Read {
                    path: self.path.clone(),
                    source,
                });
            }
        };

        let snapshot: SnapshotIn =
            serde_json::from_slice(&bytes).map_err(|source| PersistFailure::Parse {
                path: self.path.clone(),
                source,
            })?;
        Ok(store_from_snapshot(snapshot))
    }

    async fn save(&self, store: &DayStore) -> Result<(), PersistFailure> {
        let snapshot = SnapshotOut {
            data: store.iter().collect(),
        };
        let payload = serde_json::to_vec_pretty(&snapshot).map_err(PersistFailure::Encode)?;

        // Write beside the target and rename so readers never see half a file.
        let staging = self.staging_path();
        let write_err = |source| PersistFailure::Write {
            path: self.path.clone(),
            source,
        };
        fs::write(&staging, payload).await.map_err(write_err)?;
        fs::rename(&staging, &self.path).await.map_err(write_err)?;
        Ok(())
    }
}

/// The shared store plus its persistence collaborator.
///
/// All writes go through one mutex, which also gives every key a single
/// writer. A merge is staged on a copy, saved, and only then swapped in.
#[derive(Clone)]
pub struct RecordStore {
    days: Arc<Mutex<DayStore>>,
    persistence: Arc<dyn SnapshotStore>,
}

impl RecordStore {
    pub fn new(initial: DayStore, persistence: Arc<dyn SnapshotStore>) -> Self {
        Self {
            days: Arc::new(Mutex::new(initial)),
            persistence,
        }
    }

    pub async fn open(persistence: Arc<dyn SnapshotStore>) -> Result<Self, PersistFailure> {
        let initial = persistence.load().await?;
        info!(days = initial.len(), "loaded calendar snapshot");
        Ok(Self::new(initial, persistence))
    }

    pub async fn get(&self, key: &DateKey) -> Option<DayRecord> {
        self.days.lock().await.get(key).cloned()
    }

    /// Runs `f` against a consistent view of the store.
    pub async fn read<T>(&self, f: impl FnOnce(&DayStore) -> T) -> T {
        let days = self.days.lock().await;
        f(&days)
    }

    pub async fn merge(
        &self,
        key: DateKey,
        partial: &PartialDayRecord,
    ) -> Result<DayRecord, MergeError> {
        let mut days = self.days.lock().await;
        let mut staged = days.clone();
        let record = staged.merge(key, partial)?;
        self.persistence.save(&staged).await?;
        *days = staged;
        Ok(record)
    }
}
