//! Persistence of the timer queue and settings

use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
    sync::Mutex,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::{engine::CountdownSnapshot, state::Settings};

const QUEUE_FILE: &str = "queue.json";
const SETTINGS_FILE: &str = "settings.json";

/// Persisted form of one queued countdown
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerRecord {
    pub id: String,
    pub label: String,
    /// Total duration in milliseconds
    pub duration: u64,
}

impl From<&CountdownSnapshot> for TimerRecord {
    fn from(snapshot: &CountdownSnapshot) -> Self {
        Self {
            id: snapshot.id.clone(),
            label: snapshot.label.clone(),
            duration: snapshot.duration_ms,
        }
    }
}

/// Errors raised by a [`Store`] backend
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("corrupt data in {path}: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to encode data: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("store lock poisoned")]
    Poisoned,
}

/// Key-value backend for the queue and settings records.
///
/// `load_*` return `Ok(None)` when nothing has been saved yet.
pub trait Store: Send + Sync {
    fn load_queue(&self) -> Result<Option<Vec<TimerRecord>>, StoreError>;
    fn save_queue(&self, records: &[TimerRecord]) -> Result<(), StoreError>;
    fn load_settings(&self) -> Result<Option<Settings>, StoreError>;
    fn save_settings(&self, settings: &Settings) -> Result<(), StoreError>;
}

/// Store keeping each record as a JSON file in a data directory
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn read<T: DeserializeOwned>(&self, name: &str) -> Result<Option<T>, StoreError> {
        let path = self.dir.join(name);
        let data = match fs::read_to_string(&path) {
            Ok(data) => data,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No stored data at {}", path.display());
                return Ok(None);
            }
            Err(source) => return Err(StoreError::Io { path, source }),
        };
        serde_json::from_str(&data)
            .map(Some)
            .map_err(|source| StoreError::Corrupt { path, source })
    }

    fn write<T: Serialize + ?Sized>(&self, name: &str, value: &T) -> Result<(), StoreError> {
        fs::create_dir_all(&self.dir).map_err(|source| StoreError::Io {
            path: self.dir.clone(),
            source,
        })?;
        let data = serde_json::to_string_pretty(value)?;

        // Written beside the target and renamed into place
        let path = self.dir.join(name);
        let tmp = self.dir.join(format!("{name}.tmp"));
        fs::write(&tmp, data).map_err(|source| StoreError::Io {
            path: tmp.clone(),
            source,
        })?;
        fs::rename(&tmp, &path).map_err(|source| StoreError::Io { path, source })?;
        Ok(())
    }
}

impl Store for JsonFileStore {
    fn load_queue(&self) -> Result<Option<Vec<TimerRecord>>, StoreError> {
        self.read(QUEUE_FILE)
    }

    fn save_queue(&self, records: &[TimerRecord]) -> Result<(), StoreError> {
        self.write(QUEUE_FILE, records)
    }

    fn load_settings(&self) -> Result<Option<Settings>, StoreError> {
        self.read(SETTINGS_FILE)
    }

    fn save_settings(&self, settings: &Settings) -> Result<(), StoreError> {
        self.write(SETTINGS_FILE, settings)
    }
}

/// Store that keeps records in memory for the lifetime of the process
#[derive(Debug, Default)]
pub struct MemoryStore {
    queue: Mutex<Option<Vec<TimerRecord>>>,
    settings: Mutex<Option<Settings>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Store for MemoryStore {
    fn load_queue(&self) -> Result<Option<Vec<TimerRecord>>, StoreError> {
        self.queue
            .lock()
            .map(|queue| queue.clone())
            .map_err(|_| StoreError::Poisoned)
    }

    fn save_queue(&self, records: &[TimerRecord]) -> Result<(), StoreError> {
        let mut queue = self.queue.lock().map_err(|_| StoreError::Poisoned)?;
        *queue = Some(records.to_vec());
        Ok(())
    }

    fn load_settings(&self) -> Result<Option<Settings>, StoreError> {
        self.settings
            .lock()
            .map(|settings| settings.clone())
            .map_err(|_| StoreError::Poisoned)
    }

    fn save_settings(&self, settings: &Settings) -> Result<(), StoreError> {
        let mut stored = self.settings.lock().map_err(|_| StoreError::Poisoned)?;
        *stored = Some(settings.clone());
        Ok(())
    }
}
