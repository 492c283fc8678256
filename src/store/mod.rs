//! Key-value persistence for the session user, the beehive list and the
//! setup-complete flag.
//!
//! Every backend implements [`RecordStore`]; [`Store`] layers the typed
//! accessors the services use on top of it.

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::config::{StoreBackend, StoreConfig};
use crate::constants::storage_keys;
use crate::db::SqliteStore;
use crate::models::{Beehive, Session};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed value under '{key}': {message}")]
    Serialization { key: String, message: String },

    #[error("Database error: {0}")]
    Database(String),
}

impl From<sea_orm::DbErr> for StoreError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

/// Raw key-value operations. Writes are visible to the next read in the
/// same process; nothing is synchronised across processes.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn get_value(&self, key: &str) -> Result<Option<Value>, StoreError>;

    /// Full overwrite of whatever is stored under `key`.
    async fn set_value(&self, key: &str, value: Value) -> Result<(), StoreError>;

    async fn remove(&self, key: &str) -> Result<(), StoreError>;

    /// Returns `None` if the collection was never initialised.
    async fn get_collection(&self, key: &str) -> Result<Option<Vec<Value>>, StoreError> {
        match self.get_value(key).await? {
            None => Ok(None),
            Some(Value::Array(items)) => Ok(Some(items)),
            Some(other) => Err(StoreError::Serialization {
                key: key.to_string(),
                message: format!("expected a list, found {other}"),
            }),
        }
    }

    async fn set_collection(&self, key: &str, items: Vec<Value>) -> Result<(), StoreError> {
        self.set_value(key, Value::Array(items)).await
    }

    async fn get_scalar(&self, key: &str) -> Result<Option<Value>, StoreError> {
        self.get_value(key).await
    }

    async fn set_scalar(&self, key: &str, value: Value) -> Result<(), StoreError> {
        self.set_value(key, value).await
    }
}

/// Typed access to the three logical collections.
#[derive(Clone)]
pub struct Store {
    backend: Arc<dyn RecordStore>,
}

impl Store {
    #[must_use]
    pub fn new(backend: Arc<dyn RecordStore>) -> Self {
        Self { backend }
    }

    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    pub async fn open(config: &StoreConfig) -> Result<Self, StoreError> {
        let backend: Arc<dyn RecordStore> = match config.backend {
            StoreBackend::Memory => Arc::new(MemoryStore::new()),
            StoreBackend::File => Arc::new(FileStore::open(&config.path).await?),
            StoreBackend::Sqlite => Arc::new(SqliteStore::new(&config.database_url).await?),
        };
        debug!(backend = ?config.backend, "Record store opened");
        Ok(Self::new(backend))
    }

    #[must_use]
    pub fn backend(&self) -> &Arc<dyn RecordStore> {
        &self.backend
    }

    /// `None` means the beehive list has never been seeded.
    pub async fn load_beehives(&self) -> Result<Option<Vec<Beehive>>, StoreError> {
        let Some(items) = self.backend.get_collection(storage_keys::BEEHIVES).await? else {
            return Ok(None);
        };

        items
            .into_iter()
            .map(|item| decode(storage_keys::BEEHIVES, item))
            .collect::<Result<Vec<_>, _>>()
            .map(Some)
    }

    pub async fn save_beehives(&self, hives: &[Beehive]) -> Result<(), StoreError> {
        let items = hives
            .iter()
            .map(|hive| encode(storage_keys::BEEHIVES, hive))
            .collect::<Result<Vec<_>, _>>()?;
        self.backend
            .set_collection(storage_keys::BEEHIVES, items)
            .await
    }

    pub async fn current_session(&self) -> Result<Option<Session>, StoreError> {
        match self.backend.get_scalar(storage_keys::CURRENT_USER).await? {
            None | Some(Value::Null) => Ok(None),
            Some(value) => decode(storage_keys::CURRENT_USER, value).map(Some),
        }
    }

    pub async fn save_session(&self, session: &Session) -> Result<(), StoreError> {
        let value = encode(storage_keys::CURRENT_USER, session)?;
        self.backend
            .set_scalar(storage_keys::CURRENT_USER, value)
            .await
    }

    pub async fn clear_session(&self) -> Result<(), StoreError> {
        self.backend.remove(storage_keys::CURRENT_USER).await
    }

    pub async fn setup_complete(&self) -> Result<bool, StoreError> {
        let value = self.backend.get_scalar(storage_keys::SETUP_COMPLETE).await?;
        Ok(match value {
            Some(Value::Bool(flag)) => flag,
            Some(Value::String(s)) => s == "true",
            _ => false,
        })
    }

    pub async fn set_setup_complete(&self, complete: bool) -> Result<(), StoreError> {
        self.backend
            .set_scalar(storage_keys::SETUP_COMPLETE, Value::Bool(complete))
            .await
    }
}

fn decode<T: serde::de::DeserializeOwned>(key: &str, value: Value) -> Result<T, StoreError> {
    serde_json::from_value(value).map_err(|e| StoreError::Serialization {
        key: key.to_string(),
        message: e.to_string(),
    })
}

fn encode<T: serde::Serialize>(key: &str, value: &T) -> Result<Value, StoreError> {
    serde_json::to_value(value).map_err(|e| StoreError::Serialization {
        key: key.to_string(),
        message: e.to_string(),
    })
}
