use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::ApplicationFields;

/// Storage key holding the wizard draft.
pub const DRAFT_KEY: &str = "merchant_form_data";

/// Snapshot of an in-progress wizard: `{step, formValues}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormDraft {
    pub step: u8,
    pub form_values: ApplicationFields,
}

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("storage io failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("storage encoding failed: {0}")]
    Encoding(#[from] serde_json::Error),
}

/// String key/value store with browser local-storage semantics.
pub trait LocalStorage: Send + Sync {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove_item(&self, key: &str) -> Result<(), StorageError>;
}

#[derive(Debug, Default)]
pub struct MemoryLocalStorage {
    items: Mutex<HashMap<String, String>>,
}

impl MemoryLocalStorage {
    pub fn keys(&self) -> Vec<String> {
        let guard = self.items.lock().unwrap_or_else(PoisonError::into_inner);
        let mut keys: Vec<String> = guard.keys().cloned().collect();
        keys.sort();
        keys
    }
}

impl LocalStorage for MemoryLocalStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        let guard = self.items.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(guard.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut guard = self.items.lock().unwrap_or_else(PoisonError::into_inner);
        guard.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        let mut guard = self.items.lock().unwrap_or_else(PoisonError::into_inner);
        guard.remove(key);
        Ok(())
    }
}

/// Local storage persisted as one JSON object on disk. A missing file reads as empty.
#[derive(Debug)]
pub struct FileLocalStorage {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileLocalStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>, StorageError> {
        match fs::read_to_string(&self.path) {
            Ok(raw) if raw.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(raw) => Ok(serde_json::from_str(&raw)?),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(err) => Err(err.into()),
        }
    }

    fn write_all(&self, items: &BTreeMap<String, String>) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, serde_json::to_vec_pretty(items)?)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl LocalStorage for FileLocalStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(self.read_all()?.remove(key))
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut items = self.read_all()?;
        items.insert(key.to_string(), value.to_string());
        self.write_all(&items)
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut items = self.read_all()?;
        if items.remove(key).is_some() {
            self.write_all(&items)?;
        }
        Ok(())
    }
}

/// Persistence port the wizard depends on.
pub trait DraftStore: Send + Sync {
    fn save(&self, draft: &FormDraft) -> Result<(), StorageError>;
    /// Unreadable or unparseable snapshots load as `None`.
    fn load(&self) -> Option<FormDraft>;
    fn clear(&self) -> Result<(), StorageError>;
}

/// Draft store over a [`LocalStorage`], one unversioned snapshot under [`DRAFT_KEY`].
pub struct LocalDraftStore<S> {
    storage: Arc<S>,
}

impl<S: LocalStorage> LocalDraftStore<S> {
    pub fn new(storage: Arc<S>) -> Self {
        Self { storage }
    }
}

impl<S: LocalStorage> DraftStore for LocalDraftStore<S> {
    fn save(&self, draft: &FormDraft) -> Result<(), StorageError> {
        let encoded = serde_json::to_string(draft)?;
        self.storage.set_item(DRAFT_KEY, &encoded)
    }

    fn load(&self) -> Option<FormDraft> {
        let raw = match self.storage.get_item(DRAFT_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(err) => {
                debug!(error = %err, "draft storage unreadable; starting fresh");
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(draft) => Some(draft),
            Err(err) => {
                debug!(error = %err, "discarding unparseable draft");
                None
            }
        }
    }

    fn clear(&self) -> Result<(), StorageError> {
        self.storage.remove_item(DRAFT_KEY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> FormDraft {
        let mut form_values = ApplicationFields::default();
        form_values.business_name = "Sari-Sari Hub".to_string();
        form_values.current_mode_of_payment.qrph = true;
        FormDraft {
            step: 2,
            form_values,
        }
    }

    #[test]
    fn memory_store_overwrites_single_snapshot() {
        let storage = Arc::new(MemoryLocalStorage::default());
        let store = LocalDraftStore::new(storage.clone());

        store.save(&draft()).expect("save");
        let mut second = draft();
        second.step = 3;
        store.save(&second).expect("save again");

        assert_eq!(store.load(), Some(second));
        assert_eq!(storage.keys(), vec![DRAFT_KEY.to_string()]);

        store.clear().expect("clear");
        assert_eq!(store.load(), None);
    }

    #[test]
    fn unparseable_snapshot_loads_as_none() {
        let storage = Arc::new(MemoryLocalStorage::default());
        storage
            .set_item(DRAFT_KEY, "{not json")
            .expect("seed corrupt draft");
        let store = LocalDraftStore::new(storage);
        assert_eq!(store.load(), None);
    }

    #[test]
    fn snapshot_uses_camel_case_shape() {
        let encoded = serde_json::to_value(draft()).expect("encode");
        assert_eq!(encoded["step"], 2);
        assert_eq!(encoded["formValues"]["businessName"], "Sari-Sari Hub");
        assert_eq!(encoded["formValues"]["currentModeOfPayment"]["qrph"], true);
    }

    #[test]
    fn file_store_survives_reopen() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("nested").join("local-storage.json");

        {
            let store = LocalDraftStore::new(Arc::new(FileLocalStorage::new(&path)));
            store.save(&draft()).expect("save to file");
        }

        let reopened = LocalDraftStore::new(Arc::new(FileLocalStorage::new(&path)));
        assert_eq!(reopened.load(), Some(draft()));
        reopened.clear().expect("clear");
        assert_eq!(reopened.load(), None);
    }
}
