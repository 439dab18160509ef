use parking_lot::Mutex;
use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::utils::CompanionError;

/// Durable key-value slots holding the session between runs
pub trait SessionStore: Send + Sync {
    /// Read a slot, `None` when it was never written or has been cleared
    fn get(&self, slot: &str) -> Result<Option<String>, CompanionError>;

    /// Write a slot, replacing any previous value
    fn set(&self, slot: &str, value: &str) -> Result<(), CompanionError>;

    /// Clear a slot. Clearing an empty slot is not an error.
    fn remove(&self, slot: &str) -> Result<(), CompanionError>;
}

/// One file per slot inside a directory
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Create a store rooted at `dir`. The directory is created on first write.
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    fn slot_path(&self, slot: &str) -> PathBuf {
        self.dir.join(slot)
    }

    /// Get the directory holding the slots
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl SessionStore for FileStore {
    fn get(&self, slot: &str) -> Result<Option<String>, CompanionError> {
        match fs::read_to_string(self.slot_path(slot)) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(CompanionError::StorageError(format!(
                "reading slot '{}': {}",
                slot, e
            ))),
        }
    }

    fn set(&self, slot: &str, value: &str) -> Result<(), CompanionError> {
        fs::create_dir_all(&self.dir)
            .and_then(|_| fs::write(self.slot_path(slot), value))
            .map_err(|e| CompanionError::StorageError(format!("writing slot '{}': {}", slot, e)))
    }

    fn remove(&self, slot: &str) -> Result<(), CompanionError> {
        match fs::remove_file(self.slot_path(slot)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(CompanionError::StorageError(format!(
                "clearing slot '{}': {}",
                slot, e
            ))),
        }
    }
}

/// Process-local slots, for `--ephemeral` runs
#[derive(Default)]
pub struct MemoryStore {
    slots: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemoryStore {
    fn get(&self, slot: &str) -> Result<Option<String>, CompanionError> {
        Ok(self.slots.lock().get(slot).cloned())
    }

    fn set(&self, slot: &str, value: &str) -> Result<(), CompanionError> {
        self.slots.lock().insert(slot.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, slot: &str) -> Result<(), CompanionError> {
        self.slots.lock().remove(slot);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_file_store_slots() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileStore::new(temp_dir.path().join("session"));

        assert_eq!(store.get("token").unwrap(), None);

        store.set("token", "jwt-abc").unwrap();
        assert_eq!(store.get("token").unwrap().as_deref(), Some("jwt-abc"));
        assert!(store.dir().join("token").exists());

        store.set("token", "jwt-def").unwrap();
        assert_eq!(store.get("token").unwrap().as_deref(), Some("jwt-def"));

        store.remove("token").unwrap();
        assert_eq!(store.get("token").unwrap(), None);

        // Clearing twice is fine
        store.remove("token").unwrap();
    }

    #[test]
    fn test_memory_store_slots() {
        let store = MemoryStore::new();
        store.set("user", "{}").unwrap();
        assert_eq!(store.get("user").unwrap().as_deref(), Some("{}"));
        store.remove("user").unwrap();
        store.remove("user").unwrap();
        assert_eq!(store.get("user").unwrap(), None);
    }
}
