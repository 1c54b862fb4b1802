//! Key-value slot storage for serialized carts.
//!
//! A backend maps a [`SlotName`] to an opaque string. The store writes the
//! complete cart after every mutation and removes the slot on clear; an absent
//! slot reads as an empty cart.

use std::collections::HashMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use thiserror::Error;

use crate::slot::SlotName;

/// Errors raised by a storage backend.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Filesystem operation failed.
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Backend-specific failure (quota exceeded, unavailable, ...).
    #[error("Storage backend error: {0}")]
    Backend(String),
}

impl StorageError {
    fn io(path: &Path, source: io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Result type alias for storage operations.
pub type Result<T> = std::result::Result<T, StorageError>;

/// Durable key-value storage holding serialized carts.
pub trait CartStorage {
    /// Read a slot. `Ok(None)` when the slot does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    fn load(&self, slot: &SlotName) -> Result<Option<String>>;

    /// Replace the contents of a slot.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the write.
    fn save(&mut self, slot: &SlotName, contents: &str) -> Result<()>;

    /// Delete a slot. Succeeds when the slot is already absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot delete the slot.
    fn remove(&mut self, slot: &SlotName) -> Result<()>;
}

impl<S: CartStorage + ?Sized> CartStorage for &mut S {
    fn load(&self, slot: &SlotName) -> Result<Option<String>> {
        (**self).load(slot)
    }

    fn save(&mut self, slot: &SlotName, contents: &str) -> Result<()> {
        (**self).save(slot, contents)
    }

    fn remove(&mut self, slot: &SlotName) -> Result<()> {
        (**self).remove(slot)
    }
}

// =============================================================================
// In-memory backend
// =============================================================================

/// Slots held in a `HashMap`; used for embedding and tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    slots: HashMap<String, String>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw contents of a slot.
    #[must_use]
    pub fn get(&self, slot: &str) -> Option<&str> {
        self.slots.get(slot).map(String::as_str)
    }

    /// Seed a slot with raw contents, bypassing any cart encoding.
    pub fn insert_raw(&mut self, slot: &str, contents: impl Into<String>) {
        self.slots.insert(slot.to_string(), contents.into());
    }
}

impl CartStorage for MemoryStorage {
    fn load(&self, slot: &SlotName) -> Result<Option<String>> {
        Ok(self.slots.get(slot.as_str()).cloned())
    }

    fn save(&mut self, slot: &SlotName, contents: &str) -> Result<()> {
        self.slots
            .insert(slot.as_str().to_string(), contents.to_string());
        Ok(())
    }

    fn remove(&mut self, slot: &SlotName) -> Result<()> {
        self.slots.remove(slot.as_str());
        Ok(())
    }
}

// =============================================================================
// File backend
// =============================================================================

/// One `<dir>/<slot>.json` file per slot.
///
/// Writes go to a temporary file in the same directory which is then renamed
/// over the target, so a crash mid-write leaves the previous cart intact. The
/// temporary file is deleted if the rename fails.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// Storage rooted at `dir`. The directory is created on first write.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file backing `slot`.
    #[must_use]
    pub fn slot_path(&self, slot: &SlotName) -> PathBuf {
        self.dir.join(format!("{slot}.json"))
    }
}

impl CartStorage for FileStorage {
    fn load(&self, slot: &SlotName) -> Result<Option<String>> {
        let path = self.slot_path(slot);
        match fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::io(&path, e)),
        }
    }

    fn save(&mut self, slot: &SlotName, contents: &str) -> Result<()> {
        fs::create_dir_all(&self.dir).map_err(|e| StorageError::io(&self.dir, e))?;

        let path = self.slot_path(slot);
        let mut tmp = NamedTempFile::new_in(&self.dir).map_err(|e| StorageError::io(&self.dir, e))?;
        tmp.write_all(contents.as_bytes())
            .map_err(|e| StorageError::io(tmp.path(), e))?;
        tmp.persist(&path)
            .map_err(|e| StorageError::io(&path, e.error))?;

        tracing::trace!(path = %path.display(), bytes = contents.len(), "Wrote cart slot");
        Ok(())
    }

    fn remove(&mut self, slot: &SlotName) -> Result<()> {
        let path = self.slot_path(slot);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::io(&path, e)),
        }
    }
}
