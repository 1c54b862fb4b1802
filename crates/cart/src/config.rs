//! Cart configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `BOUTIQUE_CART_DIR` - Directory holding persisted cart slots (default: `.boutique`)
//! - `BOUTIQUE_CART_SLOT` - Name of the slot holding the cart (default: `cart`)

use std::path::PathBuf;

use thiserror::Error;

use crate::slot::SlotName;
use crate::storage::FileStorage;

const DEFAULT_CART_DIR: &str = ".boutique";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Cart persistence configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartConfig {
    /// Directory holding one JSON file per slot
    pub storage_dir: PathBuf,
    /// Slot holding the shopper's cart
    pub slot: SlotName,
}

impl Default for CartConfig {
    fn default() -> Self {
        Self {
            storage_dir: PathBuf::from(DEFAULT_CART_DIR),
            slot: SlotName::default(),
        }
    }
}

impl CartConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if `BOUTIQUE_CART_SLOT` is not a valid slot name.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the slot variable is not a valid slot name.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let storage_dir = lookup("BOUTIQUE_CART_DIR")
            .filter(|dir| !dir.trim().is_empty())
            .map_or_else(|| PathBuf::from(DEFAULT_CART_DIR), PathBuf::from);

        let slot = match lookup("BOUTIQUE_CART_SLOT") {
            Some(raw) => SlotName::parse(raw.trim()).map_err(|e| {
                ConfigError::InvalidEnvVar("BOUTIQUE_CART_SLOT".to_string(), e.to_string())
            })?,
            None => SlotName::default(),
        };

        Ok(Self { storage_dir, slot })
    }

    /// File-backed storage rooted at the configured directory.
    #[must_use]
    pub fn file_storage(&self) -> FileStorage {
        FileStorage::new(&self.storage_dir)
    }
}
