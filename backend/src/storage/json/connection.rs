//! Data-directory management for the JSON storage backend.

use anyhow::Result;
use log::info;
use std::fs;
use std::path::{Path, PathBuf};

/// Name of the single persisted collection inside the data directory.
const TRANSACTIONS_FILE: &str = "transactions.json";

/// JsonConnection owns the data directory the transaction history lives in.
#[derive(Clone)]
pub struct JsonConnection {
    base_directory: PathBuf,
}

impl JsonConnection {
    /// Create a connection rooted at an explicit directory, creating it if
    /// necessary.
    pub fn new<P: AsRef<Path>>(base_directory: P) -> Result<Self> {
        let base_path = base_directory.as_ref().to_path_buf();

        if !base_path.exists() {
            fs::create_dir_all(&base_path)?;
        }

        Ok(Self {
            base_directory: base_path,
        })
    }

    /// Create a connection in the default data directory:
    /// `Documents/Cash Drawer Tracker`, falling back to the home directory
    /// when no documents directory exists.
    pub fn new_default() -> Result<Self> {
        let documents_dir = dirs::document_dir()
            .or_else(dirs::home_dir)
            .ok_or_else(|| anyhow::anyhow!("Could not determine home directory"))?;

        let data_dir = documents_dir.join("Cash Drawer Tracker");
        info!("Using data directory: {}", data_dir.display());
        Self::new(data_dir)
    }

    /// The base directory path.
    pub fn base_directory(&self) -> &Path {
        &self.base_directory
    }

    /// Path of the persisted transaction collection.
    pub fn transactions_file_path(&self) -> PathBuf {
        self.base_directory.join(TRANSACTIONS_FILE)
    }
}
