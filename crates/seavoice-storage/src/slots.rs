//! Slot files under a local directory.
//!
//! Each slot is one pretty-printed JSON file. Saves write a temp file next to
//! the target and rename it over, so a crash never leaves half a document.

use std::fmt;
use std::path::{Path, PathBuf};

use seavoice_core::models::snapshot::{Snapshot, missing_keys};
use tracing::{debug, info};

use crate::error::StorageError;

const APP_DIR: &str = "seavoice";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    /// The data explorer session.
    Explorer,
    /// The text-only chat session.
    Chat,
    TriviaHighScore,
}

impl Slot {
    pub fn as_str(self) -> &'static str {
        match self {
            Slot::Explorer => "explorer",
            Slot::Chat => "chat",
            Slot::TriviaHighScore => "trivia_high_score",
        }
    }

    fn file_name(self) -> String {
        format!("{}.json", self.as_str())
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Slots stored as files in one directory.
#[derive(Debug, Clone)]
pub struct SlotStore {
    root: PathBuf,
}

impl SlotStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Store rooted at the platform data directory, e.g.
    /// `~/.local/share/seavoice` on Linux.
    pub fn default_location() -> Result<Self, StorageError> {
        let base = dirs::data_dir().ok_or(StorageError::NoDataDir)?;
        Ok(Self::new(base.join(APP_DIR)))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path(&self, slot: Slot) -> PathBuf {
        self.root.join(slot.file_name())
    }

    pub async fn save<T: Snapshot>(&self, slot: Slot, value: &T) -> Result<(), StorageError> {
        tokio::fs::create_dir_all(&self.root).await?;

        let body = serde_json::to_vec_pretty(value)?;
        let path = self.path(slot);
        let tmp_path = self.root.join(format!("{}.tmp", slot.file_name()));
        tokio::fs::write(&tmp_path, &body).await?;
        tokio::fs::rename(&tmp_path, &path).await?;

        info!(%slot, bytes = body.len(), "slot saved");
        Ok(())
    }

    /// Load a slot, rejecting documents without every required top-level key.
    pub async fn load<T: Snapshot>(&self, slot: Slot) -> Result<T, StorageError> {
        let path = self.path(slot);
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StorageError::NotFound {
                    slot: slot.to_string(),
                });
            }
            Err(e) => return Err(e.into()),
        };

        let document: serde_json::Value = serde_json::from_slice(&bytes)?;
        let missing = missing_keys(&document, T::REQUIRED_KEYS);
        if !missing.is_empty() {
            return Err(StorageError::MissingKeys {
                slot: slot.to_string(),
                keys: missing,
            });
        }

        let value = serde_json::from_value(document)?;
        debug!(%slot, "slot loaded");
        Ok(value)
    }

    /// Like [`load`](Self::load), but an absent slot is `None`.
    pub async fn load_optional<T: Snapshot>(&self, slot: Slot) -> Result<Option<T>, StorageError> {
        match self.load(slot).await {
            Ok(value) => Ok(Some(value)),
            Err(StorageError::NotFound { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Remove a slot. Removing an absent slot is not an error.
    pub async fn delete(&self, slot: Slot) -> Result<(), StorageError> {
        match tokio::fs::remove_file(self.path(slot)).await {
            Ok(()) => {
                info!(%slot, "slot deleted");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
