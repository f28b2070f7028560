use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::constants::{defaults, images};
use crate::error::{GenChatError, Result};

/// One generated image recorded in the history file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ImageHistoryEntry {
    pub path: String,
    pub timestamp: String,
}

/// Generated images and their JSON history file under one folder.
///
/// The history file is a plain JSON array of [`ImageHistoryEntry`]. It is
/// only ever appended to, and every append rewrites the whole file.
#[derive(Debug, Clone)]
pub struct ImageHistoryStore {
    folder: PathBuf,
}

impl ImageHistoryStore {
    pub fn new(folder: impl Into<PathBuf>) -> Self {
        Self {
            folder: folder.into(),
        }
    }

    /// `<folder>/image_history.json`
    pub fn history_path(&self) -> PathBuf {
        self.folder.join(defaults::HISTORY_FILE)
    }

    /// `<folder>/image_<YYYYMMDDHHMMSS>.png` for the given instant.
    pub fn image_path_at(&self, at: &DateTime<Local>) -> PathBuf {
        self.folder.join(format!(
            "{}{}.{}",
            images::FILE_PREFIX,
            at.format(images::FILE_TIMESTAMP_FORMAT),
            images::FILE_EXTENSION
        ))
    }

    /// ISO 8601 local timestamp with microseconds and no offset.
    pub fn timestamp(at: &DateTime<Local>) -> String {
        at.format("%Y-%m-%dT%H:%M:%S%.6f").to_string()
    }

    /// Create the folder if it is missing. Idempotent.
    pub fn ensure_folder(&self) -> Result<()> {
        fs::create_dir_all(&self.folder).map_err(|e| {
            GenChatError::persistence(format!(
                "Failed to create image folder {}: {}",
                self.folder.display(),
                e
            ))
        })
    }

    /// Read every entry in file order. A missing file yields no entries;
    /// a malformed one is an error.
    pub fn load(&self) -> Result<Vec<ImageHistoryEntry>> {
        let path = self.history_path();

        if !path.exists() {
            return Ok(Vec::new());
        }

        let contents = fs::read_to_string(&path).map_err(|e| {
            GenChatError::persistence(format!("Failed to read image history file: {}", e))
        })?;

        serde_json::from_str(&contents).map_err(|e| {
            GenChatError::persistence(format!(
                "Failed to parse image history file {}: {}",
                path.display(),
                e
            ))
        })
    }

    /// Append an entry for `image_path` stamped with the current time.
    pub fn append(&self, image_path: &str) -> Result<ImageHistoryEntry> {
        self.append_at(image_path, &Local::now())
    }

    pub fn append_at(&self, image_path: &str, at: &DateTime<Local>) -> Result<ImageHistoryEntry> {
        self.ensure_folder()?;

        let mut entries = self.load()?;
        let entry = ImageHistoryEntry {
            path: image_path.to_string(),
            timestamp: Self::timestamp(at),
        };
        entries.push(entry.clone());

        self.write_all(&entries)?;
        tracing::info!(path = %image_path, "recorded image in history");

        Ok(entry)
    }

    /// Write image bytes to the file name derived from `at`, replacing any
    /// image generated within the same second.
    pub fn save_image(&self, bytes: &[u8], at: &DateTime<Local>) -> Result<PathBuf> {
        self.ensure_folder()?;

        let path = self.image_path_at(at);
        fs::write(&path, bytes).map_err(|e| {
            GenChatError::persistence(format!(
                "Failed to write image {}: {}",
                path.display(),
                e
            ))
        })?;

        Ok(path)
    }

    fn write_all(&self, entries: &[ImageHistoryEntry]) -> Result<()> {
        let path = self.history_path();
        let contents = serde_json::to_string_pretty(entries).map_err(|e| {
            GenChatError::persistence(format!("Failed to serialize image history: {}", e))
        })?;

        let tmp_path = path.with_extension("json.tmp");
        fs::write(&tmp_path, contents).map_err(|e| {
            GenChatError::persistence(format!("Failed to write temporary history file: {}", e))
        })?;

        fs::rename(&tmp_path, &path).map_err(|e| {
            GenChatError::persistence(format!("Failed to rename history file: {}", e))
        })?;

        Ok(())
    }
}
