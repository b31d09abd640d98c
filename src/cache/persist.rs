//! Persistent Store Module
//!
//! Whole-file load and save of the key -> values mapping.

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::cache::Values;
use crate::error::Result;

/// Full persisted mapping, sorted so repeated saves of equal data are byte-identical.
pub type Snapshot = BTreeMap<String, Values>;

// == Persistent Store ==
/// Single-file durable store.
///
/// Every save replaces the whole file. The new blob is written to a sibling
/// temporary file and renamed over the target, so a reader sees either the
/// previous blob or the new one.
#[derive(Debug, Clone)]
pub struct PersistentStore {
    path: PathBuf,
}

impl PersistentStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    // == Load ==
    /// Loads the full mapping.
    ///
    /// Returns None when the file is missing, empty or unreadable. Failures
    /// are logged and otherwise treated like an absent store.
    pub fn load(&self) -> Option<Snapshot> {
        match self.try_load() {
            Ok(snapshot) => snapshot,
            Err(err) => {
                warn!(
                    "Failed to load persisted data from {}: {}",
                    self.path.display(),
                    err
                );
                None
            }
        }
    }

    /// Loads the full mapping, surfacing I/O and decoding errors.
    pub fn try_load(&self) -> Result<Option<Snapshot>> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        if bytes.is_empty() {
            return Ok(None);
        }
        Ok(Some(serde_json::from_slice(&bytes)?))
    }

    // == Save ==
    /// Replaces the file contents with `data`.
    ///
    /// Returns false if the write failed; the failure is logged and the
    /// previous blob, if any, is left untouched.
    pub fn save(&self, data: &Snapshot) -> bool {
        match self.try_save(data) {
            Ok(()) => {
                debug!("Persisted {} entries to {}", data.len(), self.path.display());
                true
            }
            Err(err) => {
                warn!(
                    "Failed to persist data to {}: {}",
                    self.path.display(),
                    err
                );
                false
            }
        }
    }

    /// Replaces the file contents with `data`, surfacing errors.
    pub fn try_save(&self, data: &Snapshot) -> Result<()> {
        let tmp_path = self.tmp_path();
        {
            let file = File::create(&tmp_path)?;
            let mut writer = BufWriter::new(file);
            serde_json::to_writer(&mut writer, data)?;
            writer.flush()?;
            writer.get_ref().sync_all()?;
        }
        if let Err(err) = fs::rename(&tmp_path, &self.path) {
            let _ = fs::remove_file(&tmp_path);
            return Err(err.into());
        }
        Ok(())
    }

    // == Prepare ==
    /// Creates the parent directory of the backing file if it is missing.
    pub fn ensure_parent_dir(&self) -> Result<()> {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => {
                fs::create_dir_all(parent)?;
                Ok(())
            }
            _ => Ok(()),
        }
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}
