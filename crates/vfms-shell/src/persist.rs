use std::{fs, io::ErrorKind as IoErrorKind};
use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};
use parking_lot::Mutex;
use tracing::Level as LogLevel;

use vfms::{FilesystemSnapshot, VirtualFileSystem};


/// A JSON file holding a [`FilesystemSnapshot`].
///
/// Saves through one `SnapshotFile` are serialized, so sessions sharing it never interleave
/// their writes. Each save replaces the whole file; the last session to save wins.
#[derive(Debug)]
pub struct SnapshotFile {
    path:       PathBuf,
    write_lock: Mutex<()>,
}

impl SnapshotFile {
    #[must_use]
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            write_lock: Mutex::new(()),
        }
    }

    #[inline]
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the filesystem stored in the snapshot file.
    ///
    /// Returns `Ok(None)` if the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is not a valid snapshot, or describes an
    /// inconsistent filesystem.
    pub fn load(&self) -> Result<Option<VirtualFileSystem>> {
        let json = match fs::read_to_string(&self.path) {
            Ok(json)                                      => json,
            Err(err) if err.kind() == IoErrorKind::NotFound => return Ok(None),
            Err(err) => {
                return Err(err).with_context(|| {
                    format!("failed to read snapshot {}", self.path.display())
                });
            }
        };

        let snapshot: FilesystemSnapshot = serde_json::from_str(&json)
            .with_context(|| format!("malformed snapshot {}", self.path.display()))?;
        let vfs = VirtualFileSystem::from_snapshot(snapshot)
            .with_context(|| format!("inconsistent snapshot {}", self.path.display()))?;

        Ok(Some(vfs))
    }

    /// Load the stored filesystem, or start a fresh one if there is none or it cannot be loaded.
    #[must_use]
    pub fn load_or_default(&self) -> VirtualFileSystem {
        match self.load() {
            Ok(Some(vfs)) => vfs,
            Ok(None) => {
                tracing::event!(
                    LogLevel::DEBUG,
                    "no snapshot at {}; starting with an empty filesystem",
                    self.path.display(),
                );
                VirtualFileSystem::new()
            }
            Err(err) => {
                tracing::event!(
                    LogLevel::WARN,
                    "{err:#}; starting with an empty filesystem",
                );
                VirtualFileSystem::new()
            }
        }
    }

    /// Replace the snapshot file with the current state of `vfs`.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot cannot be serialized or the file cannot be written.
    pub fn save(&self, vfs: &VirtualFileSystem) -> Result<()> {
        let json = serde_json::to_string_pretty(&vfs.snapshot())
            .context("failed to serialize filesystem snapshot")?;

        let _guard = self.write_lock.lock();
        fs::write(&self.path, json)
            .with_context(|| format!("failed to write snapshot {}", self.path.display()))?;

        tracing::event!(LogLevel::DEBUG, "saved snapshot to {}", self.path.display());
        Ok(())
    }
}
