//! Plain-data images of a [`VirtualFileSystem`], for persisting a filesystem between runs.
//!
//! The snapshot types implement `serde`'s traits, so any `serde` format can store them;
//! timestamps are written as RFC 3339 strings.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tracing::Level as LogLevel;

use crate::{
    block_map::{Attribution, BlockMap},
    config_constants::ROOT_NAME,
    directory::{DirId, Directory, Entry},
    error::{Error, Result},
    file::{File, OpenMode},
    fs::{VirtualFileSystem, check_name},
};


#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilesystemSnapshot {
    pub root:         DirectorySnapshot,
    /// The names of the directories from just below the root down to the current directory.
    pub current_path: Vec<String>,
    pub block_map:    BlockMapSnapshot,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectorySnapshot {
    pub name:        String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at:  OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub modified_at: OffsetDateTime,
    pub files:       Vec<FileSnapshot>,
    pub directories: Vec<DirectorySnapshot>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileSnapshot {
    pub name:        String,
    pub content:     String,
    /// `None` if the file was closed.
    pub open_mode:   Option<OpenMode>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at:  OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub modified_at: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockMapSnapshot {
    pub rows:    usize,
    pub columns: usize,
    /// Row-major.
    pub cells:   Vec<Option<Attribution>>,
}

impl From<&BlockMap> for BlockMapSnapshot {
    fn from(block_map: &BlockMap) -> Self {
        Self {
            rows:    block_map.rows(),
            columns: block_map.columns(),
            cells:   block_map.cells().to_vec(),
        }
    }
}

impl TryFrom<BlockMapSnapshot> for BlockMap {
    type Error = Error;

    fn try_from(snapshot: BlockMapSnapshot) -> Result<Self> {
        let BlockMapSnapshot { rows, columns, cells } = snapshot;
        let len = cells.len();

        Self::from_cells(rows, columns, cells).ok_or_else(|| Error::Snapshot(format!(
            "a {rows}x{columns} block map cannot have {len} cells",
        )))
    }
}

impl VirtualFileSystem {
    /// Capture the entire state of the filesystem: the tree, every file's content and open mode,
    /// the current directory, and the block map.
    ///
    /// Changes to the shape of the tree are held off while the snapshot is taken, but a write
    /// racing with the snapshot may or may not be included.
    #[must_use]
    pub fn snapshot(&self) -> FilesystemSnapshot {
        let _tree = self.lock_tree();

        FilesystemSnapshot {
            root:         self.snapshot_directory(&self.root()),
            current_path: self.path_components(self.current_directory().id()),
            block_map:    BlockMapSnapshot::from(&self.block_map()),
        }
    }

    fn snapshot_directory(&self, directory: &Directory) -> DirectorySnapshot {
        let mut entries = directory.entries();
        entries.sort_unstable_by(|(lhs, _), (rhs, _)| lhs.cmp(rhs));

        let mut files = Vec::new();
        let mut directories = Vec::new();

        for (_, entry) in entries {
            match entry {
                Entry::File(file) => files.push(FileSnapshot {
                    name:        file.name().to_owned(),
                    content:     file.content(),
                    open_mode:   file.open_mode(),
                    created_at:  file.created_at(),
                    modified_at: file.modified_at(),
                }),
                Entry::Directory(id) => {
                    if let Some(child) = self.directory(id) {
                        directories.push(self.snapshot_directory(&child));
                    }
                }
            }
        }

        DirectorySnapshot {
            name:        directory.name().to_owned(),
            created_at:  directory.created_at(),
            modified_at: directory.modified_at(),
            files,
            directories,
        }
    }

    /// Rebuild a filesystem from a snapshot taken by [`snapshot`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::Snapshot`] if the block map's cells do not fill its grid exactly, if an
    /// entry's name is empty, `..`, or contains a `/`, if two entries of a directory share a
    /// name, or if the current path does not name a directory.
    ///
    /// [`snapshot`]: VirtualFileSystem::snapshot
    pub fn from_snapshot(snapshot: FilesystemSnapshot) -> Result<Self> {
        let FilesystemSnapshot { root, current_path, block_map } = snapshot;

        let root_directory = Directory::restore(
            DirId(0),
            ROOT_NAME.to_owned(),
            None,
            root.created_at,
        );
        let vfs = Self::with_root(root_directory, BlockMap::try_from(block_map)?);

        let root_id = vfs.root_id();
        vfs.restore_contents(&vfs.root(), root)?;

        let mut cursor = root_id;
        for name in &current_path {
            cursor = vfs
                .directory(cursor)
                .and_then(|directory| directory.get_directory(name))
                .ok_or_else(|| Error::Snapshot(format!(
                    "current path /{} does not name a directory",
                    current_path.join("/"),
                )))?;
        }
        vfs.set_cursor(cursor);

        tracing::event!(
            LogLevel::DEBUG,
            "restored filesystem snapshot with current path /{}",
            current_path.join("/"),
        );
        Ok(vfs)
    }

    fn restore_contents(&self, directory: &Arc<Directory>, snapshot: DirectorySnapshot) -> Result<()> {
        let DirectorySnapshot { modified_at, files, directories, .. } = snapshot;

        for file in files {
            check_name(&file.name).map_err(|err| Error::Snapshot(err.to_string()))?;
            if directory.contains(&file.name) {
                return Err(duplicate_entry(directory, &file.name));
            }
            directory.add_file(Arc::new(File::restore(
                file.name,
                file.content,
                file.open_mode,
                file.created_at,
                file.modified_at,
            )));
        }

        for child in directories {
            check_name(&child.name).map_err(|err| Error::Snapshot(err.to_string()))?;
            if directory.contains(&child.name) {
                return Err(duplicate_entry(directory, &child.name));
            }

            let restored = Directory::restore(
                self.next_id(),
                child.name.clone(),
                Some(directory.id()),
                child.created_at,
            );
            directory.add_directory(&restored);
            let restored = self.insert_directory(restored);
            self.restore_contents(&restored, child)?;
        }

        // Adding entries touched the modification time.
        directory.set_modified_at(modified_at);
        Ok(())
    }
}

fn duplicate_entry(directory: &Directory, name: &str) -> Error {
    Error::Snapshot(format!("`{}` has more than one entry named `{name}`", directory.name()))
}
