//! An in-memory hierarchical file store.
//!
//! A [`VirtualFileSystem`] holds a tree of [`Directory`]s and [`File`]s, a current-directory
//! cursor used by relative operations, and a [`BlockMap`]: a small fixed grid of cells which
//! simulates the capacity of a storage medium. Writes are rejected once the grid cannot hold them.
//!
//! Files follow an open/closed state machine; see [`File`] and [`OpenMode`].
//!
//! A whole filesystem can be captured with [`VirtualFileSystem::snapshot`] and rebuilt with
//! [`VirtualFileSystem::from_snapshot`].

// Error type, and its categories
mod error;
// Grid sizes and path syntax
mod config_constants;

mod block_map;
mod directory;
mod file;
mod fs;
mod listing;
mod snapshot;


// ================================
//  Re-exports
// ================================

pub use self::{
    block_map::{Attribution, BlockMap},
    config_constants::{BLOCK_MAP_COLUMNS, BLOCK_MAP_ROWS, ROOT_NAME},
    directory::{DirId, Directory, Entry},
    error::{Error, ErrorKind, Result},
    file::{File, OpenMode},
    fs::VirtualFileSystem,
    listing::{ListingEntry, ListingKind, format_timestamp},
    snapshot::{BlockMapSnapshot, DirectorySnapshot, FileSnapshot, FilesystemSnapshot},
};
