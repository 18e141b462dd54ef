use std::sync::{Arc, atomic::{AtomicU64, Ordering}};

use hashbrown::{HashMap, HashSet};
use parking_lot::{Mutex, MutexGuard, RwLock};
use tracing::Level as LogLevel;

use crate::{
    block_map::BlockMap,
    config_constants::{PARENT_SEGMENT, PATH_SEPARATOR, ROOT_NAME, ROOT_PATH},
    directory::{DirId, Directory, Entry},
    error::{Error, Result},
    file::{File, OpenMode},
    listing::{ListingEntry, ListingKind},
};


/// An in-memory hierarchical file store, with a single [`BlockMap`] simulating the capacity of
/// the storage medium.
///
/// Relative operations (create, delete, lookups, and so on) apply to the *current directory*, a
/// cursor into the tree which starts at the root directory and is moved with
/// [`change_directory`].
///
/// ### Ownership
///
/// Directories live in an arena keyed by [`DirId`]. A directory's entries own its files and name
/// its child directories; a child's link to its parent is only an identifier, used to resolve
/// `..`. Removing a directory removes its whole subtree from the arena.
///
/// ### Locking
///
/// Every method takes `&self`, so a `VirtualFileSystem` may be shared between threads (for
/// instance, in an `Arc`). Locks are acquired in this order, and never in reverse:
///
/// 1. the tree lock, held by operations that change the shape of the tree (creating or deleting
///    files and directories) or that move entries between directories;
/// 2. directory locks, each held only within a single [`Directory`] method call;
/// 3. file locks, each held only within a single [`File`] method call.
///
/// The arena, the cursor, and the block map have their own locks, which are only held briefly
/// and never while acquiring another lock. No lock is retained after a method returns.
///
/// [`change_directory`]: VirtualFileSystem::change_directory
#[derive(Debug)]
pub struct VirtualFileSystem {
    tree_lock:   Mutex<()>,
    /// Invariants:
    ///     - Every directory reachable from `root` is present, and nothing else is.
    ///     - `root` is always present.
    directories: RwLock<HashMap<DirId, Arc<Directory>>>,
    next_dir_id: AtomicU64,
    root:        DirId,
    /// Should reference a live directory. If another thread sharing this filesystem deletes the
    /// directory out from under the cursor, the cursor falls back to the root directory.
    cursor:      Mutex<DirId>,
    block_map:   Mutex<BlockMap>,
}

impl VirtualFileSystem {
    /// Create a filesystem containing only an empty root directory, with the default block map
    /// dimensions.
    #[must_use]
    pub fn new() -> Self {
        Self::with_block_map(BlockMap::default())
    }

    /// Create a filesystem containing only an empty root directory, whose block map is a
    /// `rows` by `columns` grid.
    #[must_use]
    pub fn with_block_map_dimensions(rows: usize, columns: usize) -> Self {
        Self::with_block_map(BlockMap::new(rows, columns))
    }

    #[must_use]
    pub(crate) fn with_block_map(block_map: BlockMap) -> Self {
        Self::with_root(Directory::new(DirId(0), ROOT_NAME, None), block_map)
    }

    /// `root` must have `DirId(0)` and no parent.
    #[must_use]
    pub(crate) fn with_root(root: Directory, block_map: BlockMap) -> Self {
        let root_id = root.id();

        Self {
            tree_lock:   Mutex::new(()),
            directories: RwLock::new(HashMap::from([(root_id, Arc::new(root))])),
            next_dir_id: AtomicU64::new(root_id.0 + 1),
            root:        root_id,
            cursor:      Mutex::new(root_id),
            block_map:   Mutex::new(block_map),
        }
    }
}

impl VirtualFileSystem {
    #[inline]
    #[must_use]
    pub const fn root_id(&self) -> DirId {
        self.root
    }

    #[must_use]
    pub fn root(&self) -> Arc<Directory> {
        self.live_directory(self.root)
    }

    /// Get the directory with the given identifier, if it has not been removed.
    #[must_use]
    pub fn directory(&self, id: DirId) -> Option<Arc<Directory>> {
        self.directories.read().get(&id).map(Arc::clone)
    }

    /// The directory that relative operations apply to.
    #[must_use]
    pub fn current_directory(&self) -> Arc<Directory> {
        let current = *self.cursor.lock();

        if let Some(directory) = self.directory(current) {
            directory
        } else {
            tracing::event!(
                LogLevel::WARN,
                "current directory {current} was removed; returning to the root directory",
            );
            *self.cursor.lock() = self.root;
            self.root()
        }
    }

    #[must_use]
    pub fn current_directory_name(&self) -> String {
        self.current_directory().name().to_owned()
    }

    /// The absolute path of the current directory, such as `/` or `/docs/drafts`.
    #[must_use]
    pub fn current_path(&self) -> String {
        let components = self.path_components(self.current_directory().id());
        format!("{ROOT_PATH}{}", components.join(ROOT_PATH))
    }

    /// The names of the directories from just below the root directory down to `id`, inclusive.
    /// Empty for the root directory, or for a removed directory.
    #[must_use]
    pub fn path_components(&self, id: DirId) -> Vec<String> {
        let mut components = Vec::new();
        let mut next = Some(id);

        while let Some(directory) = next.and_then(|id| self.directory(id)) {
            if directory.id() == self.root {
                components.reverse();
                return components;
            }
            components.push(directory.name().to_owned());
            next = directory.parent();
        }

        // The chain was broken by a concurrent removal.
        Vec::new()
    }

    /// Look up a file in the current directory.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoSuchFile`] if the current directory has no file with that name.
    pub fn get_file(&self, name: &str) -> Result<Arc<File>> {
        self.current_directory()
            .get_file(name)
            .ok_or_else(|| Error::NoSuchFile(name.to_owned()))
    }

    /// Look up a directory in the current directory.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoSuchDirectory`] if the current directory has no directory with that
    /// name.
    pub fn get_directory(&self, name: &str) -> Result<Arc<Directory>> {
        self.current_directory()
            .get_directory(name)
            .and_then(|id| self.directory(id))
            .ok_or_else(|| Error::NoSuchDirectory(name.to_owned()))
    }
}

impl VirtualFileSystem {
    /// Create an empty file in the current directory.
    ///
    /// # Errors
    ///
    /// - Returns [`Error::InvalidName`] if the name is empty, is `..`, or contains a `/`, since no
    ///   path could reach such an entry.
    /// - Returns [`Error::AlreadyExists`] if a file or directory with that name already exists in
    ///   the current directory.
    pub fn create_file(&self, name: &str) -> Result<()> {
        check_name(name)?;
        let _tree = self.tree_lock.lock();
        let current = self.current_directory();

        if current.contains(name) {
            return Err(Error::AlreadyExists(name.to_owned()));
        }
        current.add_file(Arc::new(File::new(name)));

        tracing::event!(LogLevel::DEBUG, "created file `{name}` in `{}`", current.name());
        Ok(())
    }

    /// Create an empty directory in the current directory.
    ///
    /// # Errors
    ///
    /// - Returns [`Error::InvalidName`] if the name is empty, is `..`, or contains a `/`, since no
    ///   path could reach such an entry.
    /// - Returns [`Error::AlreadyExists`] if a file or directory with that name already exists in
    ///   the current directory.
    pub fn create_directory(&self, name: &str) -> Result<()> {
        check_name(name)?;
        let _tree = self.tree_lock.lock();
        let current = self.current_directory();

        if current.contains(name) {
            return Err(Error::AlreadyExists(name.to_owned()));
        }

        let directory = Directory::new(self.next_id(), name, Some(current.id()));
        current.add_directory(&directory);
        self.directories.write().insert(directory.id(), Arc::new(directory));

        tracing::event!(LogLevel::DEBUG, "created directory `{name}` in `{}`", current.name());
        Ok(())
    }

    /// Delete a file from the current directory.
    ///
    /// Any block map cells claimed for the file stay claimed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoSuchFile`] if the current directory has no file with that name.
    pub fn delete_file(&self, name: &str) -> Result<()> {
        let _tree = self.tree_lock.lock();
        let current = self.current_directory();

        current.remove_file(name).ok_or_else(|| Error::NoSuchFile(name.to_owned()))?;

        tracing::event!(LogLevel::DEBUG, "deleted file `{name}` from `{}`", current.name());
        Ok(())
    }

    /// Delete a directory, and everything inside it, from the current directory.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoSuchDirectory`] if the current directory has no directory with that
    /// name.
    pub fn delete_directory(&self, name: &str) -> Result<()> {
        let _tree = self.tree_lock.lock();
        let current = self.current_directory();

        let removed = current
            .remove_directory(name)
            .ok_or_else(|| Error::NoSuchDirectory(name.to_owned()))?;

        // Everything below `removed` is now unreachable; drop it from the arena.
        let mut doomed = HashSet::new();
        let mut pending = vec![removed];
        while let Some(id) = pending.pop() {
            if let Some(directory) = self.directory(id) {
                pending.extend(directory.child_directories());
            }
            doomed.insert(id);
        }

        let dropped = self.directories
            .write()
            .extract_if(|id, _| doomed.contains(id))
            .count();

        tracing::event!(
            LogLevel::DEBUG,
            "deleted directory `{name}` from `{}` ({dropped} directories dropped)",
            current.name(),
        );
        Ok(())
    }
}

impl VirtualFileSystem {
    /// Resolve `path` to a directory without moving the current directory.
    ///
    /// - `/` is the root directory.
    /// - A path starting with `/` is absolute, resolved from the root directory; any other path
    ///   is relative, resolved from the current directory.
    /// - Segments are processed left to right. `..` moves to the parent directory (the parent of
    ///   the root directory is the root directory), empty segments are ignored, and any other
    ///   segment (including `.`) moves into the child directory of that name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoSuchDirectory`], naming the first segment that did not match a child
    /// directory.
    pub fn resolve(&self, path: &str) -> Result<Arc<Directory>> {
        if path == ROOT_PATH {
            return Ok(self.root());
        }

        let (mut directory, relative) = match path.strip_prefix(PATH_SEPARATOR) {
            Some(relative) => (self.root(), relative),
            None           => (self.current_directory(), path),
        };

        for segment in relative.split(PATH_SEPARATOR) {
            directory = match segment {
                "" => continue,
                PARENT_SEGMENT => directory
                    .parent()
                    .and_then(|parent| self.directory(parent))
                    .unwrap_or(directory),
                name => directory
                    .get_directory(name)
                    .and_then(|child| self.directory(child))
                    .ok_or_else(|| Error::NoSuchDirectory(name.to_owned()))?,
            };
        }

        Ok(directory)
    }

    /// Move the current directory to the directory at `path`, returning it. See
    /// [`resolve`] for how paths are resolved.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoSuchDirectory`] if `path` does not resolve, in which case the current
    /// directory is unchanged.
    ///
    /// [`resolve`]: VirtualFileSystem::resolve
    pub fn change_directory(&self, path: &str) -> Result<Arc<Directory>> {
        let directory = self.resolve(path)?;
        *self.cursor.lock() = directory.id();
        Ok(directory)
    }

    /// Move a file from the current directory to the directory at `path`. The current directory
    /// is unchanged.
    ///
    /// # Errors
    ///
    /// - Returns [`Error::NoSuchFile`] if the current directory has no such file.
    /// - Returns [`Error::NoSuchDirectory`] if `path` does not resolve.
    /// - Returns [`Error::ExistsAtDestination`] if the destination already has an entry with the
    ///   file's name (unless the destination is the current directory itself).
    ///
    /// In every error case, the file stays where it was.
    pub fn move_file(&self, file_name: &str, path: &str) -> Result<()> {
        let _tree = self.tree_lock.lock();
        let source = self.current_directory();

        if source.get_file(file_name).is_none() {
            return Err(Error::NoSuchFile(file_name.to_owned()));
        }
        let destination = self.resolve(path)?;

        if destination.id() == source.id() {
            return Ok(());
        }
        if destination.contains(file_name) {
            return Err(Error::ExistsAtDestination {
                name: file_name.to_owned(),
                path: path.to_owned(),
            });
        }

        // The tree lock is held, so the file checked above is still present.
        if let Some(file) = source.remove_file(file_name) {
            destination.add_file(file);
        }

        tracing::event!(
            LogLevel::DEBUG,
            "moved file `{file_name}` from `{}` to `{}`",
            source.name(),
            destination.name(),
        );
        Ok(())
    }
}

impl VirtualFileSystem {
    /// The number of free cells in the block map.
    #[must_use]
    pub fn calc_free_memory(&self) -> usize {
        self.block_map.lock().free_count()
    }

    /// A copy of the block map, for display.
    #[must_use]
    pub fn block_map(&self) -> BlockMap {
        self.block_map.lock().clone()
    }

    /// Claim block map cells for the full content of `file`, attributed to the current directory
    /// and the file's name. Returns the number of cells claimed.
    ///
    /// Cells claimed by earlier calls are not released, so calling this after every write keeps
    /// accumulating cells for the same file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotReadable`] if `file` is open in a mode without read.
    pub fn update_mmap(&self, file: &File) -> Result<usize> {
        let content = file.read()?;
        Ok(self.record_content(file.name(), &content))
    }

    /// Claim block map cells for `content`, attributed to the current directory and `file_name`.
    fn record_content(&self, file_name: &str, content: &str) -> usize {
        let directory = self.current_directory_name();
        let claimed = self.block_map.lock().allocate_for_write(&directory, file_name, content);

        tracing::event!(
            LogLevel::TRACE,
            "claimed {claimed} block map cell(s) for `{file_name}` in `{directory}`",
        );
        claimed
    }

    /// Open a file in the current directory.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoSuchFile`] if there is no such file, and [`Error::AlreadyOpen`] if it
    /// is already open.
    pub fn open_file(&self, name: &str, mode: OpenMode) -> Result<()> {
        self.get_file(name)?.open(mode)
    }

    /// Close a file in the current directory.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoSuchFile`] if there is no such file, and [`Error::NotOpen`] if it is
    /// not open.
    pub fn close_file(&self, name: &str) -> Result<()> {
        self.get_file(name)?.close()
    }

    /// Write `data` to a file in the current directory: appended to the end if `offset` is
    /// `None`, or inserted at `offset` otherwise.
    ///
    /// Before anything else, the block map must have at least one free cell per character of
    /// `data`; otherwise the write is rejected in full.
    ///
    /// After a successful append, the file is closed, reopened for reading so that its content
    /// can be recorded in the block map as by [`update_mmap`], closed again, and reopened in its
    /// original mode. The append and that sequence happen atomically with respect to other
    /// threads, so once the append succeeds, the whole write succeeds. Offset writes do not touch
    /// the block map.
    ///
    /// # Errors
    ///
    /// - Returns [`Error::CapacityExceeded`] if the block map has too few free cells.
    /// - Returns [`Error::NoSuchFile`] if there is no such file.
    /// - Propagates errors from [`File::write`] and [`File::write_at`].
    ///
    /// [`update_mmap`]: VirtualFileSystem::update_mmap
    pub fn write_to_file(&self, name: &str, data: &str, offset: Option<usize>) -> Result<()> {
        let requested = data.chars().count();
        let free = self.calc_free_memory();
        if free < requested {
            tracing::event!(
                LogLevel::WARN,
                "rejected write of {requested} character(s) to `{name}`: {free} free cell(s)",
            );
            return Err(Error::CapacityExceeded { requested, free });
        }

        let file = self.get_file(name)?;

        let Some(offset) = offset else {
            let content = file.append_and_reread(data)?;
            self.record_content(file.name(), &content);
            return Ok(());
        };
        file.write_at(offset, data)
    }

    /// Read from a file in the current directory: its full content if `range` is `None`, or
    /// otherwise up to `length` characters starting at `offset`, given as `(offset, length)`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoSuchFile`] if there is no such file, and propagates errors from
    /// [`File::read`] and [`File::read_at`].
    pub fn read_from_file(&self, name: &str, range: Option<(usize, usize)>) -> Result<String> {
        let file = self.get_file(name)?;

        match range {
            None                   => file.read(),
            Some((offset, length)) => file.read_at(offset, length),
        }
    }

    /// Truncate a file in the current directory; see [`File::truncate`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoSuchFile`] if there is no such file, and propagates errors from
    /// [`File::truncate`].
    pub fn truncate_file(&self, name: &str, size: Option<usize>) -> Result<()> {
        self.get_file(name)?.truncate(size)
    }

    /// Describe every entry of the current directory, sorted by name.
    #[must_use]
    pub fn list_current_directory(&self) -> Vec<ListingEntry> {
        let mut listing = self.current_directory()
            .entries()
            .into_iter()
            .filter_map(|(name, entry)| match entry {
                Entry::File(file) => Some(ListingEntry {
                    name,
                    kind: ListingKind::File {
                        file_type: file.file_type().to_owned(),
                        size:      file.size(),
                        open_mode: file.open_mode(),
                    },
                    modified_at: file.modified_at(),
                }),
                Entry::Directory(id) => self.directory(id).map(|directory| ListingEntry {
                    name,
                    kind:        ListingKind::Directory,
                    modified_at: directory.modified_at(),
                }),
            })
            .collect::<Vec<_>>();

        listing.sort_unstable_by(|lhs, rhs| lhs.name.cmp(&rhs.name));
        listing
    }
}

impl VirtualFileSystem {
    /// Hold off every change to the shape of the tree until the guard is dropped.
    pub(crate) fn lock_tree(&self) -> MutexGuard<'_, ()> {
        self.tree_lock.lock()
    }

    pub(crate) fn next_id(&self) -> DirId {
        DirId(self.next_dir_id.fetch_add(1, Ordering::Relaxed))
    }

    pub(crate) fn insert_directory(&self, directory: Directory) -> Arc<Directory> {
        let directory = Arc::new(directory);
        self.directories.write().insert(directory.id(), Arc::clone(&directory));
        directory
    }

    pub(crate) fn set_cursor(&self, id: DirId) {
        *self.cursor.lock() = id;
    }

    /// Get a directory which is known to be in the arena, such as the root directory.
    #[expect(
        clippy::indexing_slicing,
        reason = "the root directory is never removed from the arena",
    )]
    fn live_directory(&self, id: DirId) -> Arc<Directory> {
        Arc::clone(&self.directories.read()[&id])
    }
}

/// Entry names must be usable as a path segment: nonempty, not `..`, and without a `/`.
///
/// # Errors
///
/// Returns [`Error::InvalidName`] otherwise.
pub(crate) fn check_name(name: &str) -> Result<()> {
    if name.is_empty() || name == PARENT_SEGMENT || name.contains(PATH_SEPARATOR) {
        Err(Error::InvalidName(name.to_owned()))
    } else {
        Ok(())
    }
}

impl Default for VirtualFileSystem {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}


#[cfg(test)]
mod tests {
    use super::*;


    fn write(vfs: &VirtualFileSystem, name: &str, data: &str) {
        vfs.open_file(name, OpenMode::WRITE).unwrap();
        vfs.write_to_file(name, data, None).unwrap();
        vfs.close_file(name).unwrap();
    }

    #[test]
    fn create_then_get() {
        let vfs = VirtualFileSystem::new();
        vfs.create_file("a.txt").unwrap();
        vfs.create_directory("docs").unwrap();

        assert_eq!(vfs.get_file("a.txt").unwrap().name(), "a.txt");
        assert_eq!(vfs.get_directory("docs").unwrap().name(), "docs");
    }

    #[test]
    fn create_collision_keeps_original() {
        let vfs = VirtualFileSystem::new();
        vfs.create_file("a").unwrap();
        write(&vfs, "a", "keep");

        assert_eq!(vfs.create_file("a"), Err(Error::AlreadyExists("a".to_owned())));
        assert_eq!(vfs.create_directory("a"), Err(Error::AlreadyExists("a".to_owned())));
        assert_eq!(vfs.get_file("a").unwrap().content(), "keep");

        vfs.create_directory("d").unwrap();
        assert_eq!(vfs.create_file("d"), Err(Error::AlreadyExists("d".to_owned())));
        assert!(vfs.get_directory("d").is_ok());
    }

    #[test]
    fn delete_missing() {
        let vfs = VirtualFileSystem::new();
        vfs.create_directory("d").unwrap();
        vfs.create_file("f").unwrap();

        assert_eq!(vfs.delete_file("d"), Err(Error::NoSuchFile("d".to_owned())));
        assert_eq!(vfs.delete_directory("f"), Err(Error::NoSuchDirectory("f".to_owned())));
        vfs.delete_file("f").unwrap();
        assert!(vfs.get_file("f").is_err());
    }

    #[test]
    fn delete_directory_drops_subtree() {
        let vfs = VirtualFileSystem::new();
        vfs.create_directory("a").unwrap();
        vfs.change_directory("a").unwrap();
        vfs.create_directory("b").unwrap();
        vfs.change_directory("b").unwrap();
        vfs.create_directory("c").unwrap();
        let deep = vfs.get_directory("c").unwrap().id();
        vfs.change_directory("/").unwrap();

        vfs.delete_directory("a").unwrap();
        assert!(vfs.directory(deep).is_none());
        assert!(vfs.root().is_empty());
        assert_eq!(vfs.directories.read().len(), 1);
    }

    #[test]
    fn change_directory_paths() {
        let vfs = VirtualFileSystem::new();
        vfs.create_directory("a").unwrap();
        vfs.change_directory("a").unwrap();
        vfs.create_directory("b").unwrap();

        assert_eq!(vfs.change_directory("/a/b").unwrap().name(), "b");
        assert_eq!(vfs.current_path(), "/a/b");
        assert_eq!(vfs.change_directory("..").unwrap().name(), "a");
        assert_eq!(vfs.change_directory("../a/b/../b").unwrap().name(), "b");
        assert_eq!(vfs.change_directory("/").unwrap().name(), ROOT_NAME);
        assert_eq!(vfs.current_path(), "/");
        assert_eq!(vfs.change_directory("a/b/").unwrap().name(), "b");
    }

    #[test]
    fn absolute_equals_stepwise() {
        let vfs = VirtualFileSystem::new();
        vfs.create_directory("a").unwrap();
        vfs.change_directory("a").unwrap();
        vfs.create_directory("b").unwrap();

        let absolute = vfs.change_directory("/a/b").unwrap().id();
        vfs.change_directory("/").unwrap();
        vfs.change_directory("a").unwrap();
        let stepwise = vfs.change_directory("b").unwrap().id();
        assert_eq!(absolute, stepwise);
    }

    #[test]
    fn failed_change_directory_keeps_cursor() {
        let vfs = VirtualFileSystem::new();
        vfs.create_directory("a").unwrap();
        vfs.change_directory("a").unwrap();
        let before = vfs.current_directory().id();

        assert_eq!(
            vfs.change_directory("/a/missing/deeper").map(|dir| dir.id()),
            Err(Error::NoSuchDirectory("missing".to_owned())),
        );
        assert_eq!(vfs.current_directory().id(), before);
    }

    #[test]
    fn parent_of_root_is_root() {
        let vfs = VirtualFileSystem::new();
        assert_eq!(vfs.change_directory("..").unwrap().id(), vfs.root_id());
    }

    #[test]
    fn dot_is_an_ordinary_name() {
        let vfs = VirtualFileSystem::new();
        vfs.create_directory(".").unwrap();

        assert_eq!(vfs.change_directory(".").unwrap().name(), ".");
        assert_eq!(vfs.current_path(), "/.");
        assert_eq!(vfs.change_directory("/./").unwrap().name(), ".");
        assert_eq!(vfs.change_directory("/").unwrap().id(), vfs.root_id());

        vfs.create_directory("a").unwrap();
        assert_eq!(
            vfs.change_directory("a/.").map(|dir| dir.id()),
            Err(Error::NoSuchDirectory(".".to_owned())),
        );
    }

    #[test]
    fn unreachable_names_are_rejected() {
        let vfs = VirtualFileSystem::new();

        for name in ["", "..", "a/b", "/"] {
            assert_eq!(vfs.create_directory(name), Err(Error::InvalidName(name.to_owned())));
            assert_eq!(vfs.create_file(name), Err(Error::InvalidName(name.to_owned())));
        }
        assert!(vfs.root().is_empty());
    }

    #[test]
    fn move_file_keeps_cursor() {
        let vfs = VirtualFileSystem::new();
        vfs.create_directory("a").unwrap();
        vfs.create_file("f").unwrap();

        vfs.move_file("f", "/a").unwrap();
        assert_eq!(vfs.current_directory().id(), vfs.root_id());
        assert!(vfs.get_file("f").is_err());
        assert!(vfs.get_directory("a").unwrap().get_file("f").is_some());
    }

    #[test]
    fn failed_move_leaves_file() {
        let vfs = VirtualFileSystem::new();
        vfs.create_file("f").unwrap();

        assert_eq!(vfs.move_file("f", "nowhere"), Err(Error::NoSuchDirectory("nowhere".to_owned())));
        assert_eq!(vfs.move_file("g", "/"), Err(Error::NoSuchFile("g".to_owned())));
        assert!(vfs.get_file("f").is_ok());

        vfs.create_directory("d").unwrap();
        vfs.change_directory("d").unwrap();
        vfs.create_file("f").unwrap();
        assert!(matches!(
            vfs.move_file("f", ".."),
            Err(Error::ExistsAtDestination { .. }),
        ));
        assert!(vfs.get_file("f").is_ok());
    }

    #[test]
    fn capacity_check_precedes_write() {
        let vfs = VirtualFileSystem::with_block_map_dimensions(1, 4);
        vfs.create_file("f").unwrap();
        vfs.open_file("f", OpenMode::WRITE).unwrap();

        assert_eq!(
            vfs.write_to_file("f", "hello", None),
            Err(Error::CapacityExceeded { requested: 5, free: 4 }),
        );
        assert_eq!(vfs.get_file("f").unwrap().size(), 0);
        assert_eq!(vfs.calc_free_memory(), 4);
    }

    #[test]
    fn append_records_content_and_restores_mode() {
        let vfs = VirtualFileSystem::new();
        vfs.create_file("f").unwrap();
        vfs.open_file("f", OpenMode::APPEND).unwrap();

        vfs.write_to_file("f", "abc", None).unwrap();
        assert_eq!(vfs.calc_free_memory(), 64 - 3);
        assert_eq!(vfs.get_file("f").unwrap().open_mode(), Some(OpenMode::APPEND));

        // The whole content is recorded again on every append.
        vfs.write_to_file("f", "de", None).unwrap();
        assert_eq!(vfs.calc_free_memory(), 64 - 3 - 5);
    }

    #[test]
    fn offset_write_skips_block_map() {
        let vfs = VirtualFileSystem::new();
        vfs.create_file("f").unwrap();
        vfs.open_file("f", OpenMode::WRITE).unwrap();

        vfs.write_to_file("f", "ac", Some(0)).unwrap();
        vfs.write_to_file("f", "b", Some(1)).unwrap();
        assert_eq!(vfs.calc_free_memory(), 64);
        vfs.close_file("f").unwrap();
        assert_eq!(vfs.read_from_file("f", None).unwrap(), "abc");
    }

    #[test]
    fn failed_write_leaves_state() {
        let vfs = VirtualFileSystem::new();
        vfs.create_file("f").unwrap();

        assert_eq!(vfs.write_to_file("f", "x", None), Err(Error::NotWritable("f".to_owned())));
        assert!(!vfs.get_file("f").unwrap().is_open());
        assert_eq!(vfs.calc_free_memory(), 64);
    }

    #[test]
    fn attributions_name_current_directory() {
        let vfs = VirtualFileSystem::new();
        vfs.create_directory("docs").unwrap();
        vfs.change_directory("docs").unwrap();
        vfs.create_file("n.txt").unwrap();
        write(&vfs, "n.txt", "hi");

        let map = vfs.block_map();
        let first = map.cells()[0].as_ref().unwrap();
        assert_eq!(first.to_string(), "docs, n.txt, block 1");
        assert_eq!(first.character, 'h');
    }

    #[test]
    fn listing_is_sorted() {
        let vfs = VirtualFileSystem::new();
        vfs.create_file("b.txt").unwrap();
        vfs.create_directory("a").unwrap();
        write(&vfs, "b.txt", "12345");

        let listing = vfs.list_current_directory();
        assert_eq!(listing.len(), 2);
        assert_eq!(listing[0].name, "a");
        assert_eq!(listing[0].kind, ListingKind::Directory);
        assert_eq!(listing[1].kind, ListingKind::File {
            file_type: "txt".to_owned(),
            size:      5,
            open_mode: None,
        });
    }

    #[test]
    fn removed_cursor_falls_back_to_root() {
        let vfs = VirtualFileSystem::new();
        vfs.create_directory("a").unwrap();
        let a = vfs.get_directory("a").unwrap().id();

        // Simulate another session deleting the directory this session is in.
        vfs.set_cursor(vfs.root_id());
        vfs.delete_directory("a").unwrap();
        vfs.set_cursor(a);

        assert_eq!(vfs.current_directory().id(), vfs.root_id());
    }
}
