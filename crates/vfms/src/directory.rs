use std::sync::Arc;
use std::fmt::{Display, Formatter, Result as FmtResult};

use hashbrown::HashMap;
use parking_lot::Mutex;
use time::OffsetDateTime;

use crate::file::File;


/// Identifies a [`Directory`] within the arena of a `VirtualFileSystem`.
///
/// Identifiers are never reused, so an identifier of a removed directory cannot accidentally
/// refer to a newer directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DirId(pub(crate) u64);

impl Display for DirId {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "#{}", self.0)
    }
}

/// Anything storable inside a [`Directory`].
///
/// Files are owned by their directory's entry (through an `Arc`, so that a handle may outlive a
/// lookup); nested directories are referenced by their arena identifier.
#[derive(Debug, Clone)]
pub enum Entry {
    File(Arc<File>),
    Directory(DirId),
}

impl Entry {
    #[inline]
    #[must_use]
    pub const fn is_file(&self) -> bool {
        matches!(self, Self::File(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_directory(&self) -> bool {
        matches!(self, Self::Directory(_))
    }
}

#[derive(Debug)]
struct DirectoryInner {
    contents:    HashMap<String, Entry>,
    modified_at: OffsetDateTime,
}

/// A named container of [`Entry`]s, keyed by name.
///
/// A directory's name and parent never change after creation; only its contents do. The parent
/// link is a non-owning arena identifier, used to resolve `..`.
///
/// The mutating methods here perform no collision or existence checks beyond what is documented;
/// the `VirtualFileSystem` is responsible for checking before it mutates.
#[derive(Debug)]
pub struct Directory {
    id:         DirId,
    name:       String,
    parent:     Option<DirId>,
    created_at: OffsetDateTime,
    inner:      Mutex<DirectoryInner>,
}

impl Directory {
    #[must_use]
    pub(crate) fn new(id: DirId, name: &str, parent: Option<DirId>) -> Self {
        Self::restore(id, name.to_owned(), parent, OffsetDateTime::now_utc())
    }

    #[must_use]
    pub(crate) fn restore(
        id:         DirId,
        name:       String,
        parent:     Option<DirId>,
        created_at: OffsetDateTime,
    ) -> Self {
        Self {
            id,
            name,
            parent,
            created_at,
            inner: Mutex::new(DirectoryInner {
                contents:    HashMap::new(),
                modified_at: created_at,
            }),
        }
    }

    #[inline]
    #[must_use]
    pub const fn id(&self) -> DirId {
        self.id
    }

    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The containing directory, or `None` for the root directory.
    #[inline]
    #[must_use]
    pub const fn parent(&self) -> Option<DirId> {
        self.parent
    }

    #[inline]
    #[must_use]
    pub const fn created_at(&self) -> OffsetDateTime {
        self.created_at
    }

    #[must_use]
    pub fn modified_at(&self) -> OffsetDateTime {
        self.inner.lock().modified_at
    }

    pub(crate) fn set_modified_at(&self, modified_at: OffsetDateTime) {
        self.inner.lock().modified_at = modified_at;
    }

    /// Whether any entry, of either kind, has the given name.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.inner.lock().contents.contains_key(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.lock().contents.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.lock().contents.is_empty()
    }

    /// Clone out every entry along with its name. The order is unspecified.
    #[must_use]
    pub fn entries(&self) -> Vec<(String, Entry)> {
        self.inner
            .lock()
            .contents
            .iter()
            .map(|(name, entry)| (name.clone(), entry.clone()))
            .collect()
    }

    /// The identifiers of every directory directly inside this one.
    #[must_use]
    pub fn child_directories(&self) -> Vec<DirId> {
        self.inner
            .lock()
            .contents
            .values()
            .filter_map(|entry| match entry {
                Entry::Directory(id) => Some(*id),
                Entry::File(_)       => None,
            })
            .collect()
    }
}

impl Directory {
    /// Insert `file` under its own name, replacing any entry previously under that name.
    pub fn add_file(&self, file: Arc<File>) {
        self.insert(file.name().to_owned(), Entry::File(file));
    }

    /// Insert `directory` under its own name, replacing any entry previously under that name.
    ///
    /// `directory` must have been created with this directory as its parent.
    pub fn add_directory(&self, directory: &Directory) {
        debug_assert_eq!(
            directory.parent, Some(self.id),
            "a directory must be added to the parent it was created with",
        );
        self.insert(directory.name.clone(), Entry::Directory(directory.id));
    }

    /// Look up a file by name. Returns `None` if nothing has that name, or if a directory does.
    #[must_use]
    pub fn get_file(&self, name: &str) -> Option<Arc<File>> {
        match self.inner.lock().contents.get(name) {
            Some(Entry::File(file)) => Some(Arc::clone(file)),
            _                       => None,
        }
    }

    /// Look up a directory by name. Returns `None` if nothing has that name, or if a file does.
    #[must_use]
    pub fn get_directory(&self, name: &str) -> Option<DirId> {
        match self.inner.lock().contents.get(name) {
            Some(Entry::Directory(id)) => Some(*id),
            _                          => None,
        }
    }

    /// Remove the file with the given name, returning it.
    ///
    /// Callers are expected to have confirmed that a file with this name exists; if it does not
    /// (including if a directory has the name), nothing is removed and `None` is returned.
    pub fn remove_file(&self, name: &str) -> Option<Arc<File>> {
        match self.remove_if(name, Entry::is_file)? {
            Entry::File(file)     => Some(file),
            Entry::Directory(_)   => None,
        }
    }

    /// Remove the directory entry with the given name, returning its identifier.
    ///
    /// Callers are expected to have confirmed that a directory with this name exists; if it does
    /// not (including if a file has the name), nothing is removed and `None` is returned.
    pub fn remove_directory(&self, name: &str) -> Option<DirId> {
        match self.remove_if(name, Entry::is_directory)? {
            Entry::Directory(id)  => Some(id),
            Entry::File(_)        => None,
        }
    }
}

impl Directory {
    fn insert(&self, name: String, entry: Entry) {
        let mut inner = self.inner.lock();
        inner.contents.insert(name, entry);
        inner.modified_at = OffsetDateTime::now_utc();
    }

    fn remove_if(&self, name: &str, predicate: fn(&Entry) -> bool) -> Option<Entry> {
        let mut inner = self.inner.lock();

        if !inner.contents.get(name).is_some_and(predicate) {
            return None;
        }
        let removed = inner.contents.remove(name);
        inner.modified_at = OffsetDateTime::now_utc();
        removed
    }
}
