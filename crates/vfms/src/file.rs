use std::{iter, str::FromStr};
use std::fmt::{Display, Formatter, Result as FmtResult};

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::error::{Error, Result};


/// The access mode a [`File`] is opened in.
///
/// A mode is any nonempty combination of read (`r`), write (`w`), and append (`a`). Writing is
/// permitted in either write or append mode; in both cases, plain writes append to the end of the
/// file's content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct OpenMode {
    read:   bool,
    write:  bool,
    append: bool,
}

impl OpenMode {
    pub const READ: Self = Self { read: true, write: false, append: false };
    pub const WRITE: Self = Self { read: false, write: true, append: false };
    pub const APPEND: Self = Self { read: false, write: false, append: true };

    #[inline]
    #[must_use]
    pub const fn is_readable(self) -> bool {
        self.read
    }

    #[inline]
    #[must_use]
    pub const fn is_writable(self) -> bool {
        self.write || self.append
    }
}

impl FromStr for OpenMode {
    type Err = Error;

    fn from_str(token: &str) -> Result<Self> {
        let mut mode = Self { read: false, write: false, append: false };

        for letter in token.chars() {
            match letter {
                'r' => mode.read = true,
                'w' => mode.write = true,
                'a' => mode.append = true,
                _   => return Err(Error::InvalidMode(token.to_owned())),
            }
        }

        if mode.read || mode.is_writable() {
            Ok(mode)
        } else {
            Err(Error::InvalidMode(token.to_owned()))
        }
    }
}

impl TryFrom<String> for OpenMode {
    type Error = Error;

    #[inline]
    fn try_from(token: String) -> Result<Self> {
        token.parse()
    }
}

impl From<OpenMode> for String {
    #[inline]
    fn from(mode: OpenMode) -> Self {
        mode.to_string()
    }
}

impl Display for OpenMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        for (enabled, letter) in [(self.read, "r"), (self.write, "w"), (self.append, "a")] {
            if enabled {
                f.write_str(letter)?;
            }
        }
        Ok(())
    }
}

/// The mutable part of a [`File`], guarded by the file's lock.
#[derive(Debug, Clone)]
struct FileState {
    content:     String,
    /// `None` means the file is closed.
    open_mode:   Option<OpenMode>,
    modified_at: OffsetDateTime,
}

/// A named holder of text content, guarded by an open-mode state machine.
///
/// The file is either closed, or open in some [`OpenMode`]. Transitions happen only through
/// [`open`] and [`close`]; reads and writes are gated by the current state but never change it.
///
/// Offsets, lengths, and sizes are measured in characters.
///
/// ### Locking
///
/// Each `File` owns a reader-writer lock over its content and open mode. Mutations (including
/// opening and closing) take the lock exclusively; reads share it. No method holds the lock
/// after returning, and no method acquires any other lock while holding it.
///
/// [`open`]: File::open
/// [`close`]: File::close
#[derive(Debug)]
pub struct File {
    name:       String,
    created_at: OffsetDateTime,
    state:      RwLock<FileState>,
}

impl File {
    /// Create a new, empty, closed file.
    #[must_use]
    pub fn new(name: &str) -> Self {
        let now = OffsetDateTime::now_utc();

        Self {
            name:       name.to_owned(),
            created_at: now,
            state:      RwLock::new(FileState {
                content:     String::new(),
                open_mode:   None,
                modified_at: now,
            }),
        }
    }

    /// Reconstruct a file with exactly the given state, as recorded in a snapshot.
    #[must_use]
    pub(crate) fn restore(
        name:        String,
        content:     String,
        open_mode:   Option<OpenMode>,
        created_at:  OffsetDateTime,
        modified_at: OffsetDateTime,
    ) -> Self {
        Self {
            name,
            created_at,
            state: RwLock::new(FileState { content, open_mode, modified_at }),
        }
    }

    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The file's type: the part of its name after the first `.`, or an empty string if the name
    /// has no `.`.
    #[must_use]
    pub fn file_type(&self) -> &str {
        self.name
            .split_once('.')
            .map(|(_, file_type)| file_type)
            .unwrap_or("")
    }

    #[inline]
    #[must_use]
    pub const fn created_at(&self) -> OffsetDateTime {
        self.created_at
    }

    #[must_use]
    pub fn modified_at(&self) -> OffsetDateTime {
        self.state.read().modified_at
    }

    /// The current open mode, or `None` if the file is closed.
    #[must_use]
    pub fn open_mode(&self) -> Option<OpenMode> {
        self.state.read().open_mode
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.open_mode().is_some()
    }

    /// The length of the file's content, in characters.
    #[must_use]
    pub fn size(&self) -> usize {
        self.state.read().content.chars().count()
    }

    /// Copy out the full content of the file, regardless of its open mode.
    ///
    /// Unlike [`File::read`], this is not gated by the file's state; it is meant for
    /// snapshotting and display.
    #[must_use]
    pub fn content(&self) -> String {
        self.state.read().content.clone()
    }
}

impl File {
    /// Open the file in the given mode.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AlreadyOpen`] if the file is already open, in which case its mode
    /// is unchanged.
    pub fn open(&self, mode: OpenMode) -> Result<()> {
        let mut state = self.state.write();

        if state.open_mode.is_some() {
            return Err(Error::AlreadyOpen(self.name.clone()));
        }
        state.open_mode = Some(mode);
        Ok(())
    }

    /// Close the file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotOpen`] if the file is not open.
    pub fn close(&self) -> Result<()> {
        let mut state = self.state.write();

        if state.open_mode.take().is_none() {
            return Err(Error::NotOpen(self.name.clone()));
        }
        Ok(())
    }

    /// Append `data` to the end of the file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotWritable`] unless the file is open in write or append mode.
    pub fn write(&self, data: &str) -> Result<()> {
        let mut state = self.state.write();
        self.check_writable(&state)?;

        state.content.push_str(data);
        state.modified_at = OffsetDateTime::now_utc();
        Ok(())
    }

    /// Append `data`, then cycle the file through the reopen sequence used to record its
    /// content: close, open for reading, read, close, and reopen in the mode it was in. Returns
    /// the content that was read.
    ///
    /// The whole sequence happens under one exclusive lock, so no other thread can observe or
    /// interrupt the intermediate states, and the sequence cannot fail once the append succeeds.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotWritable`] unless the file is open in write or append mode, in which
    /// case nothing changes.
    pub(crate) fn append_and_reread(&self, data: &str) -> Result<String> {
        let mut state = self.state.write();
        self.check_writable(&state)?;

        state.content.push_str(data);
        state.modified_at = OffsetDateTime::now_utc();

        // The intermediate closed and read-only states are unobservable while the lock is held,
        // and the sequence ends in the mode it started in, so only the read has an effect.
        Ok(state.content.clone())
    }

    /// Insert `data` at character offset `offset`, shifting any later content to the right.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotWritable`] unless the file is open in write or append mode, and
    /// [`Error::InvalidOffset`] if `offset` exceeds the file's length.
    pub fn write_at(&self, offset: usize, data: &str) -> Result<()> {
        let mut state = self.state.write();
        self.check_writable(&state)?;

        let idx = byte_index(&state.content, offset)?;
        state.content.insert_str(idx, data);
        state.modified_at = OffsetDateTime::now_utc();
        Ok(())
    }

    /// Read the full content of the file.
    ///
    /// Reading is permitted while the file is closed, or while it is open in a mode that
    /// includes read.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotReadable`] if the file is open in a mode without read.
    pub fn read(&self) -> Result<String> {
        let state = self.state.read();
        self.check_readable(&state)?;

        Ok(state.content.clone())
    }

    /// Read up to `length` characters, starting at character offset `offset`. Fewer characters
    /// are returned if the end of the file is reached first.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotReadable`] if the file is open in a mode without read, and
    /// [`Error::InvalidOffset`] if `offset` exceeds the file's length.
    pub fn read_at(&self, offset: usize, length: usize) -> Result<String> {
        let state = self.state.read();
        self.check_readable(&state)?;

        let start = byte_index(&state.content, offset)?;
        #[expect(
            clippy::string_slice,
            reason = "`start` comes from `char_indices`, so it is on a char boundary",
        )]
        let read = state.content[start..].chars().take(length).collect();
        Ok(read)
    }

    /// Truncate the file to its first `size` characters, or to nothing if `size` is `None`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::FileIsOpen`] if the file is open (it must be closed first), and
    /// [`Error::InvalidSize`] if `size` exceeds the file's length.
    pub fn truncate(&self, size: Option<usize>) -> Result<()> {
        let mut state = self.state.write();

        if state.open_mode.is_some() {
            return Err(Error::FileIsOpen(self.name.clone()));
        }

        let idx = match size {
            None       => 0,
            Some(size) => byte_index(&state.content, size).map_err(|_| Error::InvalidSize {
                size,
                len: state.content.chars().count(),
            })?,
        };
        state.content.truncate(idx);
        state.modified_at = OffsetDateTime::now_utc();
        Ok(())
    }
}

impl File {
    fn check_writable(&self, state: &FileState) -> Result<()> {
        if state.open_mode.is_some_and(OpenMode::is_writable) {
            Ok(())
        } else {
            Err(Error::NotWritable(self.name.clone()))
        }
    }

    fn check_readable(&self, state: &FileState) -> Result<()> {
        match state.open_mode {
            Some(mode) if !mode.is_readable() => Err(Error::NotReadable(self.name.clone())),
            _                                 => Ok(()),
        }
    }
}

/// Convert a character offset into a byte index of `content`. An offset equal to the number of
/// characters maps to `content.len()`.
///
/// # Errors
///
/// Returns [`Error::InvalidOffset`] if `offset` exceeds the number of characters in `content`.
fn byte_index(content: &str, offset: usize) -> Result<usize> {
    content
        .char_indices()
        .map(|(idx, _)| idx)
        .chain(iter::once(content.len()))
        .nth(offset)
        .ok_or_else(|| Error::InvalidOffset {
            offset,
            len: content.chars().count(),
        })
}
