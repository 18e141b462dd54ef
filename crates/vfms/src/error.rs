use thiserror::Error as ThisError;


/// The broad category of an [`Error`].
///
/// Every expected failure of a filesystem operation falls into one of these categories; the
/// finer-grained [`Error`] variants say precisely what went wrong.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ErrorKind {
    /// A file, directory, or path segment was absent where it was required.
    NotFound,
    /// A create operation collided with an existing entry in the current directory.
    AlreadyExists,
    /// A name could not be used as a path segment.
    InvalidName,
    /// The operation is incompatible with a file's current open/closed state.
    InvalidState,
    /// An offset or size was outside `0..=len`.
    InvalidRange,
    /// A write requested more cells than the block map has free.
    CapacityExceeded,
    /// An open mode token could not be parsed.
    InvalidMode,
    /// A snapshot could not be restored into a filesystem.
    Snapshot,
}

/// An expected failure of a filesystem operation.
///
/// The `Display` output of each variant is a human-readable status line; callers such as a
/// command front end may show it to a user verbatim.
#[derive(ThisError, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("No such file: {0}")]
    NoSuchFile(String),
    #[error("No such directory: {0}")]
    NoSuchDirectory(String),
    #[error("{0} already exists in current directory")]
    AlreadyExists(String),
    /// The name is empty, is `..`, or contains a `/`, so no path could reach the entry.
    #[error("Invalid name: {0:?}")]
    InvalidName(String),
    /// A move found an entry with the moved file's name already in the destination.
    #[error("{name} already exists in {path}")]
    ExistsAtDestination {
        name: String,
        path: String,
    },

    #[error("File {0} is already open")]
    AlreadyOpen(String),
    #[error("File {0} is not open")]
    NotOpen(String),
    #[error("File {0} not open in write or append mode")]
    NotWritable(String),
    #[error("File {0} not open in read mode")]
    NotReadable(String),
    /// Truncation requires the file to be closed.
    #[error("File {0} is open")]
    FileIsOpen(String),

    #[error("Invalid offset")]
    InvalidOffset {
        offset: usize,
        len:    usize,
    },
    #[error("Invalid size")]
    InvalidSize {
        size: usize,
        len:  usize,
    },

    #[error("Cannot write to file as memory is full")]
    CapacityExceeded {
        requested: usize,
        free:      usize,
    },

    #[error("invalid open mode `{0}`: expected a combination of `r`, `w`, and `a`")]
    InvalidMode(String),

    #[error("could not restore snapshot: {0}")]
    Snapshot(String),
}

impl Error {
    /// The broad category of this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::NoSuchFile(_) | Self::NoSuchDirectory(_)  => ErrorKind::NotFound,
            Self::AlreadyExists(_)
                | Self::ExistsAtDestination { .. }          => ErrorKind::AlreadyExists,
            Self::InvalidName(_)                            => ErrorKind::InvalidName,
            Self::AlreadyOpen(_)
                | Self::NotOpen(_)
                | Self::NotWritable(_)
                | Self::NotReadable(_)
                | Self::FileIsOpen(_)                       => ErrorKind::InvalidState,
            Self::InvalidOffset { .. }
                | Self::InvalidSize { .. }                  => ErrorKind::InvalidRange,
            Self::CapacityExceeded { .. }                   => ErrorKind::CapacityExceeded,
            Self::InvalidMode(_)                            => ErrorKind::InvalidMode,
            Self::Snapshot(_)                               => ErrorKind::Snapshot,
        }
    }

    #[inline]
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }
}

pub type Result<T> = std::result::Result<T, Error>;
