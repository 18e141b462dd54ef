use time::{OffsetDateTime, macros::format_description};

use crate::file::OpenMode;


/// One row of a directory listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingEntry {
    pub name:        String,
    pub kind:        ListingKind,
    pub modified_at: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListingKind {
    File {
        file_type: String,
        /// In characters.
        size:      usize,
        open_mode: Option<OpenMode>,
    },
    Directory,
}

impl ListingEntry {
    /// The modification time, truncated to whole seconds: `YYYY-MM-DD HH:MM:SS`.
    #[must_use]
    pub fn modified_at_seconds(&self) -> String {
        format_timestamp(self.modified_at)
    }
}

/// Format a timestamp as `YYYY-MM-DD HH:MM:SS`, dropping any fractional seconds.
#[must_use]
pub fn format_timestamp(timestamp: OffsetDateTime) -> String {
    let format = format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");

    // Formatting can only fail for components an `OffsetDateTime` always has, or on I/O errors,
    // which cannot occur when formatting into a `String`.
    timestamp
        .format(format)
        .unwrap_or_else(|_| timestamp.to_string())
}
