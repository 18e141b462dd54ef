//! A line-command front end for the [`vfms`] in-memory file store.
//!
//! A [`Session`] executes commands such as `mkdir docs` or `write_to_file notes.txt hello`
//! against a [`VirtualFileSystem`](vfms::VirtualFileSystem) and renders each outcome as text.
//! A [`SnapshotFile`] persists a filesystem as JSON between runs.

mod command;
mod options;
mod persist;
mod session;


pub use self::{
    command::{Command, ParseError},
    options::{OptionsError, SESSION_PLACEHOLDER, ShellOptions},
    persist::SnapshotFile,
    session::{Response, Session, render_block_map, render_listing},
};
