use std::fmt::Write as _;
use std::sync::Arc;

use tracing::Level as LogLevel;

use vfms::{BlockMap, ListingEntry, ListingKind, VirtualFileSystem};

use crate::command::Command;


const NAME_WIDTH: usize = 15;
const TYPE_WIDTH: usize = 10;
const SIZE_WIDTH: usize = 10;
const MODE_WIDTH: usize = 10;
const MODIFIED_WIDTH: usize = 19;

/// Shown in place of an absent size or mode in a listing, and for a closed file's mode.
const ABSENT: &str = "-";
/// Shown in a memory map for a free cell.
const FREE_CELL: &str = "*";

const HELP: &str = "\
Available commands:
  ls                                         List contents of current directory
  mkdir <name>                               Create new directory in current directory
  rmdir <name>                               Remove directory from current directory
  chdir <path>                               Change current directory. Set path as:
                                             ..      ==>     Move up directory
                                             /       ==>     Return to root
                                             /d/d    ==>     Absolute path
                                             d/d     ==>     Relative path
  create <name>                              Create new file in current directory
  delete <name>                              Remove file from current directory
  move <f_name> <path>                       Move file to the directory at path
  open <name> <mode>                         Open file in r or w mode
  close <name>                               Close file
  write_to_file <name> <data> <offset>       Write to file at a specific offset (optional)
  read_from_file <name> <offset> <length>    Read from file from a specific offset (optional)
  truncate <name> <size>                     Truncate file to a specified size (or all of it if not specified)
  show_memory_map                            Display Memory Map
  help                                       Display this help message
  exit                                       Exit the program";


/// What executing one line produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    /// The line was blank.
    Empty,
    /// Status text, a file's content, or a rendered view.
    Output(String),
    /// The session should end.
    Exit,
}

/// A command session over a [`VirtualFileSystem`], which may be shared with other sessions.
///
/// Every outcome of a command, success or failure, is rendered as text; a failed command leaves
/// the filesystem unchanged.
#[derive(Debug, Clone)]
pub struct Session {
    vfs: Arc<VirtualFileSystem>,
}

impl Session {
    #[must_use]
    pub const fn new(vfs: Arc<VirtualFileSystem>) -> Self {
        Self { vfs }
    }

    #[inline]
    #[must_use]
    pub fn filesystem(&self) -> &Arc<VirtualFileSystem> {
        &self.vfs
    }

    /// The interactive prompt: the current directory's name followed by `$ `.
    #[must_use]
    pub fn prompt(&self) -> String {
        format!("{}$ ", self.vfs.current_directory_name())
    }

    /// Parse and execute one line of input.
    pub fn execute(&self, line: &str) -> Response {
        match Command::parse(line) {
            Ok(None)          => Response::Empty,
            Ok(Some(command)) => self.run(command),
            Err(err)          => {
                tracing::event!(LogLevel::TRACE, "rejected line {line:?}: {err}");
                Response::Output(err.to_string())
            }
        }
    }

    /// Execute a parsed command.
    pub fn run(&self, command: Command) -> Response {
        let vfs = &*self.vfs;

        let result = match command {
            Command::Exit => return Response::Exit,
            Command::List          => Ok(render_listing(&vfs.list_current_directory())),
            Command::ShowMemoryMap => Ok(render_block_map(&vfs.block_map())),
            Command::Help          => Ok(HELP.to_owned()),

            Command::Create(name) => vfs
                .create_file(&name)
                .map(|()| format!("File created: {name}")),
            Command::Delete(name) => vfs
                .delete_file(&name)
                .map(|()| format!("File deleted: {name}")),
            Command::MakeDirectory(name) => vfs
                .create_directory(&name)
                .map(|()| format!("Directory created: {name}")),
            Command::RemoveDirectory(name) => vfs
                .delete_directory(&name)
                .map(|()| format!("Directory deleted: {name}")),
            Command::ChangeDirectory(path) => vfs
                .change_directory(&path)
                .map(|directory| format!("Successfuly moved to directory: {}", directory.name())),
            Command::Move { file, path } => vfs
                .move_file(&file, &path)
                .map(|()| format!("{file} has been moved to {path}")),

            Command::Open { name, mode } => vfs
                .open_file(&name, mode)
                .map(|()| format!("File {name} succesfully opened in {mode} mode")),
            Command::Close(name) => vfs
                .close_file(&name)
                .map(|()| format!("File {name} succesfully closed")),
            Command::Write { name, data, offset } => vfs
                .write_to_file(&name, &data, offset)
                .map(|()| format!("Successfuly written to file {name}")),
            Command::Read { name, range } => vfs.read_from_file(&name, range),
            Command::Truncate { name, size } => vfs
                .truncate_file(&name, size)
                .map(|()| format!("Successfuly truncated file {name}")),
        };

        match result {
            Ok(output) => Response::Output(output),
            Err(err) => {
                tracing::event!(LogLevel::DEBUG, "command failed: {err}");
                Response::Output(err.to_string())
            }
        }
    }
}

/// Render a directory listing as a table with a header row.
#[must_use]
pub fn render_listing(entries: &[ListingEntry]) -> String {
    let mut table = format!(
        "{:NAME_WIDTH$} {:TYPE_WIDTH$} {:SIZE_WIDTH$} {:MODE_WIDTH$} {:MODIFIED_WIDTH$}",
        "name", "type", "size", "mode", "last_modified",
    );

    for entry in entries {
        let (file_type, size, mode) = match &entry.kind {
            ListingKind::File { file_type, size, open_mode } => (
                file_type.as_str(),
                format!("{size}B"),
                open_mode.map_or_else(|| ABSENT.to_owned(), |mode| mode.to_string()),
            ),
            ListingKind::Directory => ("dir", ABSENT.to_owned(), ABSENT.to_owned()),
        };

        // Writing to a `String` cannot fail.
        let _ = write!(
            table,
            "\n{:NAME_WIDTH$} {file_type:TYPE_WIDTH$} {size:SIZE_WIDTH$} {mode:MODE_WIDTH$} {:MODIFIED_WIDTH$}",
            entry.name,
            entry.modified_at_seconds(),
        );
    }

    table
}

/// Render the block map one row per line, with each cell followed by a tab.
#[must_use]
pub fn render_block_map(block_map: &BlockMap) -> String {
    block_map
        .render()
        .map(|row| {
            row.iter()
                .map(|cell| match cell {
                    Some(attribution) => format!("{attribution}\t"),
                    None              => format!("{FREE_CELL}\t"),
                })
                .collect::<String>()
        })
        .collect::<Vec<_>>()
        .join("\n")
}
