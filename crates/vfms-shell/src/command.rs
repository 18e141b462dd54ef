use thiserror::Error as ThisError;

use vfms::OpenMode;


pub(crate) const CREATE_USAGE: &str = "Usage: create <name>";
pub(crate) const DELETE_USAGE: &str = "Usage: delete <name>";
pub(crate) const MKDIR_USAGE: &str = "Usage: mkdir <name>";
pub(crate) const RMDIR_USAGE: &str = "Usage: rmdir <name>";
pub(crate) const CHDIR_USAGE: &str = "Usage: chdir <path>";
pub(crate) const MOVE_USAGE: &str = "Usage: move <f_name> <path>";
pub(crate) const OPEN_USAGE: &str = "Usage: open <name> <mode>";
pub(crate) const CLOSE_USAGE: &str = "Usage: close <name>";
pub(crate) const WRITE_USAGE: &str = "Usage: write_to_file <name> <data> <offset>";
pub(crate) const READ_USAGE: &str = "Usage: read_from_file <name> <offset> <length>";
pub(crate) const TRUNCATE_USAGE: &str = "Usage: truncate <name> <size>";


/// One line of input, parsed into a verb and its arguments.
///
/// Arguments are whitespace-separated tokens, so no argument (including the data of a write)
/// can contain whitespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    List,
    Create(String),
    Delete(String),
    MakeDirectory(String),
    RemoveDirectory(String),
    ChangeDirectory(String),
    Move {
        file: String,
        path: String,
    },
    Open {
        name: String,
        mode: OpenMode,
    },
    Close(String),
    Write {
        name:   String,
        data:   String,
        offset: Option<usize>,
    },
    Read {
        name:  String,
        /// `(offset, length)`
        range: Option<(usize, usize)>,
    },
    Truncate {
        name: String,
        size: Option<usize>,
    },
    ShowMemoryMap,
    Help,
    Exit,
}

/// A line which could not be parsed into a [`Command`]. Nothing is executed for such a line.
#[derive(ThisError, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// The verb was given the wrong number of arguments. Holds the verb's usage line.
    #[error("{0}")]
    Usage(&'static str),
    #[error("Enter a valid mode to open file (r,w)")]
    InvalidMode(String),
    #[error("Invalid number: {value}. {usage}")]
    InvalidNumber {
        value: String,
        usage: &'static str,
    },
    #[error("Unknown command: {0}")]
    UnknownCommand(String),
}

impl Command {
    /// Parse one line of input. Returns `Ok(None)` for a blank line.
    ///
    /// Verbs which take no arguments (`ls`, `show_memory_map`, `help`, `exit`) ignore any
    /// arguments they are given.
    pub fn parse(line: &str) -> Result<Option<Self>, ParseError> {
        let mut parts = line.split_whitespace();
        let Some(verb) = parts.next() else {
            return Ok(None);
        };
        let args = parts.collect::<Vec<_>>();

        let command = match verb {
            "ls"              => Self::List,
            "show_memory_map" => Self::ShowMemoryMap,
            "help"            => Self::Help,
            "exit"            => Self::Exit,
            "create"          => Self::Create(single(&args, CREATE_USAGE)?),
            "delete"          => Self::Delete(single(&args, DELETE_USAGE)?),
            "mkdir"           => Self::MakeDirectory(single(&args, MKDIR_USAGE)?),
            "rmdir"           => Self::RemoveDirectory(single(&args, RMDIR_USAGE)?),
            "chdir"           => Self::ChangeDirectory(single(&args, CHDIR_USAGE)?),
            "close"           => Self::Close(single(&args, CLOSE_USAGE)?),
            "move" => match args.as_slice() {
                [file, path] => Self::Move {
                    file: (*file).to_owned(),
                    path: (*path).to_owned(),
                },
                _ => return Err(ParseError::Usage(MOVE_USAGE)),
            },
            "open" => match args.as_slice() {
                [name, mode] => Self::Open {
                    name: (*name).to_owned(),
                    mode: parse_mode(mode)?,
                },
                _ => return Err(ParseError::Usage(OPEN_USAGE)),
            },
            "write_to_file" => match args.as_slice() {
                [name, data] => Self::Write {
                    name:   (*name).to_owned(),
                    data:   (*data).to_owned(),
                    offset: None,
                },
                [name, data, offset] => Self::Write {
                    name:   (*name).to_owned(),
                    data:   (*data).to_owned(),
                    offset: Some(number(offset, WRITE_USAGE)?),
                },
                _ => return Err(ParseError::Usage(WRITE_USAGE)),
            },
            "read_from_file" => match args.as_slice() {
                [name] => Self::Read {
                    name:  (*name).to_owned(),
                    range: None,
                },
                [name, offset, length] => Self::Read {
                    name:  (*name).to_owned(),
                    range: Some((number(offset, READ_USAGE)?, number(length, READ_USAGE)?)),
                },
                _ => return Err(ParseError::Usage(READ_USAGE)),
            },
            "truncate" => match args.as_slice() {
                [name] => Self::Truncate {
                    name: (*name).to_owned(),
                    size: None,
                },
                [name, size] => Self::Truncate {
                    name: (*name).to_owned(),
                    size: Some(number(size, TRUNCATE_USAGE)?),
                },
                _ => return Err(ParseError::Usage(TRUNCATE_USAGE)),
            },
            unknown => return Err(ParseError::UnknownCommand(unknown.to_owned())),
        };

        Ok(Some(command))
    }
}

fn single(args: &[&str], usage: &'static str) -> Result<String, ParseError> {
    match args {
        [arg] => Ok((*arg).to_owned()),
        _     => Err(ParseError::Usage(usage)),
    }
}

fn number(arg: &str, usage: &'static str) -> Result<usize, ParseError> {
    arg.parse().map_err(|_| ParseError::InvalidNumber {
        value: arg.to_owned(),
        usage,
    })
}

/// Only plain read and plain write can be requested from the command line.
fn parse_mode(mode: &str) -> Result<OpenMode, ParseError> {
    match mode {
        "r" => Ok(OpenMode::READ),
        "w" => Ok(OpenMode::WRITE),
        _   => Err(ParseError::InvalidMode(mode.to_owned())),
    }
}
