use std::path::PathBuf;

use thiserror::Error as ThisError;


/// The placeholder in [`ShellOptions::input_pattern`] and [`ShellOptions::output_pattern`] which
/// is replaced by a session's one-based number.
pub const SESSION_PLACEHOLDER: &str = "{n}";


/// Runtime configuration of the `vfms` binary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellOptions {
    /// The number of batch sessions to run concurrently, or `0` for a single interactive session
    /// on standard input.
    pub sessions:       usize,
    /// Where the filesystem is loaded from at startup and saved to on `exit`.
    pub snapshot_path:  PathBuf,
    /// The command file of each batch session; see [`SESSION_PLACEHOLDER`].
    pub input_pattern:  String,
    /// The output file of each batch session; see [`SESSION_PLACEHOLDER`].
    pub output_pattern: String,
    /// Whether batch sessions operate on one shared filesystem, rather than each loading its
    /// own copy of the snapshot.
    pub shared:         bool,
    /// Whether to save the snapshot on `exit`.
    pub persist:        bool,
}

#[derive(ThisError, Debug, Clone, PartialEq, Eq)]
pub enum OptionsError {
    #[error("{0} requires a value")]
    MissingValue(&'static str),
    #[error("invalid number of sessions: {0}")]
    InvalidSessions(String),
    #[error("unknown option: {0}")]
    UnknownOption(String),
}

impl ShellOptions {
    /// Parse command-line arguments, not including the program name.
    ///
    /// Recognized: `--sessions N` (or `--sessions=N`), `--snapshot PATH` (or `--snapshot=PATH`),
    /// `--shared`, and `--no-persist`. Unspecified options keep their defaults.
    pub fn from_args<I: IntoIterator<Item = String>>(args: I) -> Result<Self, OptionsError> {
        let mut options = Self::default();
        let mut args = args.into_iter();

        while let Some(arg) = args.next() {
            let (flag, inline_value) = match arg.split_once('=') {
                Some((flag, value)) => (flag.to_owned(), Some(value.to_owned())),
                None                => (arg, None),
            };

            match flag.as_str() {
                "--sessions" => {
                    let value = inline_value
                        .or_else(|| args.next())
                        .ok_or(OptionsError::MissingValue("--sessions"))?;
                    options.sessions = value
                        .parse()
                        .map_err(|_| OptionsError::InvalidSessions(value))?;
                }
                "--snapshot" => {
                    let value = inline_value
                        .or_else(|| args.next())
                        .ok_or(OptionsError::MissingValue("--snapshot"))?;
                    options.snapshot_path = PathBuf::from(value);
                }
                "--shared" if inline_value.is_none()     => options.shared = true,
                "--no-persist" if inline_value.is_none() => options.persist = false,
                unknown => {
                    let original = match inline_value {
                        Some(value) => format!("{unknown}={value}"),
                        None        => unknown.to_owned(),
                    };
                    return Err(OptionsError::UnknownOption(original));
                }
            }
        }

        Ok(options)
    }

    /// The command file of the given one-based session.
    #[must_use]
    pub fn input_path(&self, session: usize) -> PathBuf {
        session_path(&self.input_pattern, session)
    }

    /// The output file of the given one-based session.
    #[must_use]
    pub fn output_path(&self, session: usize) -> PathBuf {
        session_path(&self.output_pattern, session)
    }

    #[inline]
    #[must_use]
    pub const fn is_interactive(&self) -> bool {
        self.sessions == 0
    }
}

impl Default for ShellOptions {
    fn default() -> Self {
        Self {
            sessions:       0,
            snapshot_path:  PathBuf::from("VFMS.json"),
            input_pattern:  format!("input_thread{SESSION_PLACEHOLDER}.txt"),
            output_pattern: format!("output_thread{SESSION_PLACEHOLDER}.txt"),
            shared:         false,
            persist:        true,
        }
    }
}

fn session_path(pattern: &str, session: usize) -> PathBuf {
    PathBuf::from(pattern.replace(SESSION_PLACEHOLDER, &session.to_string()))
}
