//! Typed failures surfaced through `anyhow::Error`.
//!
//! Every public operation returns `anyhow::Result`; callers that need to tell
//! failures apart recover these with `downcast_ref::<Error>()`.

use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A line of an os-release file could not be parsed (1-based line number)
    OsReleaseParse { line: usize, reason: String },
    /// A key is missing from an os-release file
    KeyNotFound(String),
    /// An external command exited with a code counted as failure
    CommandFailed { program: String, code: i32 },
    /// An external command was terminated by a signal
    Signaled { program: String },
    /// An external command wrote something unexpected to stderr
    Stderr(String),
    /// A signing-key URL does not point to a file
    KeyUrl(String),
    /// `add_repo` was called without any repository URL
    NoRepoUrl,
    /// The operation requires superuser privileges
    NotSuperUser,
    /// A path that must be a directory exists as something else
    NotADirectory(PathBuf),
    /// No package-manager adapter exists for the distribution
    UnsupportedDistro(String),
    GroupNotFound(String),
    UserNotFound(String),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::OsReleaseParse { line, reason } => {
                write!(f, "os-release: line {}: {}", line, reason)
            }
            Error::KeyNotFound(key) => write!(f, "key not found: {}", key),
            Error::CommandFailed { program, code } => {
                write!(f, "command {:?} failed with exit code {}", program, code)
            }
            Error::Signaled { program } => {
                write!(f, "command {:?} was terminated by a signal", program)
            }
            Error::Stderr(text) => write!(f, "{}", text.trim_end()),
            Error::KeyUrl(url) => write!(f, "the url must have a file: {}", url),
            Error::NoRepoUrl => write!(f, "no repository url given"),
            Error::NotSuperUser => write!(f, "you MUST have superuser privileges"),
            Error::NotADirectory(path) => write!(f, "{:?} must be a directory", path),
            Error::UnsupportedDistro(name) => {
                write!(f, "no package manager available for {}", name)
            }
            Error::GroupNotFound(name) => write!(f, "group: unknown group {}", name),
            Error::UserNotFound(name) => write!(f, "user: unknown user {}", name),
        }
    }
}

impl std::error::Error for Error {}
