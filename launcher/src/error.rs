use std::io;
use std::io::Write;
use thiserror::Error;

use crate::command::ExitCode;

/// Every way a launch can fail short of the invoked command itself.
#[derive(Debug, Error)]
pub enum LaunchError {
    /// The launcher is not running from a packed archive it can read.
    #[error("{0}")]
    Linkage(String),

    /// The archive or one of its entries could not be read.
    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: io::Error,
    },

    /// The manifest entry exists but cannot be parsed.
    #[error("malformed manifest {entry}, line {line}")]
    Manifest { entry: String, line: usize },

    /// Bundled libraries could not be written out, or there were none.
    #[error("{message}")]
    Unpack {
        message: String,
        #[source]
        source: Option<io::Error>,
    },

    /// No runnable component answers to the command token.
    ///
    /// `attempted` carries the qualified name only when nothing by that name
    /// was found; a component lacking an entry point reports `None`.
    #[error("unknown command {name}")]
    UnknownCommand {
        name: String,
        attempted: Option<String>,
    },

    /// A forwarded argument cannot be passed to a native entry point.
    #[error("argument {0:?} contains a NUL byte")]
    InvalidArgument(String),

    /// A file requested through the diagnostic commands does not exist.
    #[error("no such file {0}")]
    NotFound(String),

    /// Failure raised by the invoked entry point, passed through unchanged.
    #[error(transparent)]
    Command(#[from] anyhow::Error),
}

impl LaunchError {
    pub(crate) fn io(context: impl Into<String>, source: io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    pub(crate) fn unpack(message: impl Into<String>, source: Option<io::Error>) -> Self {
        Self::Unpack {
            message: message.into(),
            source,
        }
    }

    /// Write the user-facing message for this error and return the exit code.
    pub fn report(&self, stderr: &mut dyn Write) -> ExitCode {
        let _ = match self {
            Self::NotFound(_) => writeln!(stderr, "error: {self}"),
            Self::UnknownCommand {
                attempted: Some(qualified),
                ..
            } => writeln!(stderr, "fatal: {self}\n      (component {qualified} not found)"),
            Self::Command(err) => writeln!(stderr, "fatal: {err:#}"),
            _ => writeln!(stderr, "fatal: {self}"),
        };
        1
    }
}
