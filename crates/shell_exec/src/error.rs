//! Error types for command execution
//!
//! Two classes of failure exist: OS/syscall failures, whose normalized status
//! is the underlying OS error code, and user/argument errors, which always
//! map to [`EXIT_FAILURE`].

use std::io::{self, Write};

use nix::errno::Errno;

use crate::shell::status::{ExitCode, EXIT_FAILURE};

/// Errors raised while evaluating a command tree.
#[derive(Debug, thiserror::Error)]
pub enum ShellError {
    /// A syscall issued through `nix` failed (fork, pipe, dup2, exec, wait).
    #[error("{context}: {source}")]
    Os {
        context: String,
        #[source]
        source: Errno,
    },

    /// A filesystem or std I/O operation failed (open, chdir, getcwd, write).
    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: io::Error,
    },

    /// Wrong argument count, empty path, empty directory stack.
    #[error("{0}")]
    Usage(String),
}

impl ShellError {
    pub fn os(context: impl Into<String>, source: Errno) -> Self {
        Self::Os {
            context: context.into(),
            source,
        }
    }

    pub fn io(context: impl Into<String>, source: io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    pub fn usage(message: impl Into<String>) -> Self {
        Self::Usage(message.into())
    }

    /// Normalized exit code for this failure. Never zero.
    pub fn exit_code(&self) -> ExitCode {
        let code = match self {
            Self::Os { source, .. } => *source as i32,
            Self::Io { source, .. } => source.raw_os_error().unwrap_or(EXIT_FAILURE),
            Self::Usage(_) => EXIT_FAILURE,
        };
        if code == 0 {
            EXIT_FAILURE
        } else {
            code
        }
    }

    /// Write the diagnostic line to stderr.
    pub fn report(&self) {
        tracing::debug!(error = %self, status = self.exit_code(), "shell.error");
        let _ = writeln!(io::stderr(), "fsh: {}", self);
    }

    /// Report and return the exit code, for component boundaries.
    pub fn into_status(self) -> ExitCode {
        self.report();
        self.exit_code()
    }
}
