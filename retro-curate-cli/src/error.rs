use std::path::PathBuf;

use thiserror::Error;

use retro_curate_core::ErrorKind;
use retro_curate_lib::LibError;

/// Exit status for arguments clap could not parse (including unknown verbs).
pub(crate) const EXIT_USAGE: i32 = 1;
/// Exit status for configuration, metadata and input-file errors.
pub(crate) const EXIT_INPUT: i32 = 10;
/// Exit status for a violated plan invariant.
pub(crate) const EXIT_INTERNAL: i32 = 20;

/// Errors that can occur during CLI command execution.
#[derive(Debug, Error)]
pub(crate) enum CliError {
    #[error(transparent)]
    Lib(#[from] LibError),

    /// The `--log-file` could not be created
    #[error("Cannot open log file {}: {source}", path.display())]
    LogFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Logger already installed: {0}")]
    Logger(#[from] log::SetLoggerError),
}

impl CliError {
    pub(crate) fn log_file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::LogFile {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn kind(&self) -> ErrorKind {
        match self {
            Self::Lib(e) => e.kind(),
            Self::LogFile { .. } => ErrorKind::Io,
            Self::Logger(_) => ErrorKind::Internal,
        }
    }

    pub(crate) fn exit_code(&self) -> i32 {
        exit_code(self.kind())
    }
}

pub(crate) fn exit_code(kind: ErrorKind) -> i32 {
    match kind {
        ErrorKind::Internal => EXIT_INTERNAL,
        ErrorKind::Config | ErrorKind::Metadata | ErrorKind::DependencyMissing | ErrorKind::Io => {
            EXIT_INPUT
        }
    }
}
