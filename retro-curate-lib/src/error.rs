use std::path::PathBuf;

use thiserror::Error;

use retro_curate_core::{CurateError, ErrorKind};
use retro_curate_dat::DatError;

/// Errors raised while loading configuration, scanning or syncing.
#[derive(Debug, Error)]
pub enum LibError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{}: {source}", path.display())]
    File {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A source directory the run depends on could not be listed.
    #[error("Cannot read directory {}: {source}", path.display())]
    SourceDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Config error: {0}")]
    Config(String),

    #[error("Invalid config file: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("No filter named '{0}' (see list-filters)")]
    UnknownFilter(String),

    #[error(transparent)]
    Dat(#[from] DatError),

    #[error(transparent)]
    Curate(#[from] CurateError),
}

impl LibError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::File {
            path: path.into(),
            source,
        }
    }

    pub fn source_dir(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::SourceDir {
            path: path.into(),
            source,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Io(_) | Self::File { .. } | Self::SourceDir { .. } => ErrorKind::Io,
            Self::Config(_) | Self::Toml(_) | Self::UnknownFilter(_) => ErrorKind::Config,
            Self::Dat(e) => e.kind(),
            Self::Curate(e) => e.kind(),
        }
    }
}
