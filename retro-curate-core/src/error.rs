use thiserror::Error;

use crate::expr::ExprError;

/// Coarse classification used by callers to pick an exit status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed configuration, unknown filter, predicate syntax error.
    Config,
    /// Malformed or incomplete metadata records.
    Metadata,
    /// A selected machine depends on an identifier absent from the universe.
    DependencyMissing,
    /// Filesystem failure.
    Io,
    /// A plan or universe invariant was violated.
    Internal,
}

/// Errors raised by the selection engine.
#[derive(Debug, Error)]
pub enum CurateError {
    #[error("Config error: {0}")]
    Config(String),

    #[error("Invalid {field} expression: {source}")]
    Predicate {
        field: &'static str,
        #[source]
        source: ExprError,
    },

    #[error("Metadata error: {0}")]
    Metadata(String),

    #[error("Machine '{machine}' requires '{dependency}', which is not in the machine database")]
    DependencyMissing { machine: String, dependency: String },

    #[error("Dependency cycle through '{0}'")]
    DependencyCycle(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CurateError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn metadata(msg: impl Into<String>) -> Self {
        Self::Metadata(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Config(_) | Self::Predicate { .. } => ErrorKind::Config,
            Self::Metadata(_) | Self::DependencyCycle(_) => ErrorKind::Metadata,
            Self::DependencyMissing { .. } => ErrorKind::DependencyMissing,
            Self::Io(_) => ErrorKind::Io,
            Self::Internal(_) => ErrorKind::Internal,
        }
    }
}
