//! Error types for Panotour Core

use thiserror::Error;

use crate::event::EntityKind;

/// Result type alias using Panotour's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Which history stack an operation targeted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StackKind {
    Undo,
    Redo,
}

impl std::fmt::Display for StackKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Undo => write!(f, "undo"),
            Self::Redo => write!(f, "redo"),
        }
    }
}

/// Panotour error types
#[derive(Error, Debug)]
pub enum Error {
    #[error("{kind} not found: {id}")]
    NotFound { kind: EntityKind, id: String },

    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    #[error("Nothing to {0}")]
    EmptyStack(StackKind),

    #[error("Replaying '{command}' failed: {source}")]
    ReplayFailure {
        command: String,
        #[source]
        source: Box<Error>,
    },

    #[error("Unsupported document version: {0}")]
    UnsupportedVersion(u32),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    pub fn not_found(kind: EntityKind, id: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            id: id.into(),
        }
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidParameters(message.into())
    }

    /// Short, stable name of the error class, used as the `kind` of log records
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "NotFound",
            Self::InvalidParameters(_) => "InvalidParameters",
            Self::EmptyStack(_) => "EmptyStack",
            Self::ReplayFailure { .. } => "ReplayFailure",
            Self::UnsupportedVersion(_) => "UnsupportedVersion",
            Self::Serialization(_) => "Serialization",
        }
    }
}
