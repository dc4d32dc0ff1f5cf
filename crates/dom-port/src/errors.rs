//! Error taxonomy for document-tree backends.

use thiserror::Error;

/// Failures a backend may report while answering a lookup.
#[derive(Debug, Error, Clone)]
pub enum DomError {
    /// The node or document handle no longer refers to live content.
    #[error("detached handle: {0}")]
    Detached(String),

    /// The backend cannot evaluate the given query dialect.
    #[error("unsupported query: {0}")]
    QueryUnsupported(String),

    /// Any other backend-side failure (I/O, marshalling, injected faults).
    #[error("backend error: {0}")]
    Backend(String),
}

impl DomError {
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend(message.into())
    }

    pub fn detached(message: impl Into<String>) -> Self {
        Self::Detached(message.into())
    }
}

/// Convenience alias used throughout the port traits.
pub type DomResult<T> = std::result::Result<T, DomError>;
