//! Error types for catalog resolution

use std::io;
use thiserror::Error;

/// Fatal errors raised while resolving a geodatabase catalog.
///
/// Recoverable conditions (skipped records, malformed definitions, naming
/// conflicts) are not errors; they are collected as
/// [`Notification`](crate::notification::Notification)s instead.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Underlying I/O failure
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Unreadable table header or record
    #[error("Format error: {0}")]
    Format(String),

    /// The directory does not hold a usable system catalog
    #[error("Catalog not found: {0}")]
    CatalogNotFound(String),
}

impl CatalogError {
    /// Build a [`CatalogError::Format`] from anything printable.
    pub fn format(message: impl Into<String>) -> Self {
        CatalogError::Format(message.into())
    }

    /// Build a [`CatalogError::CatalogNotFound`] from anything printable.
    pub fn not_found(message: impl Into<String>) -> Self {
        CatalogError::CatalogNotFound(message.into())
    }

    /// Returns `true` for errors that only affect a single record.
    pub fn is_format(&self) -> bool {
        matches!(self, CatalogError::Format(_))
    }
}

/// Result alias used across the crate
pub type Result<T> = std::result::Result<T, CatalogError>;
