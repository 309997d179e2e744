//! Core error types.

use crate::config::Verbosity;
use thiserror::Error;

/// Message reported when an update touches no row.
pub const CONFLICT_MESSAGE: &str =
    "Error saving the changes. Instance might already be modified by other users.";

/// Engine errors.
///
/// Every builder and service operation returns either a usable result or
/// one of these; none of them panic for expected conditions.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum Error {
    /// Entity name failed the identifier check.
    #[error("invalid class name '{0}'")]
    InvalidName(String),

    /// No descriptor is registered under the name.
    #[error("unrecognized class name '{0}'")]
    UnrecognizedEntity(String),

    /// The registered factory could not produce a descriptor.
    #[error("invalid class handler for '{name}': {reason}")]
    InvalidHandler {
        /// Entity name.
        name: String,
        /// Why the factory failed.
        reason: String,
    },

    /// A descriptor is inconsistent (missing identifier, bad pattern, ...).
    #[error("schema error: {0}")]
    Schema(String),

    /// A security hook rejected the operation.
    #[error("{0}")]
    Security(String),

    /// One or more field values were rejected.
    #[error("{message}")]
    Validation {
        /// Human readable summary.
        message: String,
        /// Every offending property name.
        fields: Vec<String>,
    },

    /// The update matched no row: the instance changed since it was read.
    #[error("concurrency conflict on {entity} #{id}")]
    ConcurrencyConflict {
        /// Entity name.
        entity: String,
        /// Instance identifier.
        id: i64,
    },

    /// Storage failure reported by the database gateway.
    #[error("gateway error: {0}")]
    Gateway(String),
}

/// Fieldless error classification, for matching without the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// See [`Error::InvalidName`].
    InvalidName,
    /// See [`Error::UnrecognizedEntity`].
    UnrecognizedEntity,
    /// See [`Error::InvalidHandler`].
    InvalidHandler,
    /// See [`Error::Schema`].
    Schema,
    /// See [`Error::Security`].
    Security,
    /// See [`Error::Validation`].
    Validation,
    /// See [`Error::ConcurrencyConflict`].
    ConcurrencyConflict,
    /// See [`Error::Gateway`].
    Gateway,
}

impl Error {
    /// The default denial raised by `can_edit_instance`.
    pub fn not_authorized() -> Self {
        Error::Security("Not authorized".to_string())
    }

    /// A single-field validation failure.
    pub fn invalid_field(field: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Validation {
            message: message.into(),
            fields: vec![field.into()],
        }
    }

    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InvalidName(_) => ErrorKind::InvalidName,
            Error::UnrecognizedEntity(_) => ErrorKind::UnrecognizedEntity,
            Error::InvalidHandler { .. } => ErrorKind::InvalidHandler,
            Error::Schema(_) => ErrorKind::Schema,
            Error::Security(_) => ErrorKind::Security,
            Error::Validation { .. } => ErrorKind::Validation,
            Error::ConcurrencyConflict { .. } => ErrorKind::ConcurrencyConflict,
            Error::Gateway(_) => ErrorKind::Gateway,
        }
    }

    /// Offending property names of a validation error.
    pub fn fields(&self) -> &[String] {
        match self {
            Error::Validation { fields, .. } => fields,
            _ => &[],
        }
    }

    /// Render the message shown to a client.
    ///
    /// Terse rendering hides registry and storage details; the kind of the
    /// error is the same either way.
    pub fn client_message(&self, verbosity: Verbosity) -> String {
        match (self, verbosity) {
            (Error::InvalidName(name) | Error::UnrecognizedEntity(name), Verbosity::Terse)
            | (Error::InvalidHandler { name, .. }, Verbosity::Terse) => {
                format!("Class {name} not found")
            }
            (Error::Gateway(_), Verbosity::Terse) => "Internal error".to_string(),
            (Error::Gateway(detail), Verbosity::Verbose) => detail.clone(),
            (Error::ConcurrencyConflict { .. }, _) => CONFLICT_MESSAGE.to_string(),
            _ => self.to_string(),
        }
    }
}

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, Error>;
