//! Protocol error types.

use thiserror::Error;

/// Errors raised while decoding client input.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    /// A request parameter could not be parsed.
    #[error("invalid value '{value}' for parameter '{name}'")]
    InvalidParameter {
        /// Parameter name.
        name: String,
        /// Raw value received.
        value: String,
    },
}
