//! Error types for the cms-bridge core library
//!
//! Malformed payloads never surface here: detection and validation report
//! problems as data, and the transformer degrades on depth or cycle guards.
//! Errors are reserved for caller contract violations, graphs too large to
//! copy out, and corrupted mapping exports.

use thiserror::Error;

/// Main error type for cms-bridge operations
#[derive(Error, Debug)]
pub enum Error {
    /// The caller passed an argument outside the operation's contract
    #[error("Invalid argument: {message}")]
    InvalidArgument {
        message: String,
        argument: Option<String>,
    },

    /// A document graph expanded past its node budget while being copied out
    #[error("Document expands past {limit} nodes; shared nodes are copied at every reference")]
    NodeBudgetExceeded { limit: usize },

    /// A serialized identity-mapping export could not be loaded
    #[error("Failed to import id mappings: {message}")]
    MappingImport {
        message: String,
        #[source]
        source: serde_json::Error,
    },

    /// JSON parsing and serialization errors
    #[error("JSON error: {message}")]
    Json {
        message: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Convenience type alias for Results using our Error type
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create an invalid argument error naming the offending argument
    pub fn invalid_argument(argument: impl Into<String>, message: impl Into<String>) -> Self {
        Error::InvalidArgument {
            message: message.into(),
            argument: Some(argument.into()),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Json {
            message: err.to_string(),
            source: err,
        }
    }
}
