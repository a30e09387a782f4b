//! Error types for bestiary
//!
//! One crate-wide error enum covers the three stages of the tool:
//! - fetching from the SRD API (network, HTTP status, malformed payloads)
//! - reading and writing the interchange document (I/O, JSON)
//! - configuration loading and validation (TOML, invalid values)

use thiserror::Error;

/// Result type alias for bestiary operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for bestiary
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "emit.max_lines")
        key: Option<String>,
    },

    /// Configuration file could not be parsed
    #[error("failed to parse configuration: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Network error
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The remote API answered with a non-success status
    #[error("HTTP {status} from {url}")]
    Http {
        /// Response status code
        status: u16,
        /// Requested URL
        url: String,
    },

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A source payload could not be normalized into a monster record
    #[error("invalid record {index}: {reason}")]
    InvalidRecord {
        /// Index (slug) of the offending record, or "<unknown>"
        index: String,
        /// Why the record was rejected
        reason: String,
    },

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Shorthand for a configuration error tied to a specific key
    pub fn config(key: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Config {
            message: message.into(),
            key: Some(key.into()),
        }
    }
}
