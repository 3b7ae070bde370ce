//! Error types for tally.

use thiserror::Error;

use crate::query::ArgKind;

/// Main error type for tally operations.
#[derive(Error, Debug)]
pub enum TallyError {
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Execution error: {0}")]
    Execution(#[from] ExecutionError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Errors produced by the command grammar parser.
///
/// Each variant renders to a message the user can act on directly;
/// the engine appends a `/help` hint when replying.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("unrecognized command \"{command}\"")]
    UnrecognizedCommand { command: String },

    #[error("argument {position}: expected {expected}, got {}", found.as_deref().unwrap_or("nothing"))]
    MalformedArgument {
        /// 1-based position among the arguments after the command name.
        position: usize,
        expected: ArgKind,
        found: Option<String>,
    },
}

/// Errors produced by the query intent validator.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("unknown category \"{0}\"")]
    UnknownEntity(String),

    #[error("invalid date range: {start} is after {end}")]
    InvalidRange {
        start: chrono::NaiveDateTime,
        end: chrono::NaiveDateTime,
    },

    #[error("amount filter out of range: {detail}")]
    OutOfRange { detail: String },
}

/// Errors surfaced from the storage backend while running a pipeline.
///
/// These are reported to users generically and logged in full.
#[derive(Error, Debug)]
pub enum ExecutionError {
    #[error("database error: {0}")]
    Database(#[from] mongodb::error::Error),

    #[error("unexpected result shape: {0}")]
    UnexpectedShape(String),
}

/// Configuration-related errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Missing required field: {0}")]
    MissingField(String),
}

/// Telegram transport errors.
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Telegram API error: {0}")]
    Api(String),
}

/// Result type alias for tally operations.
pub type Result<T> = std::result::Result<T, TallyError>;
