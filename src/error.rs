//! Error types and error handling for cortical.
//!
//! Every failure of a client call surfaces as a [`CorticalError`]. The
//! generic dispatch routine never treats an unparsable body as an error;
//! only the typed helpers do.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Broad classification of a [`CorticalError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// The network call itself failed.
    Transport,

    /// Base URL and path do not form a valid URI.
    InvalidUrl,

    /// The API answered with a status other than 200.
    HttpStatus,

    /// A single-text fingerprint request returned no elements.
    EmptyResult,

    /// The response did not have the shape a typed helper expects.
    UnexpectedResponse,

    /// Configuration could not be loaded or is invalid.
    Config,

    /// Local I/O failed.
    Io,
}

impl ErrorKind {
    /// Returns the kind as a string (e.g., "http_status").
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Transport => "transport",
            ErrorKind::InvalidUrl => "invalid_url",
            ErrorKind::HttpStatus => "http_status",
            ErrorKind::EmptyResult => "empty_result",
            ErrorKind::UnexpectedResponse => "unexpected_response",
            ErrorKind::Config => "config",
            ErrorKind::Io => "io",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// CLI exit codes.
pub mod exit_code {
    /// Success
    pub const SUCCESS: i32 = 0;
    /// General error
    pub const GENERAL_ERROR: i32 = 1;
    /// Configuration error
    pub const CONFIG_ERROR: i32 = 2;
    /// Connection error
    pub const CONNECTION_ERROR: i32 = 3;
    /// API rejected the request
    pub const API_ERROR: i32 = 4;
    /// Authentication error (401/403)
    pub const AUTH_ERROR: i32 = 5;
    /// Command line argument error
    pub const CLI_ERROR: i32 = 64;
}

/// The main error type for cortical.
#[derive(Debug, Error)]
pub enum CorticalError {
    /// The underlying HTTP call failed (DNS, connection refused, TLS...).
    #[error("Transport error: {url}")]
    Transport {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The request URL could not be parsed.
    #[error("Invalid URI \"{url}\"")]
    InvalidUrl { url: String, reason: String },

    /// Non-200 response. The raw body is kept as-is.
    #[error("Error {status}: {body}")]
    HttpStatus { status: u16, body: String },

    /// A fingerprint request returned an empty sequence.
    #[error("Empty result from {path}")]
    EmptyResult { path: String },

    /// The response did not decode into the expected model.
    #[error("Unexpected response: {message}")]
    UnexpectedResponse { message: String },

    /// Configuration file is invalid or cannot be loaded.
    #[error("Configuration error: {message}")]
    Config {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error.
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON encoding error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CorticalError {
    /// Returns the kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            CorticalError::Transport { .. } => ErrorKind::Transport,
            CorticalError::InvalidUrl { .. } => ErrorKind::InvalidUrl,
            CorticalError::HttpStatus { .. } => ErrorKind::HttpStatus,
            CorticalError::EmptyResult { .. } => ErrorKind::EmptyResult,
            CorticalError::UnexpectedResponse { .. } => ErrorKind::UnexpectedResponse,
            CorticalError::Config { .. } | CorticalError::Yaml(_) => ErrorKind::Config,
            CorticalError::Io(_) => ErrorKind::Io,
            CorticalError::Json(_) => ErrorKind::UnexpectedResponse,
        }
    }

    /// Returns the HTTP status code if the API rejected the request.
    pub fn status(&self) -> Option<u16> {
        match self {
            CorticalError::HttpStatus { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns the CLI exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CorticalError::Config { .. } | CorticalError::Yaml(_) => exit_code::CONFIG_ERROR,
            CorticalError::Transport { .. } | CorticalError::InvalidUrl { .. } => {
                exit_code::CONNECTION_ERROR
            }
            CorticalError::HttpStatus { status: 401, .. }
            | CorticalError::HttpStatus { status: 403, .. } => exit_code::AUTH_ERROR,
            CorticalError::HttpStatus { .. } => exit_code::API_ERROR,
            _ => exit_code::GENERAL_ERROR,
        }
    }

    /// Creates a configuration error with a message.
    pub fn config(message: impl Into<String>) -> Self {
        CorticalError::Config {
            message: message.into(),
            source: None,
        }
    }

    /// Creates a configuration error with a message and source.
    pub fn config_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        CorticalError::Config {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Creates a transport error for the given URL.
    pub fn transport_with_source(
        url: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        CorticalError::Transport {
            url: url.into(),
            source: Box::new(source),
        }
    }

    /// Creates an unexpected response error.
    pub fn unexpected(message: impl Into<String>) -> Self {
        CorticalError::UnexpectedResponse {
            message: message.into(),
        }
    }
}

/// Result type alias for cortical operations.
pub type Result<T> = std::result::Result<T, CorticalError>;
