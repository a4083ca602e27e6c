//! Error handling for subdomain extraction.
//!
//! This module defines the error type that covers the ways an extraction can
//! fail, from bad input to transport failures and unexpected page layouts.
//! An empty result is not an error: it comes back as `Ok` with an empty set.

use std::fmt;
use std::time::Duration;

/// Main error type for subdomain extraction.
#[derive(Debug, Clone)]
pub enum ExtractError {
    /// Empty or malformed parent domain
    InvalidInput {
        input: String,
        reason: String,
    },

    /// Network failure, non-success HTTP status, or timeout
    FetchError {
        message: String,
        status_code: Option<u16>,
        source: Option<String>,
        timed_out: bool,
    },

    /// Response body could not be decoded, or the results table no longer
    /// has the expected shape
    ParseError {
        message: String,
    },

    /// Configuration errors (invalid settings, bad TOML, etc.)
    ConfigError {
        message: String,
    },

    /// File I/O errors when reading configuration files
    FileError {
        path: String,
        message: String,
    },
}

impl ExtractError {
    /// Create a new invalid input error.
    pub fn invalid_input<I: Into<String>, R: Into<String>>(input: I, reason: R) -> Self {
        Self::InvalidInput {
            input: input.into(),
            reason: reason.into(),
        }
    }

    /// Create a new fetch error with source information.
    pub fn fetch_with_source<M: Into<String>, S: Into<String>>(message: M, source: S) -> Self {
        Self::FetchError {
            message: message.into(),
            status_code: None,
            source: Some(source.into()),
            timed_out: false,
        }
    }

    /// Create a new fetch error for a non-success HTTP status.
    pub fn fetch_with_status<M: Into<String>>(message: M, status_code: u16) -> Self {
        Self::FetchError {
            message: message.into(),
            status_code: Some(status_code),
            source: None,
            timed_out: false,
        }
    }

    /// Create a fetch error for a request that ran out of time.
    pub fn timeout(duration: Duration) -> Self {
        Self::FetchError {
            message: format!("request timed out after {:?}", duration),
            status_code: None,
            source: None,
            timed_out: true,
        }
    }

    /// Create a new parse error.
    pub fn parse<M: Into<String>>(message: M) -> Self {
        Self::ParseError {
            message: message.into(),
        }
    }

    /// Create a new configuration error.
    pub fn config<M: Into<String>>(message: M) -> Self {
        Self::ConfigError {
            message: message.into(),
        }
    }

    /// Create a new file error.
    pub fn file_error<P: Into<String>, M: Into<String>>(path: P, message: M) -> Self {
        Self::FileError {
            path: path.into(),
            message: message.into(),
        }
    }

    /// HTTP status code returned by the search endpoint, if any.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::FetchError { status_code, .. } => *status_code,
            _ => None,
        }
    }

    /// Whether this error came from a request timing out.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::FetchError { timed_out: true, .. })
    }
}

impl fmt::Display for ExtractError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidInput { input, reason } => {
                write!(f, "Invalid parent domain '{}': {}", input, reason)
            }
            Self::FetchError {
                message,
                status_code,
                source,
                ..
            } => {
                write!(f, "Fetch error")?;
                if let Some(code) = status_code {
                    write!(f, " (HTTP {})", code)?;
                }
                write!(f, ": {}", message)?;
                if let Some(source) = source {
                    write!(f, " (source: {})", source)?;
                }
                Ok(())
            }
            Self::ParseError { message } => {
                write!(f, "Parse error: {}", message)
            }
            Self::ConfigError { message } => {
                write!(f, "Configuration error: {}", message)
            }
            Self::FileError { path, message } => {
                write!(f, "File error at '{}': {}", path, message)
            }
        }
    }
}

impl std::error::Error for ExtractError {}

impl From<reqwest::Error> for ExtractError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::FetchError {
                message: "request timed out".to_string(),
                status_code: None,
                source: Some(err.to_string()),
                timed_out: true,
            }
        } else if err.is_connect() {
            Self::fetch_with_source("Connection failed", err.to_string())
        } else if err.is_body() {
            Self::fetch_with_source("Connection lost while reading response body", err.to_string())
        } else if err.is_decode() {
            Self::parse(format!("Failed to decode response body: {}", err))
        } else if let Some(status) = err.status() {
            Self::fetch_with_status(err.to_string(), status.as_u16())
        } else {
            Self::fetch_with_source("HTTP request failed", err.to_string())
        }
    }
}
