//! Custom error types for the node monitor
//!
//! Provides structured error handling for the two boundaries that need it:
//! network fetches against monitored nodes and operator command validation.

use std::fmt;

/// Network fetch error variants
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// Request did not complete within the probe timeout
    Timeout { url: String },

    /// Connection could not be established or was reset
    Connection { url: String, reason: String },

    /// Node answered with a non-success HTTP status
    Status { url: String, code: u16 },

    /// Response body could not be interpreted
    Malformed { url: String, reason: String },
}

/// Command validation error variants
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Wrong number of arguments for a command
    WrongArity {
        command: String,
        expected: usize,
        got: usize,
    },

    /// Required argument missing
    MissingArgument { command: String, argument: String },

    /// Address is not an IPv4/IPv6 literal
    InvalidAddress { value: String },

    /// Port is neither a valid u16 nor the "skip" marker
    InvalidPort { name: String, value: String },

    /// Command is not recognised
    UnknownCommand { command: String },
}

/// Configuration error variants
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Failed to load configuration file
    LoadFailed { path: String, reason: String },

    /// Invalid configuration value
    InvalidValue { field: String, reason: String },
}

impl FetchError {
    /// Short, stable description used as the persisted error text.
    ///
    /// Unlike `Display`, this never includes URLs or transport detail, so two
    /// identical failures always produce identical record entries.
    pub fn summary(&self) -> String {
        match self {
            FetchError::Timeout { .. } => "timeout".to_string(),
            FetchError::Connection { .. } => "connection failed".to_string(),
            FetchError::Status { code, .. } => format!("HTTP {}", code),
            FetchError::Malformed { .. } => "malformed response".to_string(),
        }
    }

    pub fn from_reqwest(url: &str, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchError::Timeout {
                url: url.to_string(),
            }
        } else if err.is_decode() || err.is_body() {
            FetchError::Malformed {
                url: url.to_string(),
                reason: err.to_string(),
            }
        } else {
            FetchError::Connection {
                url: url.to_string(),
                reason: err.to_string(),
            }
        }
    }
}

// Implement Display for all error types
impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchError::Timeout { url } => write!(f, "Request to {} timed out", url),
            FetchError::Connection { url, reason } => {
                write!(f, "Connection to {} failed: {}", url, reason)
            }
            FetchError::Status { url, code } => {
                write!(f, "{} returned HTTP status {}", url, code)
            }
            FetchError::Malformed { url, reason } => {
                write!(f, "Malformed response from {}: {}", url, reason)
            }
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::WrongArity {
                command,
                expected,
                got,
            } => write!(
                f,
                "/{} expects {} arguments, got {}",
                command, expected, got
            ),
            ValidationError::MissingArgument { command, argument } => {
                write!(f, "/{} is missing <{}>", command, argument)
            }
            ValidationError::InvalidAddress { value } => {
                write!(f, "IP address '{}' is not valid", value)
            }
            ValidationError::InvalidPort { name, value } => {
                write!(f, "{} '{}' is not a valid port", name, value)
            }
            ValidationError::UnknownCommand { command } => {
                write!(f, "Unknown command '{}'", command)
            }
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::LoadFailed { path, reason } => {
                write!(f, "Failed to load config from '{}': {}", path, reason)
            }
            ConfigError::InvalidValue { field, reason } => {
                write!(f, "Invalid value for '{}': {}", field, reason)
            }
        }
    }
}

// Implement std::error::Error
impl std::error::Error for FetchError {}
impl std::error::Error for ValidationError {}
impl std::error::Error for ConfigError {}
