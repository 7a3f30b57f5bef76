//! Error types for storeguard-core

use thiserror::Error;

/// Result type alias using storeguard-core's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for storeguard
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: String },

    /// Invalid configuration format
    #[error("Invalid configuration format: {message}")]
    InvalidConfig { message: String },

    /// YAML parsing error
    #[error("YAML parsing error: {0}")]
    YamlParse(#[from] serde_yaml_ng::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Max-retries value that is neither a count nor a known keyword
    #[error("Invalid max retries: {value}. Expected a non-negative integer or 'unbounded'")]
    InvalidMaxRetries { value: String },

    /// Store not declared in configuration
    #[error("Unknown store: {name}")]
    UnknownStore { name: String },

    /// Store declared more than once
    #[error("Duplicate store: {name}")]
    DuplicateStore { name: String },

    /// Store name was empty
    #[error("Store name must not be empty")]
    EmptyStoreName,
}

impl Error {
    /// Create a config not found error
    pub fn config_not_found(path: impl Into<String>) -> Self {
        Self::ConfigNotFound { path: path.into() }
    }

    /// Create an invalid config error
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Create an invalid max retries error
    pub fn invalid_max_retries(value: impl Into<String>) -> Self {
        Self::InvalidMaxRetries {
            value: value.into(),
        }
    }

    /// Create an unknown store error
    pub fn unknown_store(name: impl Into<String>) -> Self {
        Self::UnknownStore { name: name.into() }
    }

    /// Create a duplicate store error
    pub fn duplicate_store(name: impl Into<String>) -> Self {
        Self::DuplicateStore { name: name.into() }
    }
}
