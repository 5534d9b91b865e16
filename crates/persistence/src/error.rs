//! Error types for the admin persistence layer.
//!
//! Only genuine failures live here: backend I/O, misconfiguration and lookups
//! of models that were required to exist. Expected bad input (an unknown model
//! name in the models pool, a filter value that does not parse) is converted
//! into an absence at the point where it is detected and never reaches these
//! types.

// Error enum variant fields are self-documenting via their #[error(...)] messages
#![allow(missing_docs)]

use thiserror::Error;

use crate::core::AdapterKind;

/// The primary error type for all admin persistence operations.
#[derive(Error, Debug)]
pub enum AdminError {
    /// Model lookup errors
    #[error(transparent)]
    Model(#[from] ModelError),

    /// Backend-specific errors
    #[error(transparent)]
    Backend(#[from] BackendError),

    /// Configuration errors
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Errors related to model resolution and model metadata.
#[derive(Error, Debug)]
pub enum ModelError {
    /// The model is not known to the registry.
    #[error("unknown model: {model_name}")]
    UnknownModel { model_name: String },

    /// No backend adapter is registered for the adapter kind.
    #[error("no backend registered for adapter kind {kind}")]
    NoAdapter { kind: AdapterKind },
}

/// Errors originating from a backend.
#[derive(Error, Debug)]
pub enum BackendError {
    /// Connection to the backend failed.
    #[error("connection failed to {backend_name}: {message}")]
    ConnectionFailed {
        backend_name: String,
        message: String,
    },

    /// Connection pool exhausted.
    #[error("connection pool exhausted for {backend_name}")]
    PoolExhausted { backend_name: String },

    /// The model is not mapped to a table or collection in this backend.
    #[error("model {model_name} is not mapped in {backend_name}")]
    UnmappedModel {
        backend_name: String,
        model_name: String,
    },

    /// A predicate compiled for one backend was handed to another.
    #[error("{backend_name} cannot execute a {predicate_kind} predicate")]
    ForeignPredicate {
        backend_name: String,
        predicate_kind: &'static str,
    },

    /// A record has no usable primary key value.
    #[error("record of {model_name} has no primary key value")]
    MissingPrimaryKey { model_name: String },

    /// Internal backend error.
    #[error("internal error in {backend_name}: {message}")]
    Internal {
        backend_name: String,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Query execution error.
    #[error("query execution failed: {message}")]
    QueryError { message: String },

    /// Serialization/deserialization error.
    #[error("serialization error: {message}")]
    SerializationError { message: String },
}

/// Errors related to loading configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read configuration {path}: {message}")]
    Unreadable { path: String, message: String },

    /// The configuration could not be parsed.
    #[error("invalid configuration: {message}")]
    Invalid { message: String },
}

/// Result type for admin persistence operations.
pub type AdminResult<T> = Result<T, AdminError>;

/// Result type for backend operations.
pub type BackendResult<T> = Result<T, BackendError>;

// Implement conversions from common error types

impl From<serde_json::Error> for AdminError {
    fn from(err: serde_json::Error) -> Self {
        AdminError::Backend(BackendError::SerializationError {
            message: err.to_string(),
        })
    }
}

impl From<regex::Error> for BackendError {
    fn from(err: regex::Error) -> Self {
        BackendError::QueryError {
            message: format!("invalid pattern: {}", err),
        }
    }
}

#[cfg(feature = "sqlite")]
impl From<rusqlite::Error> for BackendError {
    fn from(err: rusqlite::Error) -> Self {
        BackendError::Internal {
            backend_name: "sqlite".to_string(),
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }
}

#[cfg(feature = "sqlite")]
impl From<r2d2::Error> for BackendError {
    fn from(_err: r2d2::Error) -> Self {
        BackendError::PoolExhausted {
            backend_name: "sqlite".to_string(),
        }
    }
}
