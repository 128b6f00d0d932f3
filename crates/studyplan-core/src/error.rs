//! Core error types for studyplan-core.
//!
//! The interaction and progress engines never fail: degenerate input turns
//! into a no-op or a "no data" value. Errors only surface from the edges
//! (disk, configuration, attached files, form validation).

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for studyplan-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Storage-related errors
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Attached-file errors
    #[error("Attachment error: {0}")]
    Attachment(#[from] AttachmentError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic errors with context
    #[error("{0}")]
    Custom(String),
}

/// Storage-specific errors.
#[derive(Error, Debug)]
pub enum StorageError {
    /// The data directory could not be resolved or created
    #[error("Cannot prepare data directory {path}: {source}")]
    DataDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Writing a collection snapshot failed
    #[error("Failed to write {path}: {source}")]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Serializing a collection snapshot failed
    #[error("Failed to encode {collection}: {source}")]
    EncodeFailed {
        collection: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// The store lock was poisoned by a panicking writer
    #[error("Storage lock poisoned")]
    Poisoned,
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Unknown configuration key
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),
}

/// Errors raised by the file-attachment collaborator.
#[derive(Error, Debug)]
pub enum AttachmentError {
    /// The handle would resolve outside the attachment directory
    #[error("File handle escapes the attachment directory: {0}")]
    OutsideStore(String),

    /// The source file has no usable name
    #[error("Source has no file name: {0}")]
    NoFileName(PathBuf),

    /// Copying into storage failed
    #[error("Failed to import {path}: {source}")]
    ImportFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Removing a stored file failed
    #[error("Failed to delete {handle}: {source}")]
    DeleteFailed {
        handle: String,
        #[source]
        source: std::io::Error,
    },

    /// Opening a stored file with the system viewer failed
    #[error("Failed to open {handle}: {source}")]
    OpenFailed {
        handle: String,
        #[source]
        source: std::io::Error,
    },

    /// No stored file with this handle
    #[error("No stored file named {0}")]
    Missing(String),
}

/// Validation errors.
#[derive(Error, Debug)]
pub enum ValidationError {
    /// Invalid time range
    #[error("Invalid time range: end ({end}) must be after start ({start})")]
    InvalidTimeRange { start: String, end: String },

    /// Malformed time of day
    #[error("Invalid time of day '{0}', expected HH:MM")]
    InvalidTime(String),

    /// Index out of bounds
    #[error("Index {index} out of bounds for {collection} (length: {len})")]
    OutOfBounds {
        collection: String,
        index: usize,
        len: usize,
    },

    /// Entity not found
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    /// Operation requires a career plan
    #[error("No career plan configured")]
    NoCareer,

    /// Invalid value
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
