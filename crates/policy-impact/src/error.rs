//! Error types for the policy impact engine.
//!
//! Every failure surfaced by the engine is a variant of [`Error`]. Callers that
//! sit behind a transport boundary classify errors with [`Error::kind`], which
//! follows a 4xx/5xx style split:
//!
//! - Caller problems: missing records, duplicate edges, malformed input
//! - Engine problems: I/O, serialization, configuration, storage

use crate::domain::{DependencyId, DependentType, EntityId, PolicyId};
use std::io;
use thiserror::Error;

/// The error type for policy impact operations.
#[derive(Debug, Error)]
pub enum Error {
    /// The referenced policy does not exist.
    #[error("Policy not found: {0}")]
    PolicyNotFound(PolicyId),

    /// The referenced dependency record does not exist.
    #[error("Dependency not found: {0}")]
    DependencyNotFound(DependencyId),

    /// An active dependency with the same policy, dependent type and dependent id exists.
    #[error(
        "Active dependency already exists: policy {policy_id} -> {dependent_type} {dependent_id}"
    )]
    DuplicateDependency {
        /// Policy that owns the edge.
        policy_id: PolicyId,
        /// Kind of the dependent entity.
        dependent_type: DependentType,
        /// The dependent entity.
        dependent_id: EntityId,
    },

    /// An argument was malformed or outside its closed set of values.
    #[error("Invalid {field}: '{value}'. Valid values: {valid_values}")]
    InvalidArgument {
        /// The field name that had an invalid value.
        field: &'static str,
        /// The invalid value that was provided.
        value: String,
        /// Description of valid values.
        valid_values: &'static str,
    },

    /// The requested operation is declared but not supported.
    #[error("{0} is not implemented")]
    Unimplemented(&'static str),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error occurred.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Report text could not be formatted.
    #[error("Formatting error: {0}")]
    Format(#[from] std::fmt::Error),
}

/// Coarse classification of an [`Error`] for boundary mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A referenced policy or dependency does not exist.
    NotFound,
    /// The operation conflicts with existing state.
    Conflict,
    /// The input was malformed.
    InvalidArgument,
    /// The operation is explicitly unsupported.
    Unimplemented,
    /// Infrastructure failure inside the engine or its storage.
    Internal,
}

impl ErrorKind {
    /// HTTP-equivalent status code for this kind of failure.
    #[must_use]
    pub fn status_code(self) -> u16 {
        match self {
            Self::NotFound => 404,
            Self::Conflict => 409,
            Self::InvalidArgument => 400,
            Self::Unimplemented => 501,
            Self::Internal => 500,
        }
    }
}

impl Error {
    /// Classify this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::PolicyNotFound(_) | Self::DependencyNotFound(_) => ErrorKind::NotFound,
            Self::DuplicateDependency { .. } => ErrorKind::Conflict,
            Self::InvalidArgument { .. } => ErrorKind::InvalidArgument,
            Self::Unimplemented(_) => ErrorKind::Unimplemented,
            Self::Config(_) | Self::Io(_) | Self::Json(_) | Self::Format(_) => {
                ErrorKind::Internal
            }
        }
    }
}

/// A specialized Result type for policy impact operations.
pub type Result<T> = std::result::Result<T, Error>;
