//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error taxonomy.
///
/// Keep this focused on deterministic, business/domain failures (validation,
/// missing parents, name collisions, access control). Store availability is the
/// one infrastructure concern surfaced here (`Storage`), because cascades report
/// it to callers without compensation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A value failed validation (malformed or missing required field).
    #[error("validation failed: {0}")]
    Validation(String),

    /// A referenced entity, parent, or target is absent.
    #[error("{0} not found")]
    NotFound(String),

    /// A unique-name collision on create/update.
    #[error("duplicate name: {0}")]
    DuplicateName(String),

    /// A duplicate identity (username/email) on signup.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Role/ownership check failed.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Credential mismatch.
    #[error("unauthorized")]
    Unauthorized,

    /// Underlying store failure. Cascades are not transactional: earlier steps
    /// stay committed when this is returned partway through.
    #[error("storage failure: {0}")]
    Storage(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound(resource.into())
    }

    pub fn duplicate_name(name: impl Into<String>) -> Self {
        Self::DuplicateName(name.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::Forbidden(msg.into())
    }

    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    /// Stable machine-readable code for the response envelope.
    pub fn code(&self) -> &'static str {
        match self {
            DomainError::Validation(_) => "validation_error",
            DomainError::NotFound(_) => "not_found",
            DomainError::DuplicateName(_) => "duplicate_name",
            DomainError::Conflict(_) => "conflict",
            DomainError::Forbidden(_) => "forbidden",
            DomainError::Unauthorized => "unauthorized",
            DomainError::Storage(_) => "storage_error",
        }
    }
}
