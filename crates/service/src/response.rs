//! Response envelope.
//!
//! The uniform shape the boundary serializes: a success flag, an optional
//! human-readable message, the payload when there is one, and a stable
//! machine-readable code on failure.

use serde::Serialize;

use catalog_core::DomainError;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Envelope<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<&'static str>,
}

impl<T> Envelope<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            message: None,
            data: Some(data),
            code: None,
        }
    }

    pub fn failure(error: &DomainError) -> Self {
        Self {
            success: false,
            message: Some(error.to_string()),
            data: None,
            code: Some(error.code()),
        }
    }

    /// Wrap a domain result, folding either arm into the envelope.
    pub fn from_result(result: Result<T, DomainError>) -> Self {
        match result {
            Ok(data) => Self::ok(data),
            Err(err) => Self::failure(&err),
        }
    }
}
