//! Opaque credential services.
//!
//! Password hashing and token issuance are external collaborators with
//! explicit contracts, so the core stays independent of the concrete
//! hashing/signing scheme. Implementations live at the process boundary;
//! tests use deterministic fakes.

use std::sync::Arc;

use thiserror::Error;

use crate::Claims;

/// Failure inside a credential backend (hashing library, signer, key store).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CredentialError {
    #[error("credential backend failure: {0}")]
    Backend(String),

    #[error("token rejected: {0}")]
    InvalidToken(String),
}

impl CredentialError {
    pub fn backend(msg: impl Into<String>) -> Self {
        Self::Backend(msg.into())
    }

    pub fn invalid_token(msg: impl Into<String>) -> Self {
        Self::InvalidToken(msg.into())
    }
}

/// Credential backends are infrastructure: their failures surface as storage
/// errors, except token rejection, which is an authorization failure.
impl From<CredentialError> for catalog_core::DomainError {
    fn from(err: CredentialError) -> Self {
        match err {
            CredentialError::Backend(msg) => catalog_core::DomainError::Storage(msg),
            CredentialError::InvalidToken(_) => catalog_core::DomainError::Unauthorized,
        }
    }
}

/// `hash(plaintext) -> digest` / `verify(plaintext, digest) -> bool`.
///
/// The digest is opaque to the rest of the system and is never serialized
/// outward.
pub trait PasswordHasher: Send + Sync {
    fn hash(&self, plaintext: &str) -> Result<String, CredentialError>;

    fn verify(&self, plaintext: &str, digest: &str) -> Result<bool, CredentialError>;
}

/// `issue(claims) -> token` / `verify(token) -> claims`.
pub trait TokenService: Send + Sync {
    fn issue(&self, claims: &Claims) -> Result<String, CredentialError>;

    fn verify(&self, token: &str) -> Result<Claims, CredentialError>;
}

impl<H> PasswordHasher for Arc<H>
where
    H: PasswordHasher + ?Sized,
{
    fn hash(&self, plaintext: &str) -> Result<String, CredentialError> {
        (**self).hash(plaintext)
    }

    fn verify(&self, plaintext: &str, digest: &str) -> Result<bool, CredentialError> {
        (**self).verify(plaintext, digest)
    }
}

impl<S> TokenService for Arc<S>
where
    S: TokenService + ?Sized,
{
    fn issue(&self, claims: &Claims) -> Result<String, CredentialError> {
        (**self).issue(claims)
    }

    fn verify(&self, token: &str) -> Result<Claims, CredentialError> {
        (**self).verify(token)
    }
}
