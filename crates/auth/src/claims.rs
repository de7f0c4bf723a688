use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use catalog_core::UserId;

use crate::{Role, user::User};

/// Token claims model (transport-agnostic).
///
/// This is the minimal claim set the boundary consumes once a token has been
/// decoded/verified by whatever signing scheme is in use.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject / user identifier.
    pub sub: UserId,

    /// Role granted at issuance time.
    pub role: Role,

    /// Email at issuance time.
    pub email: String,

    /// Issued-at timestamp.
    pub issued_at: DateTime<Utc>,

    /// Expiration timestamp (fixed duration from issuance).
    pub expires_at: DateTime<Utc>,
}

impl Claims {
    /// Build claims for a user, expiring `ttl` after `now`.
    pub fn for_user(user: &User, now: DateTime<Utc>, ttl: chrono::Duration) -> Self {
        Self {
            sub: user.id,
            role: user.role,
            email: user.email.clone(),
            issued_at: now,
            expires_at: now + ttl,
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenValidationError {
    #[error("token has expired")]
    Expired,

    #[error("token not yet valid (issued_at is in the future)")]
    NotYetValid,

    #[error("invalid token time window (expires_at <= issued_at)")]
    InvalidTimeWindow,
}

/// Deterministically validate token claims.
///
/// Note: this validates the *claims* only. Signature verification/decoding is
/// intentionally outside this crate (see [`crate::TokenService`]).
pub fn validate_claims(claims: &Claims, now: DateTime<Utc>) -> Result<(), TokenValidationError> {
    if claims.expires_at <= claims.issued_at {
        return Err(TokenValidationError::InvalidTimeWindow);
    }
    if now < claims.issued_at {
        return Err(TokenValidationError::NotYetValid);
    }
    if now >= claims.expires_at {
        return Err(TokenValidationError::Expired);
    }
    Ok(())
}
