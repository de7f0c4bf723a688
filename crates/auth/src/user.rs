//! Stored user record.
//!
//! Users live in their own collection with unique `username` and `email`
//! indexes. The password digest is part of the stored document but is never
//! serialized outward; read responses go through digest-free views in the
//! service layer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use catalog_core::{DomainError, DomainResult, Entity, Timestamps, UserId};
use catalog_store::Document;

use crate::Role;

/// A user identity with role-based access.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    /// Stored lowercased; uniqueness is case-insensitive.
    pub email: String,
    /// Opaque digest produced by the [`crate::PasswordHasher`] collaborator.
    #[serde(skip_serializing, default)]
    pub password_digest: String,
    pub role: Role,
    pub active: bool,
    #[serde(flatten)]
    pub timestamps: Timestamps,
}

impl User {
    /// Validate and construct a new user record.
    ///
    /// Username and email are trimmed; email is lowercased. The digest must
    /// already be hashed by the caller.
    pub fn create(
        username: &str,
        email: &str,
        password_digest: String,
        role: Role,
        now: DateTime<Utc>,
    ) -> DomainResult<Self> {
        let username = username.trim();
        if username.is_empty() {
            return Err(DomainError::validation("username is required"));
        }

        let email = email.trim().to_lowercase();
        if email.is_empty() || !email.contains('@') {
            return Err(DomainError::validation("invalid email format"));
        }

        if password_digest.is_empty() {
            return Err(DomainError::validation("password digest is required"));
        }

        Ok(Self {
            id: UserId::new(),
            username: username.to_string(),
            email,
            password_digest,
            role,
            active: true,
            timestamps: Timestamps::at(now),
        })
    }

    pub fn set_username(&mut self, username: &str, now: DateTime<Utc>) -> DomainResult<()> {
        let username = username.trim();
        if username.is_empty() {
            return Err(DomainError::validation("username is required"));
        }
        self.username = username.to_string();
        self.timestamps.touch(now);
        Ok(())
    }

    pub fn set_email(&mut self, email: &str, now: DateTime<Utc>) -> DomainResult<()> {
        let email = email.trim().to_lowercase();
        if email.is_empty() || !email.contains('@') {
            return Err(DomainError::validation("invalid email format"));
        }
        self.email = email;
        self.timestamps.touch(now);
        Ok(())
    }

    pub fn set_role(&mut self, role: Role, now: DateTime<Utc>) {
        self.role = role;
        self.timestamps.touch(now);
    }

    /// Replace the stored digest. The caller hashes the new password first.
    pub fn set_password_digest(&mut self, digest: String, now: DateTime<Utc>) -> DomainResult<()> {
        if digest.is_empty() {
            return Err(DomainError::validation("password digest is required"));
        }
        self.password_digest = digest;
        self.timestamps.touch(now);
        Ok(())
    }

    pub fn set_active(&mut self, active: bool, now: DateTime<Utc>) {
        self.active = active;
        self.timestamps.touch(now);
    }
}

impl Entity for User {
    type Id = UserId;

    fn id(&self) -> &UserId {
        &self.id
    }
}

/// Filter over the user collection.
#[derive(Debug, Clone, Default)]
pub struct UserFilter {
    pub id: Option<UserId>,
    /// Matches `username == identifier` or `email == lowercase(identifier)`.
    pub identifier: Option<String>,
    /// When set, only documents with `active != false`.
    pub only_active: bool,
}

impl UserFilter {
    /// Everything, including deactivated users.
    pub fn all() -> Self {
        Self::default()
    }

    /// Active users only (the default visibility).
    pub fn active() -> Self {
        Self {
            only_active: true,
            ..Self::default()
        }
    }

    /// A single user by id, regardless of active flag.
    pub fn by_id(id: UserId) -> Self {
        Self {
            id: Some(id),
            ..Self::default()
        }
    }

    /// Lookup by signin identifier (username or email).
    pub fn by_identifier(identifier: impl Into<String>) -> Self {
        Self {
            identifier: Some(identifier.into()),
            ..Self::default()
        }
    }

}

/// Partial updates applied through `update_many`.
#[derive(Debug, Clone)]
pub enum UserPatch {
    Deactivate { at: DateTime<Utc> },
    Activate { at: DateTime<Utc> },
}

impl Document for User {
    type Filter = UserFilter;
    type Patch = UserPatch;

    fn id(&self) -> Uuid {
        self.id.into()
    }

    fn matches(&self, filter: &UserFilter) -> bool {
        if let Some(id) = filter.id
            && self.id != id
        {
            return false;
        }
        if let Some(identifier) = &filter.identifier
            && self.username != *identifier
            && self.email != identifier.to_lowercase()
        {
            return false;
        }
        if filter.only_active && !self.active {
            return false;
        }
        true
    }

    fn apply(&mut self, patch: &UserPatch) -> bool {
        let (target, at) = match patch {
            UserPatch::Deactivate { at } => (false, *at),
            UserPatch::Activate { at } => (true, *at),
        };
        if self.active == target {
            return false;
        }
        self.active = target;
        self.timestamps.touch(at);
        true
    }

    fn unique_keys(&self) -> Vec<(&'static str, String)> {
        vec![
            ("username", self.username.clone()),
            ("email", self.email.clone()),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog_store::{Collection, MemoryCollection, StoreError};

    fn user(username: &str, email: &str) -> User {
        User::create(username, email, "digest".to_string(), Role::Auxiliar, Utc::now()).unwrap()
    }

    #[test]
    fn create_normalizes_identity() {
        let u = User::create(
            "  Ana  ",
            "  Ana@Example.COM ",
            "digest".to_string(),
            Role::Coordinador,
            Utc::now(),
        )
        .unwrap();
        assert_eq!(u.username, "Ana");
        assert_eq!(u.email, "ana@example.com");
        assert!(u.active);
    }

    #[test]
    fn create_rejects_malformed_email() {
        let err =
            User::create("ana", "not-an-email", "d".to_string(), Role::Auxiliar, Utc::now())
                .unwrap_err();
        assert_eq!(err.code(), "validation_error");
    }

    #[test]
    fn username_and_email_are_unique_indexes() {
        let coll = MemoryCollection::new();
        coll.insert(user("ana", "ana@example.com")).unwrap();

        let err = coll.insert(user("ana", "other@example.com")).unwrap_err();
        assert!(matches!(err, StoreError::UniqueViolation { index: "username", .. }));

        let err = coll.insert(user("other", "ANA@example.com")).unwrap_err();
        assert!(matches!(err, StoreError::UniqueViolation { index: "email", .. }));
    }

    #[test]
    fn identifier_filter_matches_username_or_email() {
        let u = user("ana", "ana@example.com");
        assert!(u.matches(&UserFilter::by_identifier("ana")));
        assert!(u.matches(&UserFilter::by_identifier("Ana@Example.com")));
        assert!(!u.matches(&UserFilter::by_identifier("bob")));
    }

    #[test]
    fn active_filter_hides_deactivated_users() {
        let mut u = user("ana", "ana@example.com");
        assert!(u.matches(&UserFilter::active()));

        assert!(u.apply(&UserPatch::Deactivate { at: Utc::now() }));
        assert!(!u.matches(&UserFilter::active()));
        assert!(u.matches(&UserFilter::all()));

        // Idempotent: a second deactivation changes nothing.
        assert!(!u.apply(&UserPatch::Deactivate { at: Utc::now() }));
    }

    #[test]
    fn digest_never_serializes() {
        let u = user("ana", "ana@example.com");
        let json = serde_json::to_value(&u).unwrap();
        assert!(json.get("password_digest").is_none());
        assert!(json.get("username").is_some());
    }
}
