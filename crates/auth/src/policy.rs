//! Access policy: pure decision functions.
//!
//! Every role check in the system goes through this module instead of being
//! scattered as inline conditionals in the service layer. Decisions are
//! tagged (`Allow` / `Deny` / `Redact`) so read paths can keep a response
//! while still dropping fields.
//!
//! - No IO
//! - No panics
//! - No business logic beyond the role rules themselves

use serde::{Deserialize, Serialize};

use catalog_core::{DomainError, DomainResult, UserId};

use crate::Role;

/// The authenticated actor a decision is made for.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub id: UserId,
    pub role: Role,
}

impl Actor {
    pub fn new(id: UserId, role: Role) -> Self {
        Self { id, role }
    }
}

/// The user record an operation targets.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct UserTarget {
    pub id: UserId,
    pub role: Role,
}

/// Operations on the catalog hierarchy (categories/subcategories/products).
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum CatalogAction {
    /// List / get-by-id. Unrestricted by role, but subject to redaction.
    Read,
    /// Create, update, soft delete, reactivate.
    Mutate,
    /// Permanent removal (cascading).
    HardDelete,
}

/// Operations on user records.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum UserAction {
    Read,
    Update,
    Delete,
}

/// A field dropped from an otherwise-permitted read response.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RedactedField {
    /// Product creator back-reference; hidden from `auxiliar` readers.
    CreatedBy,
}

/// Outcome of a policy check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Allow,
    /// Permitted, but the listed fields must be absent from the response.
    Redact(Vec<RedactedField>),
    Deny,
}

impl Decision {
    /// Convert a decision into a domain result, keeping the redaction set.
    ///
    /// `what` names the denied operation in the error message.
    pub fn into_result(self, what: &str) -> DomainResult<Vec<RedactedField>> {
        match self {
            Decision::Allow => Ok(Vec::new()),
            Decision::Redact(fields) => Ok(fields),
            Decision::Deny => Err(DomainError::forbidden(what.to_string())),
        }
    }

    pub fn is_denied(&self) -> bool {
        matches!(self, Decision::Deny)
    }

    pub fn redacts(&self, field: RedactedField) -> bool {
        matches!(self, Decision::Redact(fields) if fields.contains(&field))
    }
}

/// Result-set scope for user listing.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ListScope {
    All,
    /// `auxiliar` actors only ever see their own record.
    SelfOnly,
}

/// Authorize a catalog operation.
///
/// Reads are open to every role; `auxiliar` readers get the product creator
/// reference redacted. Mutations require `admin` or `coordinador`; permanent
/// deletion is `admin` only.
pub fn authorize_catalog(actor: &Actor, action: CatalogAction) -> Decision {
    match action {
        CatalogAction::Read => {
            if actor.role == Role::Auxiliar {
                Decision::Redact(vec![RedactedField::CreatedBy])
            } else {
                Decision::Allow
            }
        }
        CatalogAction::Mutate => {
            if actor.role >= Role::Coordinador {
                Decision::Allow
            } else {
                deny(actor, "catalog mutation")
            }
        }
        CatalogAction::HardDelete => {
            if actor.role == Role::Admin {
                Decision::Allow
            } else {
                deny(actor, "catalog hard delete")
            }
        }
    }
}

/// Authorize an operation against a specific user record.
///
/// Self access is always permitted for read/update. Beyond self:
/// - read requires actor role >= target role (`coordinador` sees non-admins,
///   never admins)
/// - update requires a strictly higher role, or `admin`
/// - delete is `admin` only
pub fn authorize_user(actor: &Actor, action: UserAction, target: &UserTarget) -> Decision {
    match action {
        UserAction::Read => {
            if actor.id == target.id || actor.role == Role::Admin {
                Decision::Allow
            } else if actor.role == Role::Auxiliar {
                deny(actor, "reading another user")
            } else if actor.role >= target.role {
                Decision::Allow
            } else {
                deny(actor, "reading an admin user")
            }
        }
        UserAction::Update => {
            if actor.id == target.id || actor.role == Role::Admin {
                Decision::Allow
            } else if actor.role > target.role {
                Decision::Allow
            } else {
                deny(actor, "updating another user")
            }
        }
        UserAction::Delete => {
            if actor.role == Role::Admin {
                Decision::Allow
            } else {
                deny(actor, "deleting a user")
            }
        }
    }
}

/// How wide a user listing may range for this actor.
pub fn user_list_scope(actor: &Actor) -> ListScope {
    if actor.role == Role::Auxiliar {
        ListScope::SelfOnly
    } else {
        ListScope::All
    }
}

fn deny(actor: &Actor, what: &str) -> Decision {
    tracing::debug!(actor = %actor.id, role = %actor.role, what, "access denied");
    Decision::Deny
}
