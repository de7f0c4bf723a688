//! `catalog-auth` — roles, access policy, and identity boundary objects.
//!
//! This crate is intentionally decoupled from HTTP and from concrete hashing or
//! token-signing schemes: those arrive through the [`credentials`] contracts.

pub mod claims;
pub mod config;
pub mod credentials;
pub mod policy;
pub mod roles;
pub mod user;

pub use claims::{Claims, TokenValidationError, validate_claims};
pub use config::AuthConfig;
pub use credentials::{CredentialError, PasswordHasher, TokenService};
pub use policy::{
    Actor, CatalogAction, Decision, ListScope, RedactedField, UserAction, UserTarget,
    authorize_catalog, authorize_user, user_list_scope,
};
pub use roles::Role;
pub use user::{User, UserFilter, UserPatch};
