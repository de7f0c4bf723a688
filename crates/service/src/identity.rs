//! Signup, signin, and token authentication.
//!
//! The identity service owns the credential flow: plaintext passwords come
//! in, get hashed or verified through the [`PasswordHasher`] collaborator,
//! and successful flows leave with a token from the [`TokenService`]. Tokens
//! are authenticated back into an [`Actor`] against the *current* user
//! record, so a deactivated user's outstanding tokens stop working at once.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use catalog_auth::{
    Actor, AuthConfig, Claims, PasswordHasher, Role, TokenService, User, UserFilter,
    validate_claims,
};
use catalog_core::{DomainError, DomainResult};
use catalog_store::Collection;

use crate::users::UserView;

const MIN_PASSWORD_LEN: usize = 6;

pub(crate) fn valid_password(password: &str) -> DomainResult<()> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(DomainError::validation(format!(
            "password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}

/// Registration payload. Role defaults to `auxiliar` when absent.
#[derive(Debug, Clone, Deserialize)]
pub struct SignupRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub role: Option<Role>,
}

/// Signin payload. `identifier` is a username or an email.
#[derive(Debug, Clone, Deserialize)]
pub struct SigninRequest {
    pub identifier: String,
    pub password: String,
}

/// Token plus the digest-free record it was issued for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserView,
}

/// Identity flows over one user collection plus credential collaborators.
#[derive(Debug)]
pub struct IdentityService<U, H, T> {
    users: U,
    hasher: H,
    tokens: T,
    config: AuthConfig,
}

impl<U, H, T> IdentityService<U, H, T>
where
    U: Collection<User>,
    H: PasswordHasher,
    T: TokenService,
{
    pub fn new(users: U, hasher: H, tokens: T, config: AuthConfig) -> Self {
        Self {
            users,
            hasher,
            tokens,
            config,
        }
    }

    /// Register a new user and sign them in.
    pub fn signup(&self, request: SignupRequest) -> DomainResult<AuthResponse> {
        valid_password(&request.password)?;
        let digest = self.hasher.hash(&request.password)?;
        let role = request.role.unwrap_or_default();
        let user = User::create(&request.username, &request.email, digest, role, Utc::now())?;

        // Unique username/email indexes surface as a conflict here.
        let user = self.users.insert(user)?;
        tracing::info!(user = %user.id, role = %user.role, "user registered");
        self.issue(user)
    }

    /// Authenticate by username or email plus password.
    ///
    /// Unknown identifiers are `not_found`; a wrong password or a deactivated
    /// account is `unauthorized`, so a caller can tell "no such user" apart
    /// from "bad credentials" the way the API contract requires.
    pub fn signin(&self, request: SigninRequest) -> DomainResult<AuthResponse> {
        let identifier = request.identifier.trim();
        if identifier.is_empty() || request.password.is_empty() {
            return Err(DomainError::validation(
                "identifier and password are required",
            ));
        }

        let user = self
            .users
            .find_one(&UserFilter::by_identifier(identifier))?
            .ok_or_else(|| DomainError::not_found("user"))?;
        if !user.active {
            return Err(DomainError::Unauthorized);
        }
        if !self.hasher.verify(&request.password, &user.password_digest)? {
            return Err(DomainError::Unauthorized);
        }

        tracing::info!(user = %user.id, "user signed in");
        self.issue(user)
    }

    /// Resolve a bearer token into an acting identity.
    ///
    /// The role comes from the stored record, not the token, so a demotion
    /// takes effect before the token expires.
    pub fn authenticate(&self, token: &str) -> DomainResult<Actor> {
        let claims = self.tokens.verify(token)?;
        validate_claims(&claims, Utc::now()).map_err(|_| DomainError::Unauthorized)?;

        let user = self
            .users
            .find_by_id(claims.sub.into())?
            .ok_or(DomainError::Unauthorized)?;
        if !user.active {
            return Err(DomainError::Unauthorized);
        }
        Ok(Actor::new(user.id, user.role))
    }

    fn issue(&self, user: User) -> DomainResult<AuthResponse> {
        let claims = Claims::for_user(&user, Utc::now(), self.config.token_ttl);
        let token = self.tokens.issue(&claims)?;
        Ok(AuthResponse {
            token,
            user: UserView::of(&user),
        })
    }
}


#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use catalog_store::MemoryCollection;

    use super::testsupport::{PlainHasher, PlainTokens};
    use super::*;

    type MemIdentity = IdentityService<Arc<MemoryCollection<User>>, PlainHasher, PlainTokens>;

    fn identity() -> MemIdentity {
        IdentityService::new(
            Arc::new(MemoryCollection::new()),
            PlainHasher,
            PlainTokens,
            AuthConfig::default(),
        )
    }

    fn signup(username: &str) -> SignupRequest {
        SignupRequest {
            username: username.to_string(),
            email: format!("{username}@example.com"),
            password: "secret99".to_string(),
            role: None,
        }
    }

    #[test]
    fn signup_defaults_to_auxiliar() {
        let svc = identity();
        let response = svc.signup(signup("ana")).unwrap();
        assert_eq!(response.user.role, Role::Auxiliar);
        assert!(!response.token.is_empty());
    }

    #[test]
    fn signup_accepts_explicit_role() {
        let svc = identity();
        let response = svc
            .signup(SignupRequest {
                role: Some(Role::Coordinador),
                ..signup("carla")
            })
            .unwrap();
        assert_eq!(response.user.role, Role::Coordinador);
    }

    #[test]
    fn signup_rejects_short_password() {
        let svc = identity();
        let err = svc
            .signup(SignupRequest {
                password: "abc".to_string(),
                ..signup("ana")
            })
            .unwrap_err();
        assert_eq!(err.code(), "validation_error");
    }

    #[test]
    fn duplicate_identity_conflicts() {
        let svc = identity();
        svc.signup(signup("ana")).unwrap();

        let err = svc.signup(signup("ana")).unwrap_err();
        assert_eq!(err.code(), "conflict");

        // Same email under a different username collides too.
        let err = svc
            .signup(SignupRequest {
                username: "ana2".to_string(),
                email: "ana@example.com".to_string(),
                password: "secret99".to_string(),
                role: None,
            })
            .unwrap_err();
        assert_eq!(err.code(), "conflict");
    }

    #[test]
    fn signin_by_username_or_email() {
        let svc = identity();
        svc.signup(signup("ana")).unwrap();

        for identifier in ["ana", "ana@example.com", "ANA@example.com"] {
            let response = svc
                .signin(SigninRequest {
                    identifier: identifier.to_string(),
                    password: "secret99".to_string(),
                })
                .unwrap();
            assert_eq!(response.user.username, "ana");
        }
    }

    #[test]
    fn signin_distinguishes_unknown_from_wrong_password() {
        let svc = identity();
        svc.signup(signup("ana")).unwrap();

        let err = svc
            .signin(SigninRequest {
                identifier: "nobody".to_string(),
                password: "secret99".to_string(),
            })
            .unwrap_err();
        assert_eq!(err.code(), "not_found");

        let err = svc
            .signin(SigninRequest {
                identifier: "ana".to_string(),
                password: "wrong-pass".to_string(),
            })
            .unwrap_err();
        assert_eq!(err.code(), "unauthorized");
    }

    #[test]
    fn signin_requires_both_fields() {
        let svc = identity();
        let err = svc
            .signin(SigninRequest {
                identifier: "  ".to_string(),
                password: "secret99".to_string(),
            })
            .unwrap_err();
        assert_eq!(err.code(), "validation_error");
    }

    #[test]
    fn deactivated_user_cannot_sign_in() {
        let svc = identity();
        let response = svc.signup(signup("ana")).unwrap();

        let mut stored = svc
            .users
            .find_by_id(response.user.id.into())
            .unwrap()
            .unwrap();
        stored.set_active(false, Utc::now());
        svc.users.replace(stored).unwrap();

        let err = svc
            .signin(SigninRequest {
                identifier: "ana".to_string(),
                password: "secret99".to_string(),
            })
            .unwrap_err();
        assert_eq!(err.code(), "unauthorized");
    }

    #[test]
    fn token_authenticates_back_to_actor() {
        let svc = identity();
        let response = svc.signup(signup("ana")).unwrap();

        let actor = svc.authenticate(&response.token).unwrap();
        assert_eq!(actor.id, response.user.id);
        assert_eq!(actor.role, Role::Auxiliar);
    }

    #[test]
    fn garbage_token_is_unauthorized() {
        let svc = identity();
        let err = svc.authenticate("not-a-token").unwrap_err();
        assert_eq!(err.code(), "unauthorized");
    }

    #[test]
    fn deactivated_user_token_stops_working() {
        let svc = identity();
        let response = svc.signup(signup("ana")).unwrap();

        let mut stored = svc
            .users
            .find_by_id(response.user.id.into())
            .unwrap()
            .unwrap();
        stored.set_active(false, Utc::now());
        svc.users.replace(stored).unwrap();

        let err = svc.authenticate(&response.token).unwrap_err();
        assert_eq!(err.code(), "unauthorized");
    }

    #[test]
    fn expired_claims_rejected() {
        let svc = identity();
        let response = svc.signup(signup("ana")).unwrap();
        let user = svc
            .users
            .find_by_id(response.user.id.into())
            .unwrap()
            .unwrap();

        let stale = Claims::for_user(&user, Utc::now() - chrono::Duration::hours(48), AuthConfig::default().token_ttl);
        let token = serde_json::to_string(&stale).unwrap();

        let err = svc.authenticate(&token).unwrap_err();
        assert_eq!(err.code(), "unauthorized");
    }
}
