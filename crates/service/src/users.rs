//! User directory operations.
//!
//! Reads and writes against stored user records, behind the user access
//! policy. Responses are digest-free [`UserView`]s. Password changes arrive
//! as plaintext and are hashed here through the [`PasswordHasher`]
//! collaborator before they touch the record.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use catalog_auth::{
    Actor, ListScope, PasswordHasher, Role, User, UserAction, UserFilter, UserTarget,
    authorize_user, user_list_scope,
};
use catalog_core::{DomainError, DomainResult, Timestamps, UserId};
use catalog_domain::DeleteMode;
use catalog_store::Collection;

use crate::identity::valid_password;
use crate::service::newest_first;

/// Partial update: only supplied fields change. `role` may only be supplied
/// by an admin actor.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserUpdate {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<Role>,
}

/// Digest-free user record for responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserView {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub role: Role,
    pub active: bool,
    #[serde(flatten)]
    pub timestamps: Timestamps,
}

impl UserView {
    pub(crate) fn of(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            role: user.role,
            active: user.active,
            timestamps: user.timestamps,
        }
    }
}

/// User record management over one user collection.
#[derive(Debug)]
pub struct UserDirectory<U, H> {
    users: U,
    hasher: H,
}

impl<U, H> UserDirectory<U, H>
where
    U: Collection<User>,
    H: PasswordHasher,
{
    pub fn new(users: U, hasher: H) -> Self {
        Self { users, hasher }
    }

    /// List users, newest first. An `auxiliar` actor only ever sees their own
    /// record, whatever the flags say; wider listings still drop every record
    /// the actor could not read individually, so a `coordinador` never sees
    /// admin users.
    pub fn list_users(
        &self,
        actor: &Actor,
        include_inactive: bool,
    ) -> DomainResult<Vec<UserView>> {
        let filter = match (user_list_scope(actor), include_inactive) {
            (ListScope::SelfOnly, _) => UserFilter::by_id(actor.id),
            (ListScope::All, true) => UserFilter::all(),
            (ListScope::All, false) => UserFilter::active(),
        };
        let mut users = self.users.find(&filter)?;
        users.retain(|u| !authorize_user(actor, UserAction::Read, &target(u)).is_denied());
        newest_first(&mut users, |u| u.timestamps.created_at);
        Ok(users.iter().map(UserView::of).collect())
    }

    pub fn get_user(&self, actor: &Actor, id: UserId) -> DomainResult<UserView> {
        let user = self.fetch(id)?;
        authorize_user(actor, UserAction::Read, &target(&user)).into_result("get user")?;
        Ok(UserView::of(&user))
    }

    pub fn update_user(
        &self,
        actor: &Actor,
        id: UserId,
        update: UserUpdate,
    ) -> DomainResult<UserView> {
        let mut user = self.fetch(id)?;
        authorize_user(actor, UserAction::Update, &target(&user)).into_result("update user")?;

        let now = Utc::now();
        if let Some(username) = &update.username {
            user.set_username(username, now)?;
        }
        if let Some(email) = &update.email {
            user.set_email(email, now)?;
        }
        if let Some(password) = &update.password {
            valid_password(password)?;
            user.set_password_digest(self.hasher.hash(password)?, now)?;
        }
        if let Some(role) = update.role {
            // Role assignment is an admin privilege even on one's own record.
            if actor.role != Role::Admin {
                return Err(DomainError::forbidden("changing a user role"));
            }
            user.set_role(role, now);
        }

        let user = self
            .users
            .replace(user)?
            .ok_or_else(|| DomainError::not_found("user"))?;
        Ok(UserView::of(&user))
    }

    /// Delete a user, soft by default. Both modes are admin-only.
    pub fn delete_user(
        &self,
        actor: &Actor,
        id: UserId,
        mode: DeleteMode,
    ) -> DomainResult<UserView> {
        let user = self.fetch(id)?;
        authorize_user(actor, UserAction::Delete, &target(&user)).into_result("delete user")?;

        match mode {
            DeleteMode::Soft => {
                let mut user = user;
                user.set_active(false, Utc::now());
                let user = self
                    .users
                    .replace(user)?
                    .ok_or_else(|| DomainError::not_found("user"))?;
                Ok(UserView::of(&user))
            }
            DeleteMode::Hard => {
                let removed = self
                    .users
                    .delete_by_id(id.into())?
                    .ok_or_else(|| DomainError::not_found("user"))?;
                Ok(UserView::of(&removed))
            }
        }
    }

    /// Restore a deactivated user. Admin-only, same as delete.
    pub fn reactivate_user(&self, actor: &Actor, id: UserId) -> DomainResult<UserView> {
        let mut user = self.fetch(id)?;
        authorize_user(actor, UserAction::Delete, &target(&user))
            .into_result("reactivate user")?;

        user.set_active(true, Utc::now());
        let user = self
            .users
            .replace(user)?
            .ok_or_else(|| DomainError::not_found("user"))?;
        Ok(UserView::of(&user))
    }

    fn fetch(&self, id: UserId) -> DomainResult<User> {
        self.users
            .find_by_id(id.into())?
            .ok_or_else(|| DomainError::not_found("user"))
    }
}

fn target(user: &User) -> UserTarget {
    UserTarget {
        id: user.id,
        role: user.role,
    }
}
