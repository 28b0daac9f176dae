use std::sync::Arc;

use thiserror::Error;
use time::OffsetDateTime;
use tracing::info;
use uuid::Uuid;

use crate::application::pagination::PageRequest;
use crate::application::repos::{RepoError, UsersRepo};
use crate::application::sessions::SessionStore;
use crate::domain::entities::{PublicProfile, UserRecord};
use crate::domain::types::UserRole;

const ADMIN_ONLY: &str = "Admin access required";

#[derive(Debug, Error)]
pub enum UserError {
    #[error("User not found")]
    NotFound,
    #[error("{0}")]
    Forbidden(&'static str),
    #[error("{0}")]
    Validation(String),
    #[error(transparent)]
    Repo(#[from] RepoError),
}

/// Fields an admin may change on an account.
#[derive(Debug, Clone, Copy, Default)]
pub struct AdminUserUpdate {
    pub role: Option<UserRole>,
    pub is_active: Option<bool>,
}

#[derive(Clone)]
pub struct UserService {
    users: Arc<dyn UsersRepo>,
    sessions: Arc<SessionStore>,
}

impl UserService {
    pub fn new(users: Arc<dyn UsersRepo>, sessions: Arc<SessionStore>) -> Self {
        Self { users, sessions }
    }

    pub async fn instructors(&self) -> Result<Vec<PublicProfile>, UserError> {
        let instructors = self
            .users
            .list_users(Some(UserRole::Instructor), PageRequest::unbounded())
            .await?;
        Ok(instructors
            .iter()
            .filter(|user| user.is_active)
            .map(PublicProfile::from)
            .collect())
    }

    pub async fn list(
        &self,
        actor: &UserRecord,
        role: Option<UserRole>,
        page: PageRequest,
    ) -> Result<Vec<UserRecord>, UserError> {
        if !actor.is_admin() {
            return Err(UserError::Forbidden(ADMIN_ONLY));
        }
        Ok(self.users.list_users(role, page).await?)
    }

    /// Change a user's role or activation; deactivation ends their sessions.
    pub async fn update(
        &self,
        actor: &UserRecord,
        id: Uuid,
        update: AdminUserUpdate,
    ) -> Result<UserRecord, UserError> {
        if !actor.is_admin() {
            return Err(UserError::Forbidden(ADMIN_ONLY));
        }
        if update.role.is_none() && update.is_active.is_none() {
            return Err(UserError::Validation(
                "Nothing to update: provide role or isActive".to_string(),
            ));
        }
        let mut user = self
            .users
            .find_user(id)
            .await?
            .ok_or(UserError::NotFound)?;
        if user.id == actor.id {
            let demotes = update.role.is_some_and(|role| role != UserRole::Admin);
            let deactivates = update.is_active == Some(false);
            if demotes || deactivates {
                return Err(UserError::Forbidden(
                    "Admins cannot demote or deactivate themselves",
                ));
            }
        }

        if let Some(role) = update.role {
            user.role = role;
        }
        if let Some(active) = update.is_active {
            user.is_active = active;
        }
        user.updated_at = OffsetDateTime::now_utc();
        let updated = self.users.update_user(&user).await?;

        if !updated.is_active {
            self.sessions.revoke_user(updated.id);
        }
        info!(
            target = "coursehub::users",
            user_id = %updated.id,
            role = updated.role.as_str(),
            is_active = updated.is_active,
            "user updated by admin"
        );
        Ok(updated)
    }
}
