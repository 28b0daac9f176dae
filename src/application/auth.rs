use std::sync::Arc;

use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use metrics::counter;
use thiserror::Error;
use time::OffsetDateTime;
use tracing::info;
use uuid::Uuid;

use crate::application::repos::{CreateUserParams, RepoError, UsersRepo, constraints};
use crate::application::sessions::SessionStore;
use crate::domain::entities::UserRecord;
use crate::domain::types::UserRole;

const MIN_PASSWORD_LEN: usize = 6;
const MAX_USERNAME_LEN: usize = 32;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("{0}")]
    Validation(String),
    #[error("Username already exists")]
    UsernameTaken,
    #[error("Email already registered")]
    EmailTaken,
    #[error("Invalid username or password")]
    InvalidCredentials,
    #[error("Cannot register as an admin")]
    RoleNotAllowed,
    #[error("password hashing failed: {0}")]
    Hashing(String),
    #[error(transparent)]
    Repo(#[from] RepoError),
}

#[derive(Debug, Clone)]
pub struct RegisterCommand {
    pub username: String,
    pub email: String,
    pub password: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub role: Option<UserRole>,
}

/// A user together with a freshly issued session token.
#[derive(Debug, Clone)]
pub struct SignedIn {
    pub user: UserRecord,
    pub token: String,
    pub expires_at: OffsetDateTime,
}

#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UsersRepo>,
    sessions: Arc<SessionStore>,
}

impl AuthService {
    pub fn new(users: Arc<dyn UsersRepo>, sessions: Arc<SessionStore>) -> Self {
        Self { users, sessions }
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    /// Self-service sign-up; only student and instructor accounts are allowed.
    pub async fn register(&self, command: RegisterCommand) -> Result<SignedIn, AuthError> {
        if command.role == Some(UserRole::Admin) {
            return Err(AuthError::RoleNotAllowed);
        }
        let user = self.create_user(command).await?;
        info!(
            target = "coursehub::auth",
            user_id = %user.id,
            role = user.role.as_str(),
            "user registered"
        );
        Ok(self.sign_in(user))
    }

    /// Create an account of any role; used by registration and operators.
    pub async fn create_user(&self, command: RegisterCommand) -> Result<UserRecord, AuthError> {
        let username = command.username.trim().to_string();
        let email = command.email.trim().to_lowercase();
        validate_username(&username)?;
        validate_email(&email)?;
        if command.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AuthError::Validation(format!(
                "Password must be at least {MIN_PASSWORD_LEN} characters"
            )));
        }

        if self.users.find_user_by_username(&username).await?.is_some() {
            return Err(AuthError::UsernameTaken);
        }
        if self.users.find_user_by_email(&email).await?.is_some() {
            return Err(AuthError::EmailTaken);
        }

        let password_hash = hash_password(&command.password)?;
        let params = CreateUserParams {
            username,
            email,
            password_hash,
            first_name: non_empty(command.first_name),
            last_name: non_empty(command.last_name),
            role: command.role.unwrap_or_default(),
        };

        self.users
            .create_user(params)
            .await
            .map_err(|err| match err {
                RepoError::Duplicate { constraint } if constraint == constraints::USERS_EMAIL => {
                    AuthError::EmailTaken
                }
                RepoError::Duplicate { .. } => AuthError::UsernameTaken,
                other => AuthError::Repo(other),
            })
    }

    /// Verify credentials; `login` may be a username or an email address.
    pub async fn login(&self, login: &str, password: &str) -> Result<SignedIn, AuthError> {
        let login = login.trim();
        let user = if login.contains('@') {
            self.users
                .find_user_by_email(&login.to_lowercase())
                .await?
        } else {
            self.users.find_user_by_username(login).await?
        };

        let Some(user) = user.filter(|user| user.is_active) else {
            counter!("coursehub_login_failures_total").increment(1);
            return Err(AuthError::InvalidCredentials);
        };
        if !verify_password(password, &user.password_hash) {
            counter!("coursehub_login_failures_total").increment(1);
            return Err(AuthError::InvalidCredentials);
        }

        Ok(self.sign_in(user))
    }

    pub fn logout(&self, token: &str) -> bool {
        self.sessions.revoke(token)
    }

    /// Resolve a session token to an active user, read fresh from the store.
    pub async fn authenticate(&self, token: &str) -> Result<Option<UserRecord>, AuthError> {
        let Some(user_id) = self.sessions.resolve(token) else {
            return Ok(None);
        };
        let user = self.users.find_user(user_id).await?;
        Ok(user.filter(|user| user.is_active))
    }

    /// Create the configured admin account unless the username already exists.
    pub async fn ensure_admin(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<Option<UserRecord>, AuthError> {
        if self.users.find_user_by_username(username).await?.is_some() {
            return Ok(None);
        }
        let user = self
            .create_user(RegisterCommand {
                username: username.to_string(),
                email: email.to_string(),
                password: password.to_string(),
                first_name: None,
                last_name: None,
                role: Some(UserRole::Admin),
            })
            .await?;
        info!(
            target = "coursehub::auth",
            user_id = %user.id,
            username = %user.username,
            "bootstrap admin created"
        );
        Ok(Some(user))
    }

    fn sign_in(&self, user: UserRecord) -> SignedIn {
        let issued = self.sessions.issue(user.id);
        SignedIn {
            user,
            token: issued.token,
            expires_at: issued.expires_at,
        }
    }
}

fn validate_username(username: &str) -> Result<(), AuthError> {
    let len = username.chars().count();
    if !(3..=MAX_USERNAME_LEN).contains(&len) {
        return Err(AuthError::Validation(format!(
            "Username must be between 3 and {MAX_USERNAME_LEN} characters"
        )));
    }
    if !username
        .chars()
        .all(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.'))
    {
        return Err(AuthError::Validation(
            "Username may only contain letters, digits, '_', '-' and '.'".to_string(),
        ));
    }
    Ok(())
}

fn validate_email(email: &str) -> Result<(), AuthError> {
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') => Ok(()),
        _ => Err(AuthError::Validation("Invalid email address".to_string())),
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::encode_b64(Uuid::new_v4().as_bytes())
        .map_err(|err| AuthError::Hashing(err.to_string()))?;
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| AuthError::Hashing(err.to_string()))
}

fn verify_password(password: &str, hash: &str) -> bool {
    match PasswordHash::new(hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_hash_round_trip() {
        let hash = hash_password("correct horse").expect("hash");
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("correct horse", &hash));
        assert!(!verify_password("wrong horse", &hash));
        assert!(!verify_password("correct horse", "not-a-phc-string"));
    }

    #[test]
    fn usernames_are_validated() {
        assert!(validate_username("ada_l").is_ok());
        assert!(validate_username("ab").is_err());
        assert!(validate_username("has space").is_err());
    }

    #[test]
    fn emails_need_a_domain() {
        assert!(validate_email("ada@example.com").is_ok());
        assert!(validate_email("ada@localhost").is_err());
        assert!(validate_email("@example.com").is_err());
    }
}
