use async_trait::async_trait;
use uuid::Uuid;

use crate::application::pagination::PageRequest;
use crate::application::repos::{CreateUserParams, RepoError, UsersRepo};
use crate::domain::entities::UserRecord;
use crate::domain::types::UserRole;

use super::PostgresRepositories;
use super::util::{count_to_u64, map_sqlx_error};

const USER_COLUMNS: &str = "id, username, email, password_hash, first_name, last_name, role, \
    avatar, bio, website, is_active, email_verified, created_at, updated_at";

#[async_trait]
impl UsersRepo for PostgresRepositories {
    async fn list_users(
        &self,
        role: Option<UserRole>,
        page: PageRequest,
    ) -> Result<Vec<UserRecord>, RepoError> {
        let sql = format!(
            "SELECT {USER_COLUMNS} FROM users \
             WHERE ($1::user_role IS NULL OR role = $1) \
             ORDER BY seq LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, UserRecord>(&sql)
            .bind(role)
            .bind(page.sql_limit())
            .bind(page.sql_offset())
            .fetch_all(self.pool())
            .await
            .map_err(map_sqlx_error)
    }

    async fn find_user(&self, id: Uuid) -> Result<Option<UserRecord>, RepoError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, UserRecord>(&sql)
            .bind(id)
            .fetch_optional(self.pool())
            .await
            .map_err(map_sqlx_error)
    }

    async fn find_user_by_username(
        &self,
        username: &str,
    ) -> Result<Option<UserRecord>, RepoError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE username = $1");
        sqlx::query_as::<_, UserRecord>(&sql)
            .bind(username)
            .fetch_optional(self.pool())
            .await
            .map_err(map_sqlx_error)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<UserRecord>, RepoError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE LOWER(email) = LOWER($1)");
        sqlx::query_as::<_, UserRecord>(&sql)
            .bind(email)
            .fetch_optional(self.pool())
            .await
            .map_err(map_sqlx_error)
    }

    async fn create_user(&self, params: CreateUserParams) -> Result<UserRecord, RepoError> {
        let sql = format!(
            "INSERT INTO users (id, username, email, password_hash, first_name, last_name, role) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING {USER_COLUMNS}"
        );
        sqlx::query_as::<_, UserRecord>(&sql)
            .bind(Uuid::new_v4())
            .bind(params.username)
            .bind(params.email)
            .bind(params.password_hash)
            .bind(params.first_name)
            .bind(params.last_name)
            .bind(params.role)
            .fetch_one(self.pool())
            .await
            .map_err(map_sqlx_error)
    }

    async fn update_user(&self, user: &UserRecord) -> Result<UserRecord, RepoError> {
        let sql = format!(
            "UPDATE users SET username = $2, email = $3, password_hash = $4, first_name = $5, \
                 last_name = $6, role = $7, avatar = $8, bio = $9, website = $10, \
                 is_active = $11, email_verified = $12, updated_at = $13 \
             WHERE id = $1 \
             RETURNING {USER_COLUMNS}"
        );
        sqlx::query_as::<_, UserRecord>(&sql)
            .bind(user.id)
            .bind(&user.username)
            .bind(&user.email)
            .bind(&user.password_hash)
            .bind(&user.first_name)
            .bind(&user.last_name)
            .bind(user.role)
            .bind(&user.avatar)
            .bind(&user.bio)
            .bind(&user.website)
            .bind(user.is_active)
            .bind(user.email_verified)
            .bind(user.updated_at)
            .fetch_one(self.pool())
            .await
            .map_err(map_sqlx_error)
    }

    async fn count_users_by_role(&self) -> Result<Vec<(UserRole, u64)>, RepoError> {
        let rows: Vec<(UserRole, i64)> =
            sqlx::query_as("SELECT role, COUNT(*) FROM users GROUP BY role ORDER BY role")
                .fetch_all(self.pool())
                .await
                .map_err(map_sqlx_error)?;
        rows.into_iter()
            .map(|(role, count)| Ok((role, count_to_u64(count)?)))
            .collect()
    }
}
