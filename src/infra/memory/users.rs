use std::collections::BTreeMap;

use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::application::pagination::PageRequest;
use crate::application::repos::{CreateUserParams, RepoError, UsersRepo, constraints};
use crate::domain::entities::UserRecord;
use crate::domain::types::UserRole;

use super::MemoryRepositories;
use super::lock::{read_table, write_table};
use super::{page_slice, replace_row};

const TABLE: &str = "users";

#[async_trait]
impl UsersRepo for MemoryRepositories {
    async fn list_users(
        &self,
        role: Option<UserRole>,
        page: PageRequest,
    ) -> Result<Vec<UserRecord>, RepoError> {
        let users = read_table(&self.users, TABLE);
        Ok(page_slice(
            users
                .iter()
                .filter(|user| role.is_none_or(|role| user.role == role))
                .cloned(),
            page,
        ))
    }

    async fn find_user(&self, id: Uuid) -> Result<Option<UserRecord>, RepoError> {
        let users = read_table(&self.users, TABLE);
        Ok(users.iter().find(|user| user.id == id).cloned())
    }

    async fn find_user_by_username(
        &self,
        username: &str,
    ) -> Result<Option<UserRecord>, RepoError> {
        let users = read_table(&self.users, TABLE);
        Ok(users.iter().find(|user| user.username == username).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<UserRecord>, RepoError> {
        let users = read_table(&self.users, TABLE);
        Ok(users
            .iter()
            .find(|user| user.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn create_user(&self, params: CreateUserParams) -> Result<UserRecord, RepoError> {
        let mut users = write_table(&self.users, TABLE);
        if users.iter().any(|user| user.username == params.username) {
            return Err(RepoError::duplicate(constraints::USERS_USERNAME));
        }
        if users
            .iter()
            .any(|user| user.email.eq_ignore_ascii_case(&params.email))
        {
            return Err(RepoError::duplicate(constraints::USERS_EMAIL));
        }

        let now = OffsetDateTime::now_utc();
        let user = UserRecord {
            id: Uuid::new_v4(),
            username: params.username,
            email: params.email,
            password_hash: params.password_hash,
            first_name: params.first_name,
            last_name: params.last_name,
            role: params.role,
            avatar: None,
            bio: None,
            website: None,
            is_active: true,
            email_verified: false,
            created_at: now,
            updated_at: now,
        };
        users.push(user.clone());
        Ok(user)
    }

    async fn update_user(&self, user: &UserRecord) -> Result<UserRecord, RepoError> {
        let mut users = write_table(&self.users, TABLE);
        let clash = |other: &UserRecord| other.id != user.id;
        if users
            .iter()
            .any(|other| clash(other) && other.username == user.username)
        {
            return Err(RepoError::duplicate(constraints::USERS_USERNAME));
        }
        if users
            .iter()
            .any(|other| clash(other) && other.email.eq_ignore_ascii_case(&user.email))
        {
            return Err(RepoError::duplicate(constraints::USERS_EMAIL));
        }
        replace_row(&mut users, user, |row| row.id)
    }

    async fn count_users_by_role(&self) -> Result<Vec<(UserRole, u64)>, RepoError> {
        let users = read_table(&self.users, TABLE);
        let mut counts: BTreeMap<UserRole, u64> = BTreeMap::new();
        for user in users.iter() {
            *counts.entry(user.role).or_default() += 1;
        }
        Ok(counts.into_iter().collect())
    }
}
