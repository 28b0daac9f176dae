//! In-process repository backend.
//!
//! Each entity lives in its own insertion-ordered table behind a
//! `std::sync::RwLock`. Lookups are linear scans. Uniqueness checks and the
//! insert they guard happen under one write guard, so concurrent duplicates
//! cannot slip through. Guards are never held across an `.await`.

mod blog;
mod catalog;
mod learning;
mod lock;
#[cfg(test)]
mod tests;
mod users;

use std::sync::RwLock;

use async_trait::async_trait;
use uuid::Uuid;

use crate::application::pagination::PageRequest;
use crate::application::repos::{HealthRepo, RepoError};
use crate::domain::entities::{
    BlogPostRecord, CategoryRecord, CommentRecord, CourseRecord, EnrollmentRecord, LessonRecord,
    PaymentRecord, ReviewRecord, UserRecord, WishlistRecord,
};

#[derive(Debug, Default)]
pub struct MemoryRepositories {
    users: RwLock<Vec<UserRecord>>,
    categories: RwLock<Vec<CategoryRecord>>,
    courses: RwLock<Vec<CourseRecord>>,
    lessons: RwLock<Vec<LessonRecord>>,
    enrollments: RwLock<Vec<EnrollmentRecord>>,
    reviews: RwLock<Vec<ReviewRecord>>,
    payments: RwLock<Vec<PaymentRecord>>,
    blog_posts: RwLock<Vec<BlogPostRecord>>,
    comments: RwLock<Vec<CommentRecord>>,
    wishlist: RwLock<Vec<WishlistRecord>>,
}

impl MemoryRepositories {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl HealthRepo for MemoryRepositories {
    async fn health_check(&self) -> Result<(), RepoError> {
        Ok(())
    }
}

/// Replace the row with the same id, failing when it does not exist.
fn replace_row<T: Clone>(
    rows: &mut [T],
    updated: &T,
    id_of: impl Fn(&T) -> Uuid,
) -> Result<T, RepoError> {
    let id = id_of(updated);
    let slot = rows
        .iter_mut()
        .find(|row| id_of(row) == id)
        .ok_or(RepoError::NotFound)?;
    *slot = updated.clone();
    Ok(slot.clone())
}

fn page_slice<T>(rows: impl Iterator<Item = T>, page: PageRequest) -> Vec<T> {
    rows.skip(page.offset_usize())
        .take(page.limit_usize())
        .collect()
}
