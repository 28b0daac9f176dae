use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::application::repos::{CoursesRepo, CreateWishlistParams, RepoError, WishlistRepo};
use crate::domain::entities::{CourseRecord, UserRecord, WishlistRecord};

#[derive(Debug, Error)]
pub enum WishlistError {
    #[error("Course not found")]
    CourseNotFound,
    #[error("Course already in wishlist")]
    AlreadyListed,
    #[error("Course not found in wishlist")]
    NotListed,
    #[error(transparent)]
    Repo(#[from] RepoError),
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WishlistView {
    #[serde(flatten)]
    pub entry: WishlistRecord,
    pub course: Option<CourseRecord>,
}

#[derive(Clone)]
pub struct WishlistService {
    wishlist: Arc<dyn WishlistRepo>,
    courses: Arc<dyn CoursesRepo>,
}

impl WishlistService {
    pub fn new(wishlist: Arc<dyn WishlistRepo>, courses: Arc<dyn CoursesRepo>) -> Self {
        Self { wishlist, courses }
    }

    pub async fn contains(&self, actor: &UserRecord, course_id: Uuid) -> Result<bool, WishlistError> {
        Ok(self
            .wishlist
            .find_wishlist_entry(actor.id, course_id)
            .await?
            .is_some())
    }

    pub async fn add(
        &self,
        actor: &UserRecord,
        course_id: Uuid,
    ) -> Result<WishlistRecord, WishlistError> {
        if self.courses.find_course(course_id).await?.is_none() {
            return Err(WishlistError::CourseNotFound);
        }
        let entry = self
            .wishlist
            .add_to_wishlist(CreateWishlistParams {
                user_id: actor.id,
                course_id,
            })
            .await
            .map_err(|err| match err {
                RepoError::Duplicate { .. } => WishlistError::AlreadyListed,
                other => WishlistError::Repo(other),
            })?;
        info!(
            target = "coursehub::wishlist",
            user_id = %actor.id,
            course_id = %course_id,
            "course added to wishlist"
        );
        Ok(entry)
    }

    pub async fn remove(&self, actor: &UserRecord, course_id: Uuid) -> Result<(), WishlistError> {
        if self.wishlist.remove_from_wishlist(actor.id, course_id).await? {
            Ok(())
        } else {
            Err(WishlistError::NotListed)
        }
    }

    pub async fn my_wishlist(&self, actor: &UserRecord) -> Result<Vec<WishlistView>, WishlistError> {
        let entries = self.wishlist.list_wishlist_for_user(actor.id).await?;
        let mut views = Vec::with_capacity(entries.len());
        for entry in entries {
            let course = self.courses.find_course(entry.course_id).await?;
            views.push(WishlistView { entry, course });
        }
        Ok(views)
    }
}
