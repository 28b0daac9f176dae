use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::application::repos::{
    CoursesRepo, CreateReviewParams, EnrollmentsRepo, RepoError, ReviewsRepo, UsersRepo,
};
use crate::domain::entities::{PublicProfile, ReviewRecord, UserRecord};

const MIN_RATING: i32 = 1;
const MAX_RATING: i32 = 5;

#[derive(Debug, Error)]
pub enum ReviewError {
    #[error("Review not found")]
    NotFound,
    #[error("Course not found")]
    CourseNotFound,
    #[error("Must be enrolled to review this course")]
    NotEnrolled,
    #[error("Not authorized to delete this review")]
    Forbidden,
    #[error("{0}")]
    Validation(String),
    #[error(transparent)]
    Repo(#[from] RepoError),
}

/// A review with the public profile of its author.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewView {
    #[serde(flatten)]
    pub review: ReviewRecord,
    pub user: Option<PublicProfile>,
}

#[derive(Debug, Clone)]
pub struct CreateReviewCommand {
    pub rating: i32,
    pub comment: Option<String>,
}

#[derive(Clone)]
pub struct ReviewService {
    reviews: Arc<dyn ReviewsRepo>,
    courses: Arc<dyn CoursesRepo>,
    enrollments: Arc<dyn EnrollmentsRepo>,
    users: Arc<dyn UsersRepo>,
}

impl ReviewService {
    pub fn new(
        reviews: Arc<dyn ReviewsRepo>,
        courses: Arc<dyn CoursesRepo>,
        enrollments: Arc<dyn EnrollmentsRepo>,
        users: Arc<dyn UsersRepo>,
    ) -> Self {
        Self {
            reviews,
            courses,
            enrollments,
            users,
        }
    }

    pub async fn list(&self, course_id: Uuid) -> Result<Vec<ReviewView>, ReviewError> {
        self.ensure_course(course_id).await?;
        let reviews = self.reviews.list_reviews_for_course(course_id).await?;
        Ok(attach_authors(self.users.as_ref(), reviews).await?)
    }

    /// Only enrolled users may review; the course rating is recomputed after.
    pub async fn create(
        &self,
        actor: &UserRecord,
        course_id: Uuid,
        command: CreateReviewCommand,
    ) -> Result<ReviewView, ReviewError> {
        if !(MIN_RATING..=MAX_RATING).contains(&command.rating) {
            return Err(ReviewError::Validation(format!(
                "Rating must be between {MIN_RATING} and {MAX_RATING}"
            )));
        }
        self.ensure_course(course_id).await?;
        if self
            .enrollments
            .find_enrollment_for(actor.id, course_id)
            .await?
            .is_none()
        {
            return Err(ReviewError::NotEnrolled);
        }

        let review = self
            .reviews
            .create_review(CreateReviewParams {
                user_id: actor.id,
                course_id,
                rating: command.rating,
                comment: command
                    .comment
                    .map(|text| text.trim().to_string())
                    .filter(|text| !text.is_empty()),
            })
            .await?;
        let course = self.courses.refresh_course_stats(course_id).await?;

        info!(
            target = "coursehub::reviews",
            review_id = %review.id,
            course_id = %course_id,
            rating = review.rating,
            course_rating = %course.rating,
            "review created"
        );
        Ok(ReviewView {
            review,
            user: Some(PublicProfile::from(actor)),
        })
    }

    pub async fn delete(&self, actor: &UserRecord, id: Uuid) -> Result<(), ReviewError> {
        let review = self
            .reviews
            .find_review(id)
            .await?
            .ok_or(ReviewError::NotFound)?;
        if !actor.owns_or_admin(review.user_id) {
            return Err(ReviewError::Forbidden);
        }
        if !self.reviews.delete_review(id).await? {
            return Err(ReviewError::NotFound);
        }
        if self.courses.find_course(review.course_id).await?.is_some() {
            self.courses.refresh_course_stats(review.course_id).await?;
        }
        info!(target = "coursehub::reviews", review_id = %id, "review deleted");
        Ok(())
    }

    async fn ensure_course(&self, id: Uuid) -> Result<(), ReviewError> {
        match self.courses.find_course(id).await? {
            Some(_) => Ok(()),
            None => Err(ReviewError::CourseNotFound),
        }
    }
}

/// Pair reviews with their authors, looking each author up once.
pub(crate) async fn attach_authors(
    users: &dyn UsersRepo,
    reviews: Vec<ReviewRecord>,
) -> Result<Vec<ReviewView>, RepoError> {
    let mut profiles: HashMap<Uuid, Option<PublicProfile>> = HashMap::new();
    let mut views = Vec::with_capacity(reviews.len());
    for review in reviews {
        if !profiles.contains_key(&review.user_id) {
            let profile = users
                .find_user(review.user_id)
                .await?
                .map(|user| PublicProfile::from(&user));
            profiles.insert(review.user_id, profile);
        }
        let user = profiles.get(&review.user_id).cloned().flatten();
        views.push(ReviewView { review, user });
    }
    Ok(views)
}
