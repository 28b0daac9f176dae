//! API handlers organized by resource.
//!
//! Each submodule holds the handlers of one resource. The query structs and
//! the service-error conversions they share live here.

mod admin;
mod auth;
mod blog;
mod categories;
mod courses;
mod health;
mod learning;
mod lessons;
mod reviews;

pub use admin::*;
pub use auth::*;
pub use blog::*;
pub use categories::*;
pub use courses::*;
pub use health::*;
pub use learning::*;
pub use lessons::*;
pub use reviews::*;

use axum::http::StatusCode;
use serde::Deserialize;
use uuid::Uuid;

use crate::application::auth::AuthError;
use crate::application::blog::BlogError;
use crate::application::categories::CategoryError;
use crate::application::courses::CourseError;
use crate::application::dashboard::DashboardError;
use crate::application::enrollments::EnrollmentError;
use crate::application::lessons::LessonError;
use crate::application::repos::{BlogPostQueryFilter, CourseQueryFilter, RepoError};
use crate::application::reviews::ReviewError;
use crate::application::users::UserError;
use crate::application::wishlist::WishlistError;
use crate::domain::types::{CourseLevel, CourseStatus, UserRole};

use super::error::ApiError;

// ----- Shared query structs -----

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseListQuery {
    pub category_id: Option<Uuid>,
    pub instructor_id: Option<Uuid>,
    pub level: Option<CourseLevel>,
    pub status: Option<CourseStatus>,
    pub is_published: Option<bool>,
    pub is_featured: Option<bool>,
    pub search: Option<String>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

impl CourseListQuery {
    fn filter(&self) -> CourseQueryFilter {
        CourseQueryFilter {
            category_id: self.category_id,
            instructor_id: self.instructor_id,
            level: self.level,
            status: self.status,
            is_published: self.is_published,
            is_featured: self.is_featured,
            search: non_blank(self.search.as_deref()),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogListQuery {
    pub author_id: Option<Uuid>,
    pub category_id: Option<Uuid>,
    pub is_published: Option<bool>,
    pub is_featured: Option<bool>,
    pub search: Option<String>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

impl BlogListQuery {
    fn filter(&self) -> BlogPostQueryFilter {
        BlogPostQueryFilter {
            author_id: self.author_id,
            category_id: self.category_id,
            is_published: self.is_published,
            is_featured: self.is_featured,
            search: non_blank(self.search.as_deref()),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct UserListQuery {
    pub role: Option<UserRole>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

// ----- Error conversions -----

pub(crate) fn repo_to_api(err: RepoError) -> ApiError {
    match err {
        RepoError::Duplicate { constraint } => {
            ApiError::bad_request(format!("Duplicate record ({constraint})"))
        }
        RepoError::NotFound => ApiError::not_found("Resource not found"),
        RepoError::InvalidInput { message } => ApiError::bad_request(message),
        RepoError::Integrity { message } => ApiError::bad_request(message),
        RepoError::Timeout => ApiError::new(
            StatusCode::SERVICE_UNAVAILABLE,
            "Database timeout",
            Some("database timeout".to_string()),
        ),
        RepoError::Persistence(message) => ApiError::internal(message),
    }
}

fn auth_to_api(err: AuthError) -> ApiError {
    match err {
        AuthError::Validation(message) => ApiError::bad_request(message),
        AuthError::UsernameTaken | AuthError::EmailTaken => ApiError::bad_request(err.to_string()),
        AuthError::InvalidCredentials => {
            ApiError::new(StatusCode::UNAUTHORIZED, err.to_string(), None)
        }
        AuthError::RoleNotAllowed => ApiError::forbidden(err.to_string()),
        AuthError::Hashing(message) => ApiError::internal(message),
        AuthError::Repo(repo) => repo_to_api(repo),
    }
}

fn category_to_api(err: CategoryError) -> ApiError {
    match err {
        CategoryError::NotFound => ApiError::not_found(err.to_string()),
        CategoryError::Forbidden(message) => ApiError::forbidden(message),
        CategoryError::Validation(message) => ApiError::bad_request(message),
        CategoryError::InUse => ApiError::bad_request(err.to_string()),
        CategoryError::Repo(repo) => repo_to_api(repo),
    }
}

fn course_to_api(err: CourseError) -> ApiError {
    match err {
        CourseError::NotFound | CourseError::CategoryNotFound => {
            ApiError::not_found(err.to_string())
        }
        CourseError::Forbidden(message) => ApiError::forbidden(message),
        CourseError::Validation(message) => ApiError::bad_request(message),
        CourseError::Repo(repo) => repo_to_api(repo),
    }
}

fn lesson_to_api(err: LessonError) -> ApiError {
    match err {
        LessonError::NotFound | LessonError::CourseNotFound => ApiError::not_found(err.to_string()),
        LessonError::Forbidden => ApiError::forbidden(err.to_string()),
        LessonError::Validation(message) => ApiError::bad_request(message),
        LessonError::Repo(repo) => repo_to_api(repo),
    }
}

fn review_to_api(err: ReviewError) -> ApiError {
    match err {
        ReviewError::NotFound | ReviewError::CourseNotFound => ApiError::not_found(err.to_string()),
        ReviewError::NotEnrolled => ApiError::bad_request(err.to_string()),
        ReviewError::Forbidden => ApiError::forbidden(err.to_string()),
        ReviewError::Validation(message) => ApiError::bad_request(message),
        ReviewError::Repo(repo) => repo_to_api(repo),
    }
}

fn enrollment_to_api(err: EnrollmentError) -> ApiError {
    match err {
        EnrollmentError::NotFound
        | EnrollmentError::CourseNotFound
        | EnrollmentError::LessonNotFound => ApiError::not_found(err.to_string()),
        EnrollmentError::AlreadyEnrolled | EnrollmentError::CourseUnavailable => {
            ApiError::bad_request(err.to_string())
        }
        EnrollmentError::Forbidden => ApiError::forbidden(err.to_string()),
        EnrollmentError::Repo(repo) => repo_to_api(repo),
    }
}

fn wishlist_to_api(err: WishlistError) -> ApiError {
    match err {
        WishlistError::CourseNotFound | WishlistError::NotListed => {
            ApiError::not_found(err.to_string())
        }
        WishlistError::AlreadyListed => ApiError::bad_request(err.to_string()),
        WishlistError::Repo(repo) => repo_to_api(repo),
    }
}

fn blog_to_api(err: BlogError) -> ApiError {
    match err {
        BlogError::NotFound | BlogError::CommentNotFound | BlogError::CategoryNotFound => {
            ApiError::not_found(err.to_string())
        }
        BlogError::Forbidden(message) => ApiError::forbidden(message),
        BlogError::Validation(message) => ApiError::bad_request(message),
        BlogError::Repo(repo) => repo_to_api(repo),
    }
}

fn user_to_api(err: UserError) -> ApiError {
    match err {
        UserError::NotFound => ApiError::not_found(err.to_string()),
        UserError::Forbidden(message) => ApiError::forbidden(message),
        UserError::Validation(message) => ApiError::bad_request(message),
        UserError::Repo(repo) => repo_to_api(repo),
    }
}

fn dashboard_to_api(err: DashboardError) -> ApiError {
    match err {
        DashboardError::Forbidden => ApiError::forbidden(err.to_string()),
        DashboardError::Repo(repo) => repo_to_api(repo),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_search_is_ignored() {
        let query = CourseListQuery {
            search: Some("   ".to_string()),
            ..CourseListQuery::default()
        };
        assert!(query.filter().search.is_none());
    }

    #[test]
    fn duplicate_rows_are_client_errors() {
        let err = repo_to_api(RepoError::duplicate("enrollments_user_course_key"));
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);

        let err = enrollment_to_api(EnrollmentError::AlreadyEnrolled);
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.message(), "Already enrolled in this course");
    }

    #[test]
    fn persistence_failures_hide_their_detail() {
        let err = repo_to_api(RepoError::Persistence("connection reset".to_string()));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.message(), "Internal server error");
    }
}
