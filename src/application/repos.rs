//! Repository traits describing persistence adapters.
//!
//! Two backends implement every trait: `infra::memory::MemoryRepositories`
//! and `infra::db::PostgresRepositories`. Updates take the full record; the
//! services load, modify and write back (last write wins). Denormalised
//! course counters are only ever written by `refresh_course_stats`.

use async_trait::async_trait;
use rust_decimal::Decimal;
use thiserror::Error;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::application::pagination::PageRequest;
use crate::domain::entities::{
    BlogPostRecord, CategoryRecord, CommentRecord, CourseRecord, EnrollmentRecord, LessonRecord,
    PaymentRecord, ReviewRecord, UserRecord, WishlistRecord,
};
use crate::domain::types::{CourseLevel, CourseStatus, PaymentStatus, UserRole};

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("persistence error: {0}")]
    Persistence(String),
    #[error("duplicate record violates unique constraint `{constraint}`")]
    Duplicate { constraint: String },
    #[error("resource not found")]
    NotFound,
    #[error("invalid input: {message}")]
    InvalidInput { message: String },
    #[error("integrity error: {message}")]
    Integrity { message: String },
    #[error("database timeout")]
    Timeout,
}

impl RepoError {
    pub fn from_persistence(err: impl std::fmt::Display) -> Self {
        Self::Persistence(err.to_string())
    }

    pub fn duplicate(constraint: impl Into<String>) -> Self {
        Self::Duplicate {
            constraint: constraint.into(),
        }
    }
}

pub mod constraints {
    pub const USERS_USERNAME: &str = "users_username_key";
    pub const USERS_EMAIL: &str = "users_email_key";
    pub const CATEGORIES_SLUG: &str = "categories_slug_key";
    pub const COURSES_SLUG: &str = "courses_slug_key";
    pub const BLOG_POSTS_SLUG: &str = "blog_posts_slug_key";
    pub const ENROLLMENTS_USER_COURSE: &str = "enrollments_user_course_key";
    pub const WISHLIST_USER_COURSE: &str = "wishlist_user_course_key";
}

#[derive(Debug, Clone, Default)]
pub struct CourseQueryFilter {
    pub category_id: Option<Uuid>,
    pub instructor_id: Option<Uuid>,
    pub level: Option<CourseLevel>,
    pub status: Option<CourseStatus>,
    pub is_published: Option<bool>,
    pub is_featured: Option<bool>,
    pub search: Option<String>,
}

impl CourseQueryFilter {
    /// In-memory evaluation of the filter; Postgres builds the equivalent SQL.
    pub fn matches(&self, course: &CourseRecord) -> bool {
        self.category_id.is_none_or(|id| course.category_id == id)
            && self.instructor_id.is_none_or(|id| course.instructor_id == id)
            && self.level.is_none_or(|level| course.level == level)
            && self.status.is_none_or(|status| course.status == status)
            && self
                .is_published
                .is_none_or(|flag| course.is_published == flag)
            && self.is_featured.is_none_or(|flag| course.is_featured == flag)
            && self.search.as_deref().is_none_or(|needle| {
                contains_ci(&course.title, needle) || contains_ci(&course.description, needle)
            })
    }
}

#[derive(Debug, Clone, Default)]
pub struct BlogPostQueryFilter {
    pub author_id: Option<Uuid>,
    pub category_id: Option<Uuid>,
    pub is_published: Option<bool>,
    pub is_featured: Option<bool>,
    pub search: Option<String>,
}

impl BlogPostQueryFilter {
    pub fn matches(&self, post: &BlogPostRecord) -> bool {
        self.author_id.is_none_or(|id| post.author_id == id)
            && self
                .category_id
                .is_none_or(|id| post.category_id == Some(id))
            && self.is_published.is_none_or(|flag| post.is_published == flag)
            && self.is_featured.is_none_or(|flag| post.is_featured == flag)
            && self.search.as_deref().is_none_or(|needle| {
                contains_ci(&post.title, needle) || contains_ci(&post.content, needle)
            })
    }
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

#[derive(Debug, Clone)]
pub struct CreateUserParams {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub role: UserRole,
}

#[derive(Debug, Clone)]
pub struct CreateCategoryParams {
    pub name: String,
    pub name_en: String,
    pub name_fa: String,
    pub slug: String,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub color: Option<String>,
    pub is_active: bool,
}

#[derive(Debug, Clone)]
pub struct CreateCourseParams {
    pub title: String,
    pub title_en: Option<String>,
    pub title_fa: Option<String>,
    pub slug: String,
    pub description: String,
    pub short_description: Option<String>,
    pub thumbnail: Option<String>,
    pub preview_video: Option<String>,
    pub price: Decimal,
    pub original_price: Option<Decimal>,
    pub level: CourseLevel,
    pub status: CourseStatus,
    pub language: String,
    pub duration: Option<i32>,
    pub instructor_id: Uuid,
    pub category_id: Uuid,
    pub tags: Vec<String>,
    pub requirements: Vec<String>,
    pub what_you_will_learn: Vec<String>,
    pub is_featured: bool,
    pub is_published: bool,
    pub published_at: Option<OffsetDateTime>,
}

#[derive(Debug, Clone)]
pub struct CreateLessonParams {
    pub course_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub video_url: Option<String>,
    pub duration: Option<i32>,
    pub order_index: i32,
    pub is_free: bool,
}

#[derive(Debug, Clone, Copy)]
pub struct CreateEnrollmentParams {
    pub user_id: Uuid,
    pub course_id: Uuid,
}

#[derive(Debug, Clone)]
pub struct CreateReviewParams {
    pub user_id: Uuid,
    pub course_id: Uuid,
    pub rating: i32,
    pub comment: Option<String>,
}

#[derive(Debug, Clone)]
pub struct CreatePaymentParams {
    pub user_id: Uuid,
    pub course_id: Uuid,
    pub amount: Decimal,
    pub currency: String,
    pub status: PaymentStatus,
    pub payment_method: Option<String>,
    pub transaction_id: Option<String>,
}

#[derive(Debug, Clone)]
pub struct CreateBlogPostParams {
    pub title: String,
    pub title_en: Option<String>,
    pub title_fa: Option<String>,
    pub slug: String,
    pub excerpt: Option<String>,
    pub content: String,
    pub thumbnail: Option<String>,
    pub author_id: Uuid,
    pub category_id: Option<Uuid>,
    pub tags: Vec<String>,
    pub is_published: bool,
    pub is_featured: bool,
    pub published_at: Option<OffsetDateTime>,
}

#[derive(Debug, Clone)]
pub struct CreateCommentParams {
    pub content: String,
    pub user_id: Uuid,
    pub blog_post_id: Uuid,
    pub parent_id: Option<Uuid>,
}

#[derive(Debug, Clone, Copy)]
pub struct CreateWishlistParams {
    pub user_id: Uuid,
    pub course_id: Uuid,
}

#[async_trait]
pub trait UsersRepo: Send + Sync {
    /// Insertion order, optionally restricted to one role.
    async fn list_users(
        &self,
        role: Option<UserRole>,
        page: PageRequest,
    ) -> Result<Vec<UserRecord>, RepoError>;

    async fn find_user(&self, id: Uuid) -> Result<Option<UserRecord>, RepoError>;

    async fn find_user_by_username(&self, username: &str)
    -> Result<Option<UserRecord>, RepoError>;

    async fn find_user_by_email(&self, email: &str) -> Result<Option<UserRecord>, RepoError>;

    async fn create_user(&self, params: CreateUserParams) -> Result<UserRecord, RepoError>;

    async fn update_user(&self, user: &UserRecord) -> Result<UserRecord, RepoError>;

    async fn count_users_by_role(&self) -> Result<Vec<(UserRole, u64)>, RepoError>;
}

#[async_trait]
pub trait CategoriesRepo: Send + Sync {
    async fn list_categories(&self, active_only: bool) -> Result<Vec<CategoryRecord>, RepoError>;

    async fn find_category(&self, id: Uuid) -> Result<Option<CategoryRecord>, RepoError>;

    async fn find_category_by_slug(&self, slug: &str)
    -> Result<Option<CategoryRecord>, RepoError>;

    async fn create_category(
        &self,
        params: CreateCategoryParams,
    ) -> Result<CategoryRecord, RepoError>;

    async fn update_category(&self, category: &CategoryRecord)
    -> Result<CategoryRecord, RepoError>;

    async fn delete_category(&self, id: Uuid) -> Result<bool, RepoError>;

    /// Whether any course or blog post still points at the category.
    async fn category_in_use(&self, id: Uuid) -> Result<bool, RepoError>;
}

#[async_trait]
pub trait CoursesRepo: Send + Sync {
    /// Filtered courses in insertion order.
    async fn list_courses(
        &self,
        filter: &CourseQueryFilter,
        page: PageRequest,
    ) -> Result<Vec<CourseRecord>, RepoError>;

    async fn find_course(&self, id: Uuid) -> Result<Option<CourseRecord>, RepoError>;

    async fn find_course_by_slug(&self, slug: &str) -> Result<Option<CourseRecord>, RepoError>;

    async fn create_course(&self, params: CreateCourseParams) -> Result<CourseRecord, RepoError>;

    /// Persist editable fields; counters are left untouched.
    async fn update_course(&self, course: &CourseRecord) -> Result<CourseRecord, RepoError>;

    /// Delete the course with its lessons, enrollments, reviews and wishlist
    /// entries. Payments are kept.
    async fn delete_course(&self, id: Uuid) -> Result<bool, RepoError>;

    /// Recompute lessons/students/reviews counters and the average rating.
    async fn refresh_course_stats(&self, id: Uuid) -> Result<CourseRecord, RepoError>;

    async fn count_courses_by_status(&self) -> Result<Vec<(CourseStatus, u64)>, RepoError>;
}

#[async_trait]
pub trait LessonsRepo: Send + Sync {
    /// Lessons of a course by ascending `order_index`.
    async fn list_lessons(&self, course_id: Uuid) -> Result<Vec<LessonRecord>, RepoError>;

    async fn find_lesson(&self, id: Uuid) -> Result<Option<LessonRecord>, RepoError>;

    async fn create_lesson(&self, params: CreateLessonParams) -> Result<LessonRecord, RepoError>;

    async fn update_lesson(&self, lesson: &LessonRecord) -> Result<LessonRecord, RepoError>;

    async fn delete_lesson(&self, id: Uuid) -> Result<bool, RepoError>;
}

#[async_trait]
pub trait EnrollmentsRepo: Send + Sync {
    async fn list_enrollments_for_user(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<EnrollmentRecord>, RepoError>;

    async fn find_enrollment(&self, id: Uuid) -> Result<Option<EnrollmentRecord>, RepoError>;

    async fn find_enrollment_for(
        &self,
        user_id: Uuid,
        course_id: Uuid,
    ) -> Result<Option<EnrollmentRecord>, RepoError>;

    /// Fails with `Duplicate` when the user is already enrolled.
    async fn create_enrollment(
        &self,
        params: CreateEnrollmentParams,
    ) -> Result<EnrollmentRecord, RepoError>;

    async fn update_enrollment(
        &self,
        enrollment: &EnrollmentRecord,
    ) -> Result<EnrollmentRecord, RepoError>;

    async fn count_enrollments(&self) -> Result<u64, RepoError>;
}

#[async_trait]
pub trait ReviewsRepo: Send + Sync {
    /// Published reviews of a course, newest first.
    async fn list_reviews_for_course(
        &self,
        course_id: Uuid,
    ) -> Result<Vec<ReviewRecord>, RepoError>;

    async fn find_review(&self, id: Uuid) -> Result<Option<ReviewRecord>, RepoError>;

    async fn create_review(&self, params: CreateReviewParams) -> Result<ReviewRecord, RepoError>;

    async fn delete_review(&self, id: Uuid) -> Result<bool, RepoError>;
}

#[async_trait]
pub trait PaymentsRepo: Send + Sync {
    async fn list_payments_for_user(&self, user_id: Uuid)
    -> Result<Vec<PaymentRecord>, RepoError>;

    async fn create_payment(&self, params: CreatePaymentParams)
    -> Result<PaymentRecord, RepoError>;

    /// Sum of all completed payments.
    async fn completed_revenue(&self) -> Result<Decimal, RepoError>;
}

#[async_trait]
pub trait BlogPostsRepo: Send + Sync {
    /// Filtered posts, newest first.
    async fn list_blog_posts(
        &self,
        filter: &BlogPostQueryFilter,
        page: PageRequest,
    ) -> Result<Vec<BlogPostRecord>, RepoError>;

    async fn find_blog_post(&self, id: Uuid) -> Result<Option<BlogPostRecord>, RepoError>;

    async fn find_blog_post_by_slug(
        &self,
        slug: &str,
    ) -> Result<Option<BlogPostRecord>, RepoError>;

    async fn create_blog_post(
        &self,
        params: CreateBlogPostParams,
    ) -> Result<BlogPostRecord, RepoError>;

    async fn update_blog_post(&self, post: &BlogPostRecord) -> Result<BlogPostRecord, RepoError>;

    /// Delete the post together with its comments.
    async fn delete_blog_post(&self, id: Uuid) -> Result<bool, RepoError>;

    /// Increment `views_count` and return the updated post.
    async fn record_blog_view(&self, id: Uuid) -> Result<Option<BlogPostRecord>, RepoError>;
}

#[async_trait]
pub trait CommentsRepo: Send + Sync {
    /// Published comments of a post, oldest first.
    async fn list_comments_for_post(
        &self,
        blog_post_id: Uuid,
    ) -> Result<Vec<CommentRecord>, RepoError>;

    async fn find_comment(&self, id: Uuid) -> Result<Option<CommentRecord>, RepoError>;

    async fn create_comment(&self, params: CreateCommentParams)
    -> Result<CommentRecord, RepoError>;

    /// Delete the comment and every reply beneath it.
    async fn delete_comment(&self, id: Uuid) -> Result<bool, RepoError>;
}

#[async_trait]
pub trait WishlistRepo: Send + Sync {
    /// Newest first.
    async fn list_wishlist_for_user(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<WishlistRecord>, RepoError>;

    async fn find_wishlist_entry(
        &self,
        user_id: Uuid,
        course_id: Uuid,
    ) -> Result<Option<WishlistRecord>, RepoError>;

    /// Fails with `Duplicate` when the course is already listed.
    async fn add_to_wishlist(
        &self,
        params: CreateWishlistParams,
    ) -> Result<WishlistRecord, RepoError>;

    async fn remove_from_wishlist(&self, user_id: Uuid, course_id: Uuid)
    -> Result<bool, RepoError>;
}

#[async_trait]
pub trait HealthRepo: Send + Sync {
    async fn health_check(&self) -> Result<(), RepoError>;
}

/// Everything a backend must provide to drive the API.
pub trait Repositories:
    UsersRepo
    + CategoriesRepo
    + CoursesRepo
    + LessonsRepo
    + EnrollmentsRepo
    + ReviewsRepo
    + PaymentsRepo
    + BlogPostsRepo
    + CommentsRepo
    + WishlistRepo
    + HealthRepo
    + 'static
{
}

impl<T> Repositories for T where
    T: UsersRepo
        + CategoriesRepo
        + CoursesRepo
        + LessonsRepo
        + EnrollmentsRepo
        + ReviewsRepo
        + PaymentsRepo
        + BlogPostsRepo
        + CommentsRepo
        + WishlistRepo
        + HealthRepo
        + 'static
{
}
