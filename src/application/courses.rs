use std::sync::Arc;

use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;
use time::OffsetDateTime;
use tracing::info;
use uuid::Uuid;

use crate::application::pagination::PageRequest;
use crate::application::repos::{
    CategoriesRepo, CourseQueryFilter, CoursesRepo, CreateCourseParams, LessonsRepo, RepoError,
    ReviewsRepo, UsersRepo,
};
use crate::application::reviews::{ReviewView, attach_authors};
use crate::domain::courses::{Reviewer, apply_transition, plan_transition, set_published};
use crate::domain::entities::{CourseRecord, LessonRecord, PublicProfile, UserRecord};
use crate::domain::error::DomainError;
use crate::domain::money;
use crate::domain::slug::{SlugAsyncError, generate_unique_slug_async, normalize_slug};
use crate::domain::types::{CourseLevel, CourseStatus};

const DEFAULT_LANGUAGE: &str = "en";

#[derive(Debug, Error)]
pub enum CourseError {
    #[error("Course not found")]
    NotFound,
    #[error("Category not found")]
    CategoryNotFound,
    #[error("{0}")]
    Forbidden(&'static str),
    #[error("{0}")]
    Validation(String),
    #[error(transparent)]
    Repo(#[from] RepoError),
}

impl From<DomainError> for CourseError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::NotFound { .. } => Self::NotFound,
            DomainError::Forbidden { message } => Self::Forbidden(message),
            DomainError::Validation { message } | DomainError::Invariant { message } => {
                Self::Validation(message)
            }
        }
    }
}

impl From<SlugAsyncError<RepoError>> for CourseError {
    fn from(err: SlugAsyncError<RepoError>) -> Self {
        match err {
            SlugAsyncError::Slug(slug) => Self::Validation(slug.to_string()),
            SlugAsyncError::Predicate(repo) => Self::Repo(repo),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CreateCourseCommand {
    pub title: String,
    pub title_en: Option<String>,
    pub title_fa: Option<String>,
    pub slug: Option<String>,
    pub description: String,
    pub short_description: Option<String>,
    pub thumbnail: Option<String>,
    pub preview_video: Option<String>,
    pub price: Decimal,
    pub original_price: Option<Decimal>,
    pub level: CourseLevel,
    pub status: Option<CourseStatus>,
    pub language: Option<String>,
    pub duration: Option<i32>,
    pub category_id: Uuid,
    pub tags: Vec<String>,
    pub requirements: Vec<String>,
    pub what_you_will_learn: Vec<String>,
    pub is_featured: Option<bool>,
    pub is_published: Option<bool>,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateCourseCommand {
    pub title: Option<String>,
    pub title_en: Option<String>,
    pub title_fa: Option<String>,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub short_description: Option<String>,
    pub thumbnail: Option<String>,
    pub preview_video: Option<String>,
    pub price: Option<Decimal>,
    pub original_price: Option<Decimal>,
    pub level: Option<CourseLevel>,
    pub status: Option<CourseStatus>,
    pub language: Option<String>,
    pub duration: Option<i32>,
    pub category_id: Option<Uuid>,
    pub tags: Option<Vec<String>>,
    pub requirements: Option<Vec<String>>,
    pub what_you_will_learn: Option<Vec<String>>,
    pub is_featured: Option<bool>,
    pub is_published: Option<bool>,
}

/// A course with everything its detail page shows.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseDetail {
    #[serde(flatten)]
    pub course: CourseRecord,
    pub lessons: Vec<LessonRecord>,
    pub reviews: Vec<ReviewView>,
    pub instructor: Option<PublicProfile>,
}

#[derive(Clone)]
pub struct CourseService {
    courses: Arc<dyn CoursesRepo>,
    categories: Arc<dyn CategoriesRepo>,
    lessons: Arc<dyn LessonsRepo>,
    reviews: Arc<dyn ReviewsRepo>,
    users: Arc<dyn UsersRepo>,
}

impl CourseService {
    pub fn new(
        courses: Arc<dyn CoursesRepo>,
        categories: Arc<dyn CategoriesRepo>,
        lessons: Arc<dyn LessonsRepo>,
        reviews: Arc<dyn ReviewsRepo>,
        users: Arc<dyn UsersRepo>,
    ) -> Self {
        Self {
            courses,
            categories,
            lessons,
            reviews,
            users,
        }
    }

    pub async fn list(
        &self,
        filter: &CourseQueryFilter,
        page: PageRequest,
    ) -> Result<Vec<CourseRecord>, CourseError> {
        Ok(self.courses.list_courses(filter, page).await?)
    }

    pub async fn get(&self, id: Uuid) -> Result<CourseRecord, CourseError> {
        self.courses
            .find_course(id)
            .await?
            .ok_or(CourseError::NotFound)
    }

    pub async fn detail(&self, id: Uuid) -> Result<CourseDetail, CourseError> {
        let course = self.get(id).await?;
        self.expand(course).await
    }

    pub async fn detail_by_slug(&self, slug: &str) -> Result<CourseDetail, CourseError> {
        let course = self
            .courses
            .find_course_by_slug(slug)
            .await?
            .ok_or(CourseError::NotFound)?;
        self.expand(course).await
    }

    pub async fn create(
        &self,
        actor: &UserRecord,
        command: CreateCourseCommand,
    ) -> Result<CourseRecord, CourseError> {
        if !actor.can_teach() {
            return Err(CourseError::Forbidden("Only instructors can create courses"));
        }
        let title = required(&command.title, "title")?;
        let description = required(&command.description, "description")?;
        validate_duration(command.duration)?;
        let price = amount(command.price, "price")?;
        let original_price = command
            .original_price
            .map(|value| amount(value, "originalPrice"))
            .transpose()?;
        self.ensure_category(command.category_id).await?;

        let status = command.status.unwrap_or_default();
        if !actor.is_admin() {
            if matches!(status, CourseStatus::Published | CourseStatus::Rejected) {
                return Err(CourseError::Forbidden(
                    "Only admins can publish or reject courses",
                ));
            }
            if command.is_published == Some(true) || command.is_featured == Some(true) {
                return Err(CourseError::Forbidden(
                    "Only admins can publish or feature courses",
                ));
            }
        }

        let is_published = command
            .is_published
            .unwrap_or(status == CourseStatus::Published);
        let slug = self
            .unique_slug(command.slug.as_deref().unwrap_or(&title))
            .await?;

        let params = CreateCourseParams {
            title,
            title_en: command.title_en,
            title_fa: command.title_fa,
            slug,
            description,
            short_description: command.short_description,
            thumbnail: command.thumbnail,
            preview_video: command.preview_video,
            price,
            original_price,
            level: command.level,
            status,
            language: command
                .language
                .filter(|lang| !lang.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string()),
            duration: command.duration,
            instructor_id: actor.id,
            category_id: command.category_id,
            tags: command.tags,
            requirements: command.requirements,
            what_you_will_learn: command.what_you_will_learn,
            is_featured: command.is_featured.unwrap_or(false),
            is_published,
            published_at: is_published.then(OffsetDateTime::now_utc),
        };

        let course = self.courses.create_course(params).await?;
        info!(
            target = "coursehub::courses",
            course_id = %course.id,
            instructor_id = %course.instructor_id,
            status = course.status.as_str(),
            "course created"
        );
        Ok(course)
    }

    pub async fn update(
        &self,
        actor: &UserRecord,
        id: Uuid,
        command: UpdateCourseCommand,
    ) -> Result<CourseRecord, CourseError> {
        let mut course = self.get(id).await?;
        if !actor.owns_or_admin(course.instructor_id) {
            return Err(CourseError::Forbidden("Not authorized to update this course"));
        }
        if !actor.is_admin() {
            let publish_change = command
                .is_published
                .is_some_and(|flag| flag != course.is_published);
            let feature_change = command
                .is_featured
                .is_some_and(|flag| flag != course.is_featured);
            if publish_change || feature_change {
                return Err(CourseError::Forbidden(
                    "Only admins can publish or feature courses",
                ));
            }
        }

        let now = OffsetDateTime::now_utc();
        if let Some(title) = command.title {
            course.title = required(&title, "title")?;
        }
        if let Some(description) = command.description {
            course.description = required(&description, "description")?;
        }
        if let Some(slug) = command.slug {
            let slug = normalize_slug(&slug)
                .ok_or_else(|| CourseError::Validation("slug must not be empty".into()))?;
            if slug != course.slug && self.courses.find_course_by_slug(&slug).await?.is_some() {
                return Err(CourseError::Validation(format!(
                    "Slug `{slug}` is already in use"
                )));
            }
            course.slug = slug;
        }
        if let Some(category_id) = command.category_id {
            self.ensure_category(category_id).await?;
            course.category_id = category_id;
        }
        if command.duration.is_some() {
            validate_duration(command.duration)?;
            course.duration = command.duration;
        }
        if command.title_en.is_some() {
            course.title_en = command.title_en;
        }
        if command.title_fa.is_some() {
            course.title_fa = command.title_fa;
        }
        if command.short_description.is_some() {
            course.short_description = command.short_description;
        }
        if command.thumbnail.is_some() {
            course.thumbnail = command.thumbnail;
        }
        if command.preview_video.is_some() {
            course.preview_video = command.preview_video;
        }
        if let Some(price) = command.price {
            course.price = amount(price, "price")?;
        }
        if let Some(original) = command.original_price {
            course.original_price = Some(amount(original, "originalPrice")?);
        }
        if let Some(level) = command.level {
            course.level = level;
        }
        if let Some(language) = command.language.filter(|l| !l.trim().is_empty()) {
            course.language = language;
        }
        if let Some(tags) = command.tags {
            course.tags = tags;
        }
        if let Some(requirements) = command.requirements {
            course.requirements = requirements;
        }
        if let Some(outcomes) = command.what_you_will_learn {
            course.what_you_will_learn = outcomes;
        }
        if let Some(featured) = command.is_featured {
            course.is_featured = featured;
        }

        match command.status {
            Some(next) => {
                let transition = plan_transition(course.status, next, reviewer_for(actor))?;
                apply_transition(&mut course, transition, command.is_published, now);
            }
            None => {
                if let Some(visible) = command.is_published {
                    set_published(&mut course, visible, now);
                }
            }
        }

        course.updated_at = now;
        let updated = self.courses.update_course(&course).await?;
        info!(
            target = "coursehub::courses",
            course_id = %updated.id,
            status = updated.status.as_str(),
            is_published = updated.is_published,
            "course updated"
        );
        Ok(updated)
    }

    /// Delete a course and everything hanging off it except payments.
    pub async fn delete(&self, actor: &UserRecord, id: Uuid) -> Result<(), CourseError> {
        let course = self.get(id).await?;
        if !actor.owns_or_admin(course.instructor_id) {
            return Err(CourseError::Forbidden("Not authorized to delete this course"));
        }
        if !self.courses.delete_course(id).await? {
            return Err(CourseError::NotFound);
        }
        info!(target = "coursehub::courses", course_id = %id, "course deleted");
        Ok(())
    }

    /// Instructor hands a draft (or rejected) course in for review.
    pub async fn submit(&self, actor: &UserRecord, id: Uuid) -> Result<CourseRecord, CourseError> {
        let course = self.get(id).await?;
        if !actor.owns_or_admin(course.instructor_id) {
            return Err(CourseError::Forbidden("Not authorized to update this course"));
        }
        self.move_to(course, CourseStatus::Pending, Reviewer::Author)
            .await
    }

    pub async fn approve(&self, actor: &UserRecord, id: Uuid) -> Result<CourseRecord, CourseError> {
        self.review(actor, id, CourseStatus::Published).await
    }

    pub async fn reject(&self, actor: &UserRecord, id: Uuid) -> Result<CourseRecord, CourseError> {
        self.review(actor, id, CourseStatus::Rejected).await
    }

    async fn review(
        &self,
        actor: &UserRecord,
        id: Uuid,
        next: CourseStatus,
    ) -> Result<CourseRecord, CourseError> {
        if !actor.is_admin() {
            return Err(CourseError::Forbidden("Admin access required"));
        }
        let course = self.get(id).await?;
        if course.status != CourseStatus::Pending && course.status != next {
            return Err(CourseError::Validation(format!(
                "Only pending courses can be reviewed (course is {})",
                course.status
            )));
        }
        self.move_to(course, next, Reviewer::Admin).await
    }

    async fn move_to(
        &self,
        mut course: CourseRecord,
        next: CourseStatus,
        reviewer: Reviewer,
    ) -> Result<CourseRecord, CourseError> {
        let now = OffsetDateTime::now_utc();
        let transition = plan_transition(course.status, next, reviewer)?;
        apply_transition(&mut course, transition, None, now);
        course.updated_at = now;
        let updated = self.courses.update_course(&course).await?;
        info!(
            target = "coursehub::courses",
            course_id = %updated.id,
            status = updated.status.as_str(),
            "course status changed"
        );
        Ok(updated)
    }

    async fn expand(&self, course: CourseRecord) -> Result<CourseDetail, CourseError> {
        let lessons = self.lessons.list_lessons(course.id).await?;
        let reviews = self.reviews.list_reviews_for_course(course.id).await?;
        let reviews = attach_authors(self.users.as_ref(), reviews).await?;
        let instructor = self
            .users
            .find_user(course.instructor_id)
            .await?
            .map(|user| PublicProfile::from(&user));
        Ok(CourseDetail {
            course,
            lessons,
            reviews,
            instructor,
        })
    }

    async fn ensure_category(&self, id: Uuid) -> Result<(), CourseError> {
        match self.categories.find_category(id).await? {
            Some(_) => Ok(()),
            None => Err(CourseError::CategoryNotFound),
        }
    }

    async fn unique_slug(&self, source: &str) -> Result<String, CourseError> {
        let repo = self.courses.clone();
        let slug = generate_unique_slug_async(source, "course", move |candidate| {
            let repo = repo.clone();
            let candidate = candidate.to_string();
            async move {
                repo.find_course_by_slug(&candidate)
                    .await
                    .map(|found| found.is_none())
            }
        })
        .await?;
        Ok(slug)
    }
}

fn reviewer_for(actor: &UserRecord) -> Reviewer {
    if actor.is_admin() {
        Reviewer::Admin
    } else {
        Reviewer::Author
    }
}

fn required(value: &str, field: &str) -> Result<String, CourseError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(CourseError::Validation(format!("{field} is required")));
    }
    Ok(trimmed.to_string())
}

fn amount(value: Decimal, field: &str) -> Result<Decimal, CourseError> {
    money::amount(value).map_err(|err| CourseError::Validation(format!("{field}: {err}")))
}

fn validate_duration(duration: Option<i32>) -> Result<(), CourseError> {
    match duration {
        Some(minutes) if minutes < 0 => Err(CourseError::Validation(
            "duration must not be negative".to_string(),
        )),
        _ => Ok(()),
    }
}
