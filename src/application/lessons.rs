use std::sync::Arc;

use thiserror::Error;
use time::OffsetDateTime;
use tracing::info;
use uuid::Uuid;

use crate::application::repos::{CoursesRepo, CreateLessonParams, LessonsRepo, RepoError};
use crate::domain::entities::{CourseRecord, LessonRecord, UserRecord};

#[derive(Debug, Error)]
pub enum LessonError {
    #[error("Lesson not found")]
    NotFound,
    #[error("Course not found")]
    CourseNotFound,
    #[error("Not authorized to manage lessons for this course")]
    Forbidden,
    #[error("{0}")]
    Validation(String),
    #[error(transparent)]
    Repo(#[from] RepoError),
}

#[derive(Debug, Clone, Default)]
pub struct CreateLessonCommand {
    pub title: String,
    pub description: Option<String>,
    pub video_url: Option<String>,
    pub duration: Option<i32>,
    pub order_index: Option<i32>,
    pub is_free: Option<bool>,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateLessonCommand {
    pub title: Option<String>,
    pub description: Option<String>,
    pub video_url: Option<String>,
    pub duration: Option<i32>,
    pub order_index: Option<i32>,
    pub is_free: Option<bool>,
}

#[derive(Clone)]
pub struct LessonService {
    lessons: Arc<dyn LessonsRepo>,
    courses: Arc<dyn CoursesRepo>,
}

impl LessonService {
    pub fn new(lessons: Arc<dyn LessonsRepo>, courses: Arc<dyn CoursesRepo>) -> Self {
        Self { lessons, courses }
    }

    pub async fn list(&self, course_id: Uuid) -> Result<Vec<LessonRecord>, LessonError> {
        self.course(course_id).await?;
        Ok(self.lessons.list_lessons(course_id).await?)
    }

    /// Append a lesson; without an explicit `order_index` it goes last.
    pub async fn create(
        &self,
        actor: &UserRecord,
        course_id: Uuid,
        command: CreateLessonCommand,
    ) -> Result<LessonRecord, LessonError> {
        let course = self.course(course_id).await?;
        ensure_manager(actor, &course)?;

        let title = command.title.trim();
        if title.is_empty() {
            return Err(LessonError::Validation("title is required".to_string()));
        }
        validate_numbers(command.duration, command.order_index)?;

        let order_index = match command.order_index {
            Some(index) => index,
            None => match self
                .lessons
                .list_lessons(course_id)
                .await?
                .iter()
                .map(|lesson| lesson.order_index)
                .max()
            {
                Some(last) => last.checked_add(1).ok_or_else(|| {
                    LessonError::Validation(
                        "orderIndex is required once the last lesson is at the maximum".to_string(),
                    )
                })?,
                None => 0,
            },
        };

        let lesson = self
            .lessons
            .create_lesson(CreateLessonParams {
                course_id,
                title: title.to_string(),
                description: command.description,
                video_url: command.video_url,
                duration: command.duration,
                order_index,
                is_free: command.is_free.unwrap_or(false),
            })
            .await?;
        self.courses.refresh_course_stats(course_id).await?;

        info!(
            target = "coursehub::lessons",
            lesson_id = %lesson.id,
            course_id = %course_id,
            order_index = lesson.order_index,
            "lesson created"
        );
        Ok(lesson)
    }

    pub async fn update(
        &self,
        actor: &UserRecord,
        id: Uuid,
        command: UpdateLessonCommand,
    ) -> Result<LessonRecord, LessonError> {
        let mut lesson = self.get(id).await?;
        let course = self.course(lesson.course_id).await?;
        ensure_manager(actor, &course)?;
        validate_numbers(command.duration, command.order_index)?;

        if let Some(title) = command.title {
            let title = title.trim();
            if title.is_empty() {
                return Err(LessonError::Validation("title is required".to_string()));
            }
            lesson.title = title.to_string();
        }
        if command.description.is_some() {
            lesson.description = command.description;
        }
        if command.video_url.is_some() {
            lesson.video_url = command.video_url;
        }
        if command.duration.is_some() {
            lesson.duration = command.duration;
        }
        if let Some(index) = command.order_index {
            lesson.order_index = index;
        }
        if let Some(free) = command.is_free {
            lesson.is_free = free;
        }
        lesson.updated_at = OffsetDateTime::now_utc();

        Ok(self.lessons.update_lesson(&lesson).await?)
    }

    pub async fn delete(&self, actor: &UserRecord, id: Uuid) -> Result<(), LessonError> {
        let lesson = self.get(id).await?;
        let course = self.course(lesson.course_id).await?;
        ensure_manager(actor, &course)?;

        if !self.lessons.delete_lesson(id).await? {
            return Err(LessonError::NotFound);
        }
        self.courses.refresh_course_stats(course.id).await?;
        info!(target = "coursehub::lessons", lesson_id = %id, "lesson deleted");
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<LessonRecord, LessonError> {
        self.lessons
            .find_lesson(id)
            .await?
            .ok_or(LessonError::NotFound)
    }

    async fn course(&self, id: Uuid) -> Result<CourseRecord, LessonError> {
        self.courses
            .find_course(id)
            .await?
            .ok_or(LessonError::CourseNotFound)
    }
}

fn ensure_manager(actor: &UserRecord, course: &CourseRecord) -> Result<(), LessonError> {
    if actor.owns_or_admin(course.instructor_id) {
        Ok(())
    } else {
        Err(LessonError::Forbidden)
    }
}

fn validate_numbers(duration: Option<i32>, order_index: Option<i32>) -> Result<(), LessonError> {
    if duration.is_some_and(|seconds| seconds < 0) {
        return Err(LessonError::Validation(
            "duration must not be negative".to_string(),
        ));
    }
    if order_index.is_some_and(|index| index < 0) {
        return Err(LessonError::Validation(
            "orderIndex must not be negative".to_string(),
        ));
    }
    Ok(())
}
