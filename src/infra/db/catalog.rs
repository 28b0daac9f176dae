use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::{Postgres, QueryBuilder};
use uuid::Uuid;

use crate::application::pagination::PageRequest;
use crate::application::repos::{
    CategoriesRepo, CourseQueryFilter, CoursesRepo, CreateCategoryParams, CreateCourseParams,
    CreateLessonParams, LessonsRepo, RepoError,
};
use crate::domain::entities::{CategoryRecord, CourseRecord, LessonRecord};
use crate::domain::types::CourseStatus;

use super::PostgresRepositories;
use super::util::{count_to_u64, map_sqlx_error};

const CATEGORY_COLUMNS: &str =
    "id, name, name_en, name_fa, slug, description, icon, color, is_active, created_at";

const COURSE_COLUMNS: &str = "id, title, title_en, title_fa, slug, description, \
    short_description, thumbnail, preview_video, price, original_price, level, \
    status, language, duration, lessons_count, students_count, rating, \
    reviews_count, instructor_id, category_id, tags, requirements, what_you_will_learn, \
    is_featured, is_published, published_at, created_at, updated_at";

const LESSON_COLUMNS: &str = "id, course_id, title, description, video_url, duration, \
    order_index, is_free, created_at, updated_at";

impl PostgresRepositories {
    fn apply_course_filter<'q>(qb: &mut QueryBuilder<'q, Postgres>, filter: &'q CourseQueryFilter) {
        if let Some(category_id) = filter.category_id {
            qb.push(" AND category_id = ");
            qb.push_bind(category_id);
        }
        if let Some(instructor_id) = filter.instructor_id {
            qb.push(" AND instructor_id = ");
            qb.push_bind(instructor_id);
        }
        if let Some(level) = filter.level {
            qb.push(" AND level = ");
            qb.push_bind(level);
        }
        if let Some(status) = filter.status {
            qb.push(" AND status = ");
            qb.push_bind(status);
        }
        if let Some(published) = filter.is_published {
            qb.push(" AND is_published = ");
            qb.push_bind(published);
        }
        if let Some(featured) = filter.is_featured {
            qb.push(" AND is_featured = ");
            qb.push_bind(featured);
        }
        if let Some(search) = filter.search.as_ref() {
            let pattern = format!("%{}%", escape_like(search));
            qb.push(" AND (title ILIKE ");
            qb.push_bind(pattern.clone());
            qb.push(" OR description ILIKE ");
            qb.push_bind(pattern);
            qb.push(")");
        }
    }
}

pub(super) fn escape_like(input: &str) -> String {
    input
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

#[async_trait]
impl CategoriesRepo for PostgresRepositories {
    async fn list_categories(&self, active_only: bool) -> Result<Vec<CategoryRecord>, RepoError> {
        let sql = format!(
            "SELECT {CATEGORY_COLUMNS} FROM categories \
             WHERE ($1 = FALSE OR is_active) ORDER BY seq"
        );
        sqlx::query_as::<_, CategoryRecord>(&sql)
            .bind(active_only)
            .fetch_all(self.pool())
            .await
            .map_err(map_sqlx_error)
    }

    async fn find_category(&self, id: Uuid) -> Result<Option<CategoryRecord>, RepoError> {
        let sql = format!("SELECT {CATEGORY_COLUMNS} FROM categories WHERE id = $1");
        sqlx::query_as::<_, CategoryRecord>(&sql)
            .bind(id)
            .fetch_optional(self.pool())
            .await
            .map_err(map_sqlx_error)
    }

    async fn find_category_by_slug(
        &self,
        slug: &str,
    ) -> Result<Option<CategoryRecord>, RepoError> {
        let sql = format!("SELECT {CATEGORY_COLUMNS} FROM categories WHERE slug = $1");
        sqlx::query_as::<_, CategoryRecord>(&sql)
            .bind(slug)
            .fetch_optional(self.pool())
            .await
            .map_err(map_sqlx_error)
    }

    async fn create_category(
        &self,
        params: CreateCategoryParams,
    ) -> Result<CategoryRecord, RepoError> {
        let sql = format!(
            "INSERT INTO categories (id, name, name_en, name_fa, slug, description, icon, color, is_active) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
             RETURNING {CATEGORY_COLUMNS}"
        );
        sqlx::query_as::<_, CategoryRecord>(&sql)
            .bind(Uuid::new_v4())
            .bind(params.name)
            .bind(params.name_en)
            .bind(params.name_fa)
            .bind(params.slug)
            .bind(params.description)
            .bind(params.icon)
            .bind(params.color)
            .bind(params.is_active)
            .fetch_one(self.pool())
            .await
            .map_err(map_sqlx_error)
    }

    async fn update_category(
        &self,
        category: &CategoryRecord,
    ) -> Result<CategoryRecord, RepoError> {
        let sql = format!(
            "UPDATE categories SET name = $2, name_en = $3, name_fa = $4, slug = $5, \
                 description = $6, icon = $7, color = $8, is_active = $9 \
             WHERE id = $1 \
             RETURNING {CATEGORY_COLUMNS}"
        );
        sqlx::query_as::<_, CategoryRecord>(&sql)
            .bind(category.id)
            .bind(&category.name)
            .bind(&category.name_en)
            .bind(&category.name_fa)
            .bind(&category.slug)
            .bind(&category.description)
            .bind(&category.icon)
            .bind(&category.color)
            .bind(category.is_active)
            .fetch_one(self.pool())
            .await
            .map_err(map_sqlx_error)
    }

    async fn delete_category(&self, id: Uuid) -> Result<bool, RepoError> {
        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await
            .map_err(map_sqlx_error)?;
        Ok(result.rows_affected() > 0)
    }

    async fn category_in_use(&self, id: Uuid) -> Result<bool, RepoError> {
        let (in_use,): (bool,) = sqlx::query_as(
            "SELECT EXISTS (SELECT 1 FROM courses WHERE category_id = $1) \
                 OR EXISTS (SELECT 1 FROM blog_posts WHERE category_id = $1)",
        )
        .bind(id)
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)?;
        Ok(in_use)
    }
}

#[async_trait]
impl CoursesRepo for PostgresRepositories {
    async fn list_courses(
        &self,
        filter: &CourseQueryFilter,
        page: PageRequest,
    ) -> Result<Vec<CourseRecord>, RepoError> {
        let mut qb = QueryBuilder::new(format!("SELECT {COURSE_COLUMNS} FROM courses WHERE TRUE"));
        Self::apply_course_filter(&mut qb, filter);
        qb.push(" ORDER BY seq LIMIT ");
        qb.push_bind(page.sql_limit());
        qb.push(" OFFSET ");
        qb.push_bind(page.sql_offset());

        qb.build_query_as::<CourseRecord>()
            .fetch_all(self.pool())
            .await
            .map_err(map_sqlx_error)
    }

    async fn find_course(&self, id: Uuid) -> Result<Option<CourseRecord>, RepoError> {
        let sql = format!("SELECT {COURSE_COLUMNS} FROM courses WHERE id = $1");
        sqlx::query_as::<_, CourseRecord>(&sql)
            .bind(id)
            .fetch_optional(self.pool())
            .await
            .map_err(map_sqlx_error)
    }

    async fn find_course_by_slug(&self, slug: &str) -> Result<Option<CourseRecord>, RepoError> {
        let sql = format!("SELECT {COURSE_COLUMNS} FROM courses WHERE slug = $1");
        sqlx::query_as::<_, CourseRecord>(&sql)
            .bind(slug)
            .fetch_optional(self.pool())
            .await
            .map_err(map_sqlx_error)
    }

    async fn create_course(&self, params: CreateCourseParams) -> Result<CourseRecord, RepoError> {
        let sql = format!(
            "INSERT INTO courses (id, title, title_en, title_fa, slug, description, \
                 short_description, thumbnail, preview_video, price, original_price, \
                 level, status, language, duration, instructor_id, category_id, tags, \
                 requirements, what_you_will_learn, is_featured, is_published, published_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, \
                 $17, $18, $19, $20, $21, $22, $23) \
             RETURNING {COURSE_COLUMNS}"
        );
        sqlx::query_as::<_, CourseRecord>(&sql)
            .bind(Uuid::new_v4())
            .bind(params.title)
            .bind(params.title_en)
            .bind(params.title_fa)
            .bind(params.slug)
            .bind(params.description)
            .bind(params.short_description)
            .bind(params.thumbnail)
            .bind(params.preview_video)
            .bind(params.price)
            .bind(params.original_price)
            .bind(params.level)
            .bind(params.status)
            .bind(params.language)
            .bind(params.duration)
            .bind(params.instructor_id)
            .bind(params.category_id)
            .bind(Json(params.tags))
            .bind(Json(params.requirements))
            .bind(Json(params.what_you_will_learn))
            .bind(params.is_featured)
            .bind(params.is_published)
            .bind(params.published_at)
            .fetch_one(self.pool())
            .await
            .map_err(map_sqlx_error)
    }

    async fn update_course(&self, course: &CourseRecord) -> Result<CourseRecord, RepoError> {
        let sql = format!(
            "UPDATE courses SET title = $2, title_en = $3, title_fa = $4, slug = $5, \
                 description = $6, short_description = $7, thumbnail = $8, preview_video = $9, \
                 price = $10, original_price = $11, level = $12, status = $13, \
                 language = $14, duration = $15, category_id = $16, tags = $17, \
                 requirements = $18, what_you_will_learn = $19, is_featured = $20, \
                 is_published = $21, published_at = $22, updated_at = $23 \
             WHERE id = $1 \
             RETURNING {COURSE_COLUMNS}"
        );
        sqlx::query_as::<_, CourseRecord>(&sql)
            .bind(course.id)
            .bind(&course.title)
            .bind(&course.title_en)
            .bind(&course.title_fa)
            .bind(&course.slug)
            .bind(&course.description)
            .bind(&course.short_description)
            .bind(&course.thumbnail)
            .bind(&course.preview_video)
            .bind(course.price)
            .bind(course.original_price)
            .bind(course.level)
            .bind(course.status)
            .bind(&course.language)
            .bind(course.duration)
            .bind(course.category_id)
            .bind(Json(&course.tags))
            .bind(Json(&course.requirements))
            .bind(Json(&course.what_you_will_learn))
            .bind(course.is_featured)
            .bind(course.is_published)
            .bind(course.published_at)
            .bind(course.updated_at)
            .fetch_one(self.pool())
            .await
            .map_err(map_sqlx_error)
    }

    async fn delete_course(&self, id: Uuid) -> Result<bool, RepoError> {
        // Lessons, enrollments, reviews and wishlist rows go via ON DELETE CASCADE.
        let result = sqlx::query("DELETE FROM courses WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await
            .map_err(map_sqlx_error)?;
        Ok(result.rows_affected() > 0)
    }

    async fn refresh_course_stats(&self, id: Uuid) -> Result<CourseRecord, RepoError> {
        let sql = format!(
            "UPDATE courses SET \
                 lessons_count = (SELECT COUNT(*) FROM lessons WHERE course_id = $1), \
                 students_count = (SELECT COUNT(*) FROM enrollments WHERE course_id = $1), \
                 reviews_count = (SELECT COUNT(*) FROM reviews \
                     WHERE course_id = $1 AND is_published), \
                 rating = COALESCE((SELECT ROUND(AVG(rating), 2) FROM reviews \
                     WHERE course_id = $1 AND is_published), 0) \
             WHERE id = $1 \
             RETURNING {COURSE_COLUMNS}"
        );
        sqlx::query_as::<_, CourseRecord>(&sql)
            .bind(id)
            .fetch_one(self.pool())
            .await
            .map_err(map_sqlx_error)
    }

    async fn count_courses_by_status(&self) -> Result<Vec<(CourseStatus, u64)>, RepoError> {
        let rows: Vec<(CourseStatus, i64)> =
            sqlx::query_as("SELECT status, COUNT(*) FROM courses GROUP BY status ORDER BY status")
                .fetch_all(self.pool())
                .await
                .map_err(map_sqlx_error)?;
        rows.into_iter()
            .map(|(status, count)| Ok((status, count_to_u64(count)?)))
            .collect()
    }
}

#[async_trait]
impl LessonsRepo for PostgresRepositories {
    async fn list_lessons(&self, course_id: Uuid) -> Result<Vec<LessonRecord>, RepoError> {
        let sql = format!(
            "SELECT {LESSON_COLUMNS} FROM lessons WHERE course_id = $1 \
             ORDER BY order_index, created_at"
        );
        sqlx::query_as::<_, LessonRecord>(&sql)
            .bind(course_id)
            .fetch_all(self.pool())
            .await
            .map_err(map_sqlx_error)
    }

    async fn find_lesson(&self, id: Uuid) -> Result<Option<LessonRecord>, RepoError> {
        let sql = format!("SELECT {LESSON_COLUMNS} FROM lessons WHERE id = $1");
        sqlx::query_as::<_, LessonRecord>(&sql)
            .bind(id)
            .fetch_optional(self.pool())
            .await
            .map_err(map_sqlx_error)
    }

    async fn create_lesson(&self, params: CreateLessonParams) -> Result<LessonRecord, RepoError> {
        let sql = format!(
            "INSERT INTO lessons (id, course_id, title, description, video_url, duration, \
                 order_index, is_free) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING {LESSON_COLUMNS}"
        );
        sqlx::query_as::<_, LessonRecord>(&sql)
            .bind(Uuid::new_v4())
            .bind(params.course_id)
            .bind(params.title)
            .bind(params.description)
            .bind(params.video_url)
            .bind(params.duration)
            .bind(params.order_index)
            .bind(params.is_free)
            .fetch_one(self.pool())
            .await
            .map_err(map_sqlx_error)
    }

    async fn update_lesson(&self, lesson: &LessonRecord) -> Result<LessonRecord, RepoError> {
        let sql = format!(
            "UPDATE lessons SET title = $2, description = $3, video_url = $4, duration = $5, \
                 order_index = $6, is_free = $7, updated_at = $8 \
             WHERE id = $1 \
             RETURNING {LESSON_COLUMNS}"
        );
        sqlx::query_as::<_, LessonRecord>(&sql)
            .bind(lesson.id)
            .bind(&lesson.title)
            .bind(&lesson.description)
            .bind(&lesson.video_url)
            .bind(lesson.duration)
            .bind(lesson.order_index)
            .bind(lesson.is_free)
            .bind(lesson.updated_at)
            .fetch_one(self.pool())
            .await
            .map_err(map_sqlx_error)
    }

    async fn delete_lesson(&self, id: Uuid) -> Result<bool, RepoError> {
        let result = sqlx::query("DELETE FROM lessons WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await
            .map_err(map_sqlx_error)?;
        Ok(result.rows_affected() > 0)
    }
}
