use std::collections::BTreeMap;

use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::application::pagination::PageRequest;
use crate::application::repos::{
    CategoriesRepo, CourseQueryFilter, CoursesRepo, CreateCategoryParams, CreateCourseParams,
    CreateLessonParams, LessonsRepo, RepoError, constraints,
};
use crate::domain::entities::{CategoryRecord, CourseRecord, CourseStats, LessonRecord};
use crate::domain::money::average_rating;
use crate::domain::types::CourseStatus;

use super::MemoryRepositories;
use super::lock::{read_table, write_table};
use super::{page_slice, replace_row};

impl MemoryRepositories {
    fn course_stats(&self, course_id: Uuid) -> CourseStats {
        let lessons_count = read_table(&self.lessons, "lessons")
            .iter()
            .filter(|lesson| lesson.course_id == course_id)
            .count();
        let students_count = read_table(&self.enrollments, "enrollments")
            .iter()
            .filter(|enrollment| enrollment.course_id == course_id)
            .count();
        let (reviews_count, total) = read_table(&self.reviews, "reviews")
            .iter()
            .filter(|review| review.course_id == course_id && review.is_published)
            .fold((0i64, 0i64), |(count, total), review| {
                (count + 1, total + i64::from(review.rating))
            });

        CourseStats {
            lessons_count: clamp_count(lessons_count),
            students_count: clamp_count(students_count),
            reviews_count: i32::try_from(reviews_count).unwrap_or(i32::MAX),
            rating: average_rating(total, reviews_count),
        }
    }
}

fn clamp_count(count: usize) -> i32 {
    i32::try_from(count).unwrap_or(i32::MAX)
}

#[async_trait]
impl CategoriesRepo for MemoryRepositories {
    async fn list_categories(&self, active_only: bool) -> Result<Vec<CategoryRecord>, RepoError> {
        let categories = read_table(&self.categories, "categories");
        Ok(categories
            .iter()
            .filter(|category| !active_only || category.is_active)
            .cloned()
            .collect())
    }

    async fn find_category(&self, id: Uuid) -> Result<Option<CategoryRecord>, RepoError> {
        let categories = read_table(&self.categories, "categories");
        Ok(categories.iter().find(|category| category.id == id).cloned())
    }

    async fn find_category_by_slug(
        &self,
        slug: &str,
    ) -> Result<Option<CategoryRecord>, RepoError> {
        let categories = read_table(&self.categories, "categories");
        Ok(categories
            .iter()
            .find(|category| category.slug == slug)
            .cloned())
    }

    async fn create_category(
        &self,
        params: CreateCategoryParams,
    ) -> Result<CategoryRecord, RepoError> {
        let mut categories = write_table(&self.categories, "categories");
        if categories.iter().any(|category| category.slug == params.slug) {
            return Err(RepoError::duplicate(constraints::CATEGORIES_SLUG));
        }
        let category = CategoryRecord {
            id: Uuid::new_v4(),
            name: params.name,
            name_en: params.name_en,
            name_fa: params.name_fa,
            slug: params.slug,
            description: params.description,
            icon: params.icon,
            color: params.color,
            is_active: params.is_active,
            created_at: OffsetDateTime::now_utc(),
        };
        categories.push(category.clone());
        Ok(category)
    }

    async fn update_category(
        &self,
        category: &CategoryRecord,
    ) -> Result<CategoryRecord, RepoError> {
        let mut categories = write_table(&self.categories, "categories");
        if categories
            .iter()
            .any(|other| other.id != category.id && other.slug == category.slug)
        {
            return Err(RepoError::duplicate(constraints::CATEGORIES_SLUG));
        }
        replace_row(&mut categories, category, |row| row.id)
    }

    async fn delete_category(&self, id: Uuid) -> Result<bool, RepoError> {
        let mut categories = write_table(&self.categories, "categories");
        let before = categories.len();
        categories.retain(|category| category.id != id);
        Ok(categories.len() != before)
    }

    async fn category_in_use(&self, id: Uuid) -> Result<bool, RepoError> {
        let used_by_course = read_table(&self.courses, "courses")
            .iter()
            .any(|course| course.category_id == id);
        if used_by_course {
            return Ok(true);
        }
        Ok(read_table(&self.blog_posts, "blog_posts")
            .iter()
            .any(|post| post.category_id == Some(id)))
    }
}

#[async_trait]
impl CoursesRepo for MemoryRepositories {
    async fn list_courses(
        &self,
        filter: &CourseQueryFilter,
        page: PageRequest,
    ) -> Result<Vec<CourseRecord>, RepoError> {
        let courses = read_table(&self.courses, "courses");
        Ok(page_slice(
            courses
                .iter()
                .filter(|course| filter.matches(course))
                .cloned(),
            page,
        ))
    }

    async fn find_course(&self, id: Uuid) -> Result<Option<CourseRecord>, RepoError> {
        let courses = read_table(&self.courses, "courses");
        Ok(courses.iter().find(|course| course.id == id).cloned())
    }

    async fn find_course_by_slug(&self, slug: &str) -> Result<Option<CourseRecord>, RepoError> {
        let courses = read_table(&self.courses, "courses");
        Ok(courses.iter().find(|course| course.slug == slug).cloned())
    }

    async fn create_course(&self, params: CreateCourseParams) -> Result<CourseRecord, RepoError> {
        let mut courses = write_table(&self.courses, "courses");
        if courses.iter().any(|course| course.slug == params.slug) {
            return Err(RepoError::duplicate(constraints::COURSES_SLUG));
        }
        let now = OffsetDateTime::now_utc();
        let course = CourseRecord {
            id: Uuid::new_v4(),
            title: params.title,
            title_en: params.title_en,
            title_fa: params.title_fa,
            slug: params.slug,
            description: params.description,
            short_description: params.short_description,
            thumbnail: params.thumbnail,
            preview_video: params.preview_video,
            price: params.price,
            original_price: params.original_price,
            level: params.level,
            status: params.status,
            language: params.language,
            duration: params.duration,
            lessons_count: 0,
            students_count: 0,
            rating: average_rating(0, 0),
            reviews_count: 0,
            instructor_id: params.instructor_id,
            category_id: params.category_id,
            tags: params.tags,
            requirements: params.requirements,
            what_you_will_learn: params.what_you_will_learn,
            is_featured: params.is_featured,
            is_published: params.is_published,
            published_at: params.published_at,
            created_at: now,
            updated_at: now,
        };
        courses.push(course.clone());
        Ok(course)
    }

    async fn update_course(&self, course: &CourseRecord) -> Result<CourseRecord, RepoError> {
        let mut courses = write_table(&self.courses, "courses");
        if courses
            .iter()
            .any(|other| other.id != course.id && other.slug == course.slug)
        {
            return Err(RepoError::duplicate(constraints::COURSES_SLUG));
        }
        let slot = courses
            .iter_mut()
            .find(|row| row.id == course.id)
            .ok_or(RepoError::NotFound)?;

        let mut updated = course.clone();
        updated.lessons_count = slot.lessons_count;
        updated.students_count = slot.students_count;
        updated.reviews_count = slot.reviews_count;
        updated.rating = slot.rating;
        *slot = updated.clone();
        Ok(updated)
    }

    async fn delete_course(&self, id: Uuid) -> Result<bool, RepoError> {
        {
            let mut courses = write_table(&self.courses, "courses");
            let before = courses.len();
            courses.retain(|course| course.id != id);
            if courses.len() == before {
                return Ok(false);
            }
        }
        write_table(&self.lessons, "lessons").retain(|lesson| lesson.course_id != id);
        write_table(&self.enrollments, "enrollments")
            .retain(|enrollment| enrollment.course_id != id);
        write_table(&self.reviews, "reviews").retain(|review| review.course_id != id);
        write_table(&self.wishlist, "wishlist").retain(|entry| entry.course_id != id);
        Ok(true)
    }

    async fn refresh_course_stats(&self, id: Uuid) -> Result<CourseRecord, RepoError> {
        let stats = self.course_stats(id);
        let mut courses = write_table(&self.courses, "courses");
        let course = courses
            .iter_mut()
            .find(|course| course.id == id)
            .ok_or(RepoError::NotFound)?;
        course.lessons_count = stats.lessons_count;
        course.students_count = stats.students_count;
        course.reviews_count = stats.reviews_count;
        course.rating = stats.rating;
        Ok(course.clone())
    }

    async fn count_courses_by_status(&self) -> Result<Vec<(CourseStatus, u64)>, RepoError> {
        let courses = read_table(&self.courses, "courses");
        let mut counts: BTreeMap<CourseStatus, u64> = BTreeMap::new();
        for course in courses.iter() {
            *counts.entry(course.status).or_default() += 1;
        }
        Ok(counts.into_iter().collect())
    }
}

#[async_trait]
impl LessonsRepo for MemoryRepositories {
    async fn list_lessons(&self, course_id: Uuid) -> Result<Vec<LessonRecord>, RepoError> {
        let lessons = read_table(&self.lessons, "lessons");
        let mut rows: Vec<LessonRecord> = lessons
            .iter()
            .filter(|lesson| lesson.course_id == course_id)
            .cloned()
            .collect();
        rows.sort_by_key(|lesson| lesson.order_index);
        Ok(rows)
    }

    async fn find_lesson(&self, id: Uuid) -> Result<Option<LessonRecord>, RepoError> {
        let lessons = read_table(&self.lessons, "lessons");
        Ok(lessons.iter().find(|lesson| lesson.id == id).cloned())
    }

    async fn create_lesson(&self, params: CreateLessonParams) -> Result<LessonRecord, RepoError> {
        let now = OffsetDateTime::now_utc();
        let lesson = LessonRecord {
            id: Uuid::new_v4(),
            course_id: params.course_id,
            title: params.title,
            description: params.description,
            video_url: params.video_url,
            duration: params.duration,
            order_index: params.order_index,
            is_free: params.is_free,
            created_at: now,
            updated_at: now,
        };
        write_table(&self.lessons, "lessons").push(lesson.clone());
        Ok(lesson)
    }

    async fn update_lesson(&self, lesson: &LessonRecord) -> Result<LessonRecord, RepoError> {
        let mut lessons = write_table(&self.lessons, "lessons");
        replace_row(&mut lessons, lesson, |row| row.id)
    }

    async fn delete_lesson(&self, id: Uuid) -> Result<bool, RepoError> {
        let mut lessons = write_table(&self.lessons, "lessons");
        let before = lessons.len();
        lessons.retain(|lesson| lesson.id != id);
        Ok(lessons.len() != before)
    }
}
