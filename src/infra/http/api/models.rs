use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::application::auth::RegisterCommand;
use crate::application::blog::{
    CreateBlogPostCommand, CreateCommentCommand, UpdateBlogPostCommand,
};
use crate::application::categories::{CreateCategoryCommand, UpdateCategoryCommand};
use crate::application::courses::{CreateCourseCommand, UpdateCourseCommand};
use crate::application::lessons::{CreateLessonCommand, UpdateLessonCommand};
use crate::application::reviews::CreateReviewCommand;
use crate::application::users::AdminUserUpdate;
use crate::domain::types::{CourseLevel, CourseStatus, UserRole};

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub role: Option<UserRole>,
}

impl From<RegisterRequest> for RegisterCommand {
    fn from(request: RegisterRequest) -> Self {
        Self {
            username: request.username,
            email: request.email,
            password: request.password,
            first_name: request.first_name,
            last_name: request.last_name,
            role: request.role,
        }
    }
}

/// `username` also accepts an email address.
#[derive(Debug, Deserialize, Serialize)]
pub struct LoginRequest {
    #[serde(alias = "email")]
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WishlistStatusResponse {
    pub in_wishlist: bool,
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryCreateRequest {
    pub name: String,
    pub name_en: Option<String>,
    pub name_fa: Option<String>,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub color: Option<String>,
    pub is_active: Option<bool>,
}

impl From<CategoryCreateRequest> for CreateCategoryCommand {
    fn from(request: CategoryCreateRequest) -> Self {
        Self {
            name: request.name,
            name_en: request.name_en,
            name_fa: request.name_fa,
            slug: request.slug,
            description: request.description,
            icon: request.icon,
            color: request.color,
            is_active: request.is_active,
        }
    }
}

#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryUpdateRequest {
    pub name: Option<String>,
    pub name_en: Option<String>,
    pub name_fa: Option<String>,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub color: Option<String>,
    pub is_active: Option<bool>,
}

impl From<CategoryUpdateRequest> for UpdateCategoryCommand {
    fn from(request: CategoryUpdateRequest) -> Self {
        Self {
            name: request.name,
            name_en: request.name_en,
            name_fa: request.name_fa,
            slug: request.slug,
            description: request.description,
            icon: request.icon,
            color: request.color,
            is_active: request.is_active,
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseCreateRequest {
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
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub requirements: Vec<String>,
    #[serde(default)]
    pub what_you_will_learn: Vec<String>,
    pub is_featured: Option<bool>,
    pub is_published: Option<bool>,
}

impl From<CourseCreateRequest> for CreateCourseCommand {
    fn from(request: CourseCreateRequest) -> Self {
        Self {
            title: request.title,
            title_en: request.title_en,
            title_fa: request.title_fa,
            slug: request.slug,
            description: request.description,
            short_description: request.short_description,
            thumbnail: request.thumbnail,
            preview_video: request.preview_video,
            price: request.price,
            original_price: request.original_price,
            level: request.level,
            status: request.status,
            language: request.language,
            duration: request.duration,
            category_id: request.category_id,
            tags: request.tags,
            requirements: request.requirements,
            what_you_will_learn: request.what_you_will_learn,
            is_featured: request.is_featured,
            is_published: request.is_published,
        }
    }
}

#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseUpdateRequest {
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

impl From<CourseUpdateRequest> for UpdateCourseCommand {
    fn from(request: CourseUpdateRequest) -> Self {
        Self {
            title: request.title,
            title_en: request.title_en,
            title_fa: request.title_fa,
            slug: request.slug,
            description: request.description,
            short_description: request.short_description,
            thumbnail: request.thumbnail,
            preview_video: request.preview_video,
            price: request.price,
            original_price: request.original_price,
            level: request.level,
            status: request.status,
            language: request.language,
            duration: request.duration,
            category_id: request.category_id,
            tags: request.tags,
            requirements: request.requirements,
            what_you_will_learn: request.what_you_will_learn,
            is_featured: request.is_featured,
            is_published: request.is_published,
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonCreateRequest {
    pub title: String,
    pub description: Option<String>,
    pub video_url: Option<String>,
    pub duration: Option<i32>,
    pub order_index: Option<i32>,
    pub is_free: Option<bool>,
}

impl From<LessonCreateRequest> for CreateLessonCommand {
    fn from(request: LessonCreateRequest) -> Self {
        Self {
            title: request.title,
            description: request.description,
            video_url: request.video_url,
            duration: request.duration,
            order_index: request.order_index,
            is_free: request.is_free,
        }
    }
}

#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonUpdateRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub video_url: Option<String>,
    pub duration: Option<i32>,
    pub order_index: Option<i32>,
    pub is_free: Option<bool>,
}

impl From<LessonUpdateRequest> for UpdateLessonCommand {
    fn from(request: LessonUpdateRequest) -> Self {
        Self {
            title: request.title,
            description: request.description,
            video_url: request.video_url,
            duration: request.duration,
            order_index: request.order_index,
            is_free: request.is_free,
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct ReviewCreateRequest {
    pub rating: i32,
    pub comment: Option<String>,
}

impl From<ReviewCreateRequest> for CreateReviewCommand {
    fn from(request: ReviewCreateRequest) -> Self {
        Self {
            rating: request.rating,
            comment: request.comment,
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogPostCreateRequest {
    pub title: String,
    pub title_en: Option<String>,
    pub title_fa: Option<String>,
    pub slug: Option<String>,
    pub excerpt: Option<String>,
    pub content: String,
    pub thumbnail: Option<String>,
    pub category_id: Option<Uuid>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub is_published: Option<bool>,
    pub is_featured: Option<bool>,
}

impl From<BlogPostCreateRequest> for CreateBlogPostCommand {
    fn from(request: BlogPostCreateRequest) -> Self {
        Self {
            title: request.title,
            title_en: request.title_en,
            title_fa: request.title_fa,
            slug: request.slug,
            excerpt: request.excerpt,
            content: request.content,
            thumbnail: request.thumbnail,
            category_id: request.category_id,
            tags: request.tags,
            is_published: request.is_published,
            is_featured: request.is_featured,
        }
    }
}

#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogPostUpdateRequest {
    pub title: Option<String>,
    pub title_en: Option<String>,
    pub title_fa: Option<String>,
    pub slug: Option<String>,
    pub excerpt: Option<String>,
    pub content: Option<String>,
    pub thumbnail: Option<String>,
    pub category_id: Option<Uuid>,
    pub tags: Option<Vec<String>>,
    pub is_published: Option<bool>,
    pub is_featured: Option<bool>,
}

impl From<BlogPostUpdateRequest> for UpdateBlogPostCommand {
    fn from(request: BlogPostUpdateRequest) -> Self {
        Self {
            title: request.title,
            title_en: request.title_en,
            title_fa: request.title_fa,
            slug: request.slug,
            excerpt: request.excerpt,
            content: request.content,
            thumbnail: request.thumbnail,
            category_id: request.category_id,
            tags: request.tags,
            is_published: request.is_published,
            is_featured: request.is_featured,
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentCreateRequest {
    pub content: String,
    pub parent_id: Option<Uuid>,
}

impl From<CommentCreateRequest> for CreateCommentCommand {
    fn from(request: CommentCreateRequest) -> Self {
        Self {
            content: request.content,
            parent_id: request.parent_id,
        }
    }
}

#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserAdminUpdateRequest {
    pub role: Option<UserRole>,
    pub is_active: Option<bool>,
}

impl From<UserAdminUpdateRequest> for AdminUserUpdate {
    fn from(request: UserAdminUpdateRequest) -> Self {
        Self {
            role: request.role,
            is_active: request.is_active,
        }
    }
}
