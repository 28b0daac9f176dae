use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use uuid::Uuid;

use crate::application::pagination::{BLOG_PAGE_LIMIT, PageRequest};
use crate::infra::http::api::error::ApiError;
use crate::infra::http::api::extract::{ApiJson, ApiPath, ApiQuery, MaybeUser, RequireUser};
use crate::infra::http::api::models::*;
use crate::infra::http::api::state::ApiState;

use super::{BlogListQuery, blog_to_api};

pub async fn list_blog_posts(
    State(state): State<ApiState>,
    MaybeUser(viewer): MaybeUser,
    ApiQuery(query): ApiQuery<BlogListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let page = PageRequest::new(query.limit, query.offset, BLOG_PAGE_LIMIT);
    let posts = state
        .blog
        .list(viewer.as_ref(), query.filter(), page)
        .await
        .map_err(blog_to_api)?;
    Ok(Json(posts))
}

pub async fn get_blog_post(
    State(state): State<ApiState>,
    MaybeUser(viewer): MaybeUser,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let detail = state
        .blog
        .read(viewer.as_ref(), id)
        .await
        .map_err(blog_to_api)?;
    Ok(Json(detail))
}

pub async fn create_blog_post(
    State(state): State<ApiState>,
    RequireUser(actor): RequireUser,
    ApiJson(payload): ApiJson<BlogPostCreateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let post = state
        .blog
        .create(&actor, payload.into())
        .await
        .map_err(blog_to_api)?;
    Ok((StatusCode::CREATED, Json(post)))
}

pub async fn update_blog_post(
    State(state): State<ApiState>,
    RequireUser(actor): RequireUser,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(payload): ApiJson<BlogPostUpdateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let post = state
        .blog
        .update(&actor, id, payload.into())
        .await
        .map_err(blog_to_api)?;
    Ok(Json(post))
}

pub async fn delete_blog_post(
    State(state): State<ApiState>,
    RequireUser(actor): RequireUser,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    state.blog.delete(&actor, id).await.map_err(blog_to_api)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn create_comment(
    State(state): State<ApiState>,
    RequireUser(actor): RequireUser,
    ApiPath(post_id): ApiPath<Uuid>,
    ApiJson(payload): ApiJson<CommentCreateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let comment = state
        .blog
        .add_comment(&actor, post_id, payload.into())
        .await
        .map_err(blog_to_api)?;
    Ok((StatusCode::CREATED, Json(comment)))
}

pub async fn delete_comment(
    State(state): State<ApiState>,
    RequireUser(actor): RequireUser,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .blog
        .delete_comment(&actor, id)
        .await
        .map_err(blog_to_api)?;
    Ok(StatusCode::NO_CONTENT)
}
