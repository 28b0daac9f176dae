//! Course catalog and authoring handlers.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use uuid::Uuid;

use crate::application::pagination::{COURSE_PAGE_LIMIT, PageRequest};
use crate::infra::http::api::error::ApiError;
use crate::infra::http::api::extract::{ApiJson, ApiPath, ApiQuery, RequireUser};
use crate::infra::http::api::models::*;
use crate::infra::http::api::state::ApiState;

use super::{CourseListQuery, course_to_api};

pub async fn list_courses(
    State(state): State<ApiState>,
    ApiQuery(query): ApiQuery<CourseListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let page = PageRequest::new(query.limit, query.offset, COURSE_PAGE_LIMIT);
    let courses = state
        .courses
        .list(&query.filter(), page)
        .await
        .map_err(course_to_api)?;
    Ok(Json(courses))
}

pub async fn get_course(
    State(state): State<ApiState>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let detail = state.courses.detail(id).await.map_err(course_to_api)?;
    Ok(Json(detail))
}

pub async fn get_course_by_slug(
    State(state): State<ApiState>,
    ApiPath(slug): ApiPath<String>,
) -> Result<impl IntoResponse, ApiError> {
    let detail = state
        .courses
        .detail_by_slug(&slug)
        .await
        .map_err(course_to_api)?;
    Ok(Json(detail))
}

pub async fn create_course(
    State(state): State<ApiState>,
    RequireUser(actor): RequireUser,
    ApiJson(payload): ApiJson<CourseCreateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let course = state
        .courses
        .create(&actor, payload.into())
        .await
        .map_err(course_to_api)?;
    Ok((StatusCode::CREATED, Json(course)))
}

pub async fn update_course(
    State(state): State<ApiState>,
    RequireUser(actor): RequireUser,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(payload): ApiJson<CourseUpdateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let course = state
        .courses
        .update(&actor, id, payload.into())
        .await
        .map_err(course_to_api)?;
    Ok(Json(course))
}

pub async fn delete_course(
    State(state): State<ApiState>,
    RequireUser(actor): RequireUser,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .courses
        .delete(&actor, id)
        .await
        .map_err(course_to_api)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn submit_course(
    State(state): State<ApiState>,
    RequireUser(actor): RequireUser,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let course = state
        .courses
        .submit(&actor, id)
        .await
        .map_err(course_to_api)?;
    Ok(Json(course))
}
