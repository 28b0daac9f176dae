//! Admin dashboard handlers plus the public instructor directory.

use axum::Json;
use axum::extract::State;
use axum::response::IntoResponse;
use uuid::Uuid;

use crate::application::pagination::{COURSE_PAGE_LIMIT, PageRequest, USER_PAGE_LIMIT};
use crate::infra::http::api::error::ApiError;
use crate::infra::http::api::extract::{ApiJson, ApiPath, ApiQuery, RequireUser};
use crate::infra::http::api::models::*;
use crate::infra::http::api::state::ApiState;

use super::{PageQuery, UserListQuery, course_to_api, dashboard_to_api, user_to_api};

pub async fn list_instructors(State(state): State<ApiState>) -> Result<impl IntoResponse, ApiError> {
    let instructors = state.users.instructors().await.map_err(user_to_api)?;
    Ok(Json(instructors))
}

pub async fn admin_stats(
    State(state): State<ApiState>,
    RequireUser(actor): RequireUser,
) -> Result<impl IntoResponse, ApiError> {
    let stats = state
        .dashboard
        .stats(&actor)
        .await
        .map_err(dashboard_to_api)?;
    Ok(Json(stats))
}

pub async fn admin_list_users(
    State(state): State<ApiState>,
    RequireUser(actor): RequireUser,
    ApiQuery(query): ApiQuery<UserListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let page = PageRequest::new(query.limit, query.offset, USER_PAGE_LIMIT);
    let users = state
        .users
        .list(&actor, query.role, page)
        .await
        .map_err(user_to_api)?;
    Ok(Json(users))
}

pub async fn admin_update_user(
    State(state): State<ApiState>,
    RequireUser(actor): RequireUser,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(payload): ApiJson<UserAdminUpdateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let user = state
        .users
        .update(&actor, id, payload.into())
        .await
        .map_err(user_to_api)?;
    Ok(Json(user))
}

pub async fn admin_pending_courses(
    State(state): State<ApiState>,
    RequireUser(actor): RequireUser,
    ApiQuery(query): ApiQuery<PageQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let page = PageRequest::new(query.limit, query.offset, COURSE_PAGE_LIMIT);
    let courses = state
        .dashboard
        .pending_courses(&actor, page)
        .await
        .map_err(dashboard_to_api)?;
    Ok(Json(courses))
}

pub async fn admin_approve_course(
    State(state): State<ApiState>,
    RequireUser(actor): RequireUser,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let course = state
        .courses
        .approve(&actor, id)
        .await
        .map_err(course_to_api)?;
    Ok(Json(course))
}

pub async fn admin_reject_course(
    State(state): State<ApiState>,
    RequireUser(actor): RequireUser,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let course = state
        .courses
        .reject(&actor, id)
        .await
        .map_err(course_to_api)?;
    Ok(Json(course))
}
