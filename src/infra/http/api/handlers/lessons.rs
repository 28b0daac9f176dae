use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use uuid::Uuid;

use crate::infra::http::api::error::ApiError;
use crate::infra::http::api::extract::{ApiJson, ApiPath, RequireUser};
use crate::infra::http::api::models::*;
use crate::infra::http::api::state::ApiState;

use super::lesson_to_api;

pub async fn list_lessons(
    State(state): State<ApiState>,
    ApiPath(course_id): ApiPath<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let lessons = state
        .lessons
        .list(course_id)
        .await
        .map_err(lesson_to_api)?;
    Ok(Json(lessons))
}

pub async fn create_lesson(
    State(state): State<ApiState>,
    RequireUser(actor): RequireUser,
    ApiPath(course_id): ApiPath<Uuid>,
    ApiJson(payload): ApiJson<LessonCreateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let lesson = state
        .lessons
        .create(&actor, course_id, payload.into())
        .await
        .map_err(lesson_to_api)?;
    Ok((StatusCode::CREATED, Json(lesson)))
}

pub async fn update_lesson(
    State(state): State<ApiState>,
    RequireUser(actor): RequireUser,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(payload): ApiJson<LessonUpdateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let lesson = state
        .lessons
        .update(&actor, id, payload.into())
        .await
        .map_err(lesson_to_api)?;
    Ok(Json(lesson))
}

pub async fn delete_lesson(
    State(state): State<ApiState>,
    RequireUser(actor): RequireUser,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .lessons
        .delete(&actor, id)
        .await
        .map_err(lesson_to_api)?;
    Ok(StatusCode::NO_CONTENT)
}
