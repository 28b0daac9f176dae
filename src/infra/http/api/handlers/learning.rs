//! Enrollment, progress and wishlist handlers for the signed-in student.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use uuid::Uuid;

use crate::infra::http::api::error::ApiError;
use crate::infra::http::api::extract::{ApiPath, RequireUser};
use crate::infra::http::api::models::*;
use crate::infra::http::api::state::ApiState;

use super::{enrollment_to_api, wishlist_to_api};

pub async fn enroll(
    State(state): State<ApiState>,
    RequireUser(actor): RequireUser,
    ApiPath(course_id): ApiPath<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let enrollment = state
        .enrollments
        .enroll(&actor, course_id)
        .await
        .map_err(enrollment_to_api)?;
    Ok((StatusCode::CREATED, Json(enrollment)))
}

pub async fn my_enrollments(
    State(state): State<ApiState>,
    RequireUser(actor): RequireUser,
) -> Result<impl IntoResponse, ApiError> {
    let enrollments = state
        .enrollments
        .my_enrollments(&actor)
        .await
        .map_err(enrollment_to_api)?;
    Ok(Json(enrollments))
}

pub async fn my_payments(
    State(state): State<ApiState>,
    RequireUser(actor): RequireUser,
) -> Result<impl IntoResponse, ApiError> {
    let payments = state
        .enrollments
        .my_payments(&actor)
        .await
        .map_err(enrollment_to_api)?;
    Ok(Json(payments))
}

pub async fn complete_lesson(
    State(state): State<ApiState>,
    RequireUser(actor): RequireUser,
    ApiPath((enrollment_id, lesson_id)): ApiPath<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, ApiError> {
    let enrollment = state
        .enrollments
        .complete_lesson(&actor, enrollment_id, lesson_id)
        .await
        .map_err(enrollment_to_api)?;
    Ok(Json(enrollment))
}

pub async fn my_wishlist(
    State(state): State<ApiState>,
    RequireUser(actor): RequireUser,
) -> Result<impl IntoResponse, ApiError> {
    let wishlist = state
        .wishlist
        .my_wishlist(&actor)
        .await
        .map_err(wishlist_to_api)?;
    Ok(Json(wishlist))
}

pub async fn wishlist_status(
    State(state): State<ApiState>,
    RequireUser(actor): RequireUser,
    ApiPath(course_id): ApiPath<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let in_wishlist = state
        .wishlist
        .contains(&actor, course_id)
        .await
        .map_err(wishlist_to_api)?;
    Ok(Json(WishlistStatusResponse { in_wishlist }))
}

pub async fn add_to_wishlist(
    State(state): State<ApiState>,
    RequireUser(actor): RequireUser,
    ApiPath(course_id): ApiPath<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let entry = state
        .wishlist
        .add(&actor, course_id)
        .await
        .map_err(wishlist_to_api)?;
    Ok((StatusCode::CREATED, Json(entry)))
}

pub async fn remove_from_wishlist(
    State(state): State<ApiState>,
    RequireUser(actor): RequireUser,
    ApiPath(course_id): ApiPath<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .wishlist
        .remove(&actor, course_id)
        .await
        .map_err(wishlist_to_api)?;
    Ok(StatusCode::NO_CONTENT)
}
