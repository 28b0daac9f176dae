use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use uuid::Uuid;

use crate::infra::http::api::error::ApiError;
use crate::infra::http::api::extract::{ApiJson, ApiPath, RequireUser};
use crate::infra::http::api::models::*;
use crate::infra::http::api::state::ApiState;

use super::review_to_api;

pub async fn list_reviews(
    State(state): State<ApiState>,
    ApiPath(course_id): ApiPath<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let reviews = state
        .reviews
        .list(course_id)
        .await
        .map_err(review_to_api)?;
    Ok(Json(reviews))
}

pub async fn create_review(
    State(state): State<ApiState>,
    RequireUser(actor): RequireUser,
    ApiPath(course_id): ApiPath<Uuid>,
    ApiJson(payload): ApiJson<ReviewCreateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let review = state
        .reviews
        .create(&actor, course_id, payload.into())
        .await
        .map_err(review_to_api)?;
    Ok((StatusCode::CREATED, Json(review)))
}

pub async fn delete_review(
    State(state): State<ApiState>,
    RequireUser(actor): RequireUser,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .reviews
        .delete(&actor, id)
        .await
        .map_err(review_to_api)?;
    Ok(StatusCode::NO_CONTENT)
}
