use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use uuid::Uuid;

use crate::infra::http::api::error::ApiError;
use crate::infra::http::api::extract::{ApiJson, ApiPath, RequireUser};
use crate::infra::http::api::models::*;
use crate::infra::http::api::state::ApiState;

use super::category_to_api;

pub async fn list_categories(State(state): State<ApiState>) -> Result<impl IntoResponse, ApiError> {
    let categories = state
        .categories
        .list_active()
        .await
        .map_err(category_to_api)?;
    Ok(Json(categories))
}

pub async fn get_category(
    State(state): State<ApiState>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let category = state.categories.get(id).await.map_err(category_to_api)?;
    Ok(Json(category))
}

pub async fn create_category(
    State(state): State<ApiState>,
    RequireUser(actor): RequireUser,
    ApiJson(payload): ApiJson<CategoryCreateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let category = state
        .categories
        .create(&actor, payload.into())
        .await
        .map_err(category_to_api)?;
    Ok((StatusCode::CREATED, Json(category)))
}

pub async fn update_category(
    State(state): State<ApiState>,
    RequireUser(actor): RequireUser,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(payload): ApiJson<CategoryUpdateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let category = state
        .categories
        .update(&actor, id, payload.into())
        .await
        .map_err(category_to_api)?;
    Ok(Json(category))
}

pub async fn delete_category(
    State(state): State<ApiState>,
    RequireUser(actor): RequireUser,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .categories
        .delete(&actor, id)
        .await
        .map_err(category_to_api)?;
    Ok(StatusCode::NO_CONTENT)
}
