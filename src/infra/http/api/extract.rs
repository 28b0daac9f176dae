//! Extractors that reject with `ApiError` instead of axum's plain-text
//! rejections, plus the session-backed user extractors.

use axum::extract::{FromRequest, FromRequestParts};
use axum::http::request::Parts;

use crate::domain::entities::UserRecord;

use super::error::ApiError;

#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
pub struct ApiQuery<T>(pub T);

#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
pub struct ApiPath<T>(pub T);

/// The user resolved from the session cookie, inserted by `resolve_session`.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub UserRecord);

/// Requires a signed-in user; answers 401 otherwise.
#[derive(Debug, Clone)]
pub struct RequireUser(pub UserRecord);

impl<S> FromRequestParts<S> for RequireUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentUser>()
            .map(|current| RequireUser(current.0.clone()))
            .ok_or_else(ApiError::unauthorized)
    }
}

/// The signed-in user when there is one.
#[derive(Debug, Clone)]
pub struct MaybeUser(pub Option<UserRecord>);

impl<S> FromRequestParts<S> for MaybeUser
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(MaybeUser(
            parts
                .extensions
                .get::<CurrentUser>()
                .map(|current| current.0.clone()),
        ))
    }
}
