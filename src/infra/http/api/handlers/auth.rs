use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum_extra::extract::CookieJar;
use axum_extra::extract::cookie::{Cookie, SameSite};

use crate::application::auth::SignedIn;
use crate::domain::entities::UserRecord;
use crate::infra::http::api::error::ApiError;
use crate::infra::http::api::extract::{ApiJson, RequireUser};
use crate::infra::http::api::models::*;
use crate::infra::http::api::state::ApiState;

use super::auth_to_api;

fn session_cookie(state: &ApiState, token: String) -> Cookie<'static> {
    let max_age =
        time::Duration::try_from(state.auth.sessions().ttl()).unwrap_or(time::Duration::MAX);
    Cookie::build((state.cookies.name.clone(), token))
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(state.cookies.secure)
        .path("/")
        .max_age(max_age)
        .build()
}

fn sign_in_response(
    state: &ApiState,
    jar: CookieJar,
    status: StatusCode,
    signed_in: SignedIn,
) -> (StatusCode, CookieJar, Json<UserRecord>) {
    let jar = jar.add(session_cookie(state, signed_in.token));
    (status, jar, Json(signed_in.user))
}

pub async fn register(
    State(state): State<ApiState>,
    jar: CookieJar,
    ApiJson(payload): ApiJson<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let signed_in = state
        .auth
        .register(payload.into())
        .await
        .map_err(auth_to_api)?;

    Ok(sign_in_response(&state, jar, StatusCode::CREATED, signed_in))
}

pub async fn login(
    State(state): State<ApiState>,
    jar: CookieJar,
    ApiJson(payload): ApiJson<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let signed_in = state
        .auth
        .login(&payload.username, &payload.password)
        .await
        .map_err(auth_to_api)?;

    Ok(sign_in_response(&state, jar, StatusCode::OK, signed_in))
}

pub async fn logout(State(state): State<ApiState>, jar: CookieJar) -> impl IntoResponse {
    let token = jar
        .get(&state.cookies.name)
        .map(|cookie| cookie.value().to_string());
    if let Some(token) = token {
        state.auth.logout(&token);
    }

    let jar = jar.remove(Cookie::build(state.cookies.name.clone()).path("/"));
    (jar, Json(MessageResponse::new("Logged out successfully")))
}

pub async fn current_user(RequireUser(user): RequireUser) -> impl IntoResponse {
    Json(user)
}
