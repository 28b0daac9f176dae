use axum::body::Body;
use axum::extract::State;
use axum::http::Request;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum_extra::extract::CookieJar;
use tracing::debug;

use super::error::ApiError;
use super::extract::CurrentUser;
use super::state::ApiState;

/// Resolve the session cookie into a `CurrentUser` extension.
///
/// Requests without a cookie, or with an unknown or expired token, continue
/// anonymously; handlers that need a user reject them with 401.
pub async fn resolve_session(
    State(state): State<ApiState>,
    jar: CookieJar,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    if let Some(cookie) = jar.get(&state.cookies.name) {
        match state.auth.authenticate(cookie.value()).await {
            Ok(Some(user)) => {
                request.extensions_mut().insert(CurrentUser(user));
            }
            Ok(None) => {
                debug!(
                    target = "coursehub::http::session",
                    "session cookie did not resolve to an active user"
                );
            }
            Err(err) => {
                return ApiError::internal(err.to_string()).into_response();
            }
        }
    }

    next.run(request).await
}
