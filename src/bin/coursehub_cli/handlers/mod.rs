pub mod auth;
pub mod blog;
pub mod courses;
pub mod dashboard;

use reqwest::StatusCode;
use serde_json::Value;

use crate::client::{CliError, Ctx};

/// The signed-in user, or `None` when the server says nobody is.
pub async fn current_user(ctx: &Ctx) -> Result<Option<Value>, CliError> {
    match ctx.get("api/user", &[]).await {
        Ok(user) => Ok(Some(user)),
        Err(err) if err.status() == Some(StatusCode::UNAUTHORIZED) => Ok(None),
        Err(err) => Err(err),
    }
}
