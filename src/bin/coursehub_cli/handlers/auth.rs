#![deny(clippy::all, clippy::pedantic)]

use coursehub::domain::types::UserRole;
use coursehub::infra::http::api::models::{LoginRequest, RegisterRequest};
use reqwest::Method;
use serde_json::Value;

use crate::args::RegisterArgs;
use crate::client::{CliError, Ctx};
use crate::print::print_json;

pub async fn register(ctx: &Ctx, args: RegisterArgs) -> Result<(), CliError> {
    let body = RegisterRequest {
        username: args.username,
        email: args.email,
        password: args.password,
        first_name: args.first_name,
        last_name: args.last_name,
        role: args.instructor.then_some(UserRole::Instructor),
    };
    let user = ctx
        .send(Method::POST, "api/register", Some(&body), &[])
        .await?
        .unwrap_or(Value::Null);
    signed_in(&user);
    Ok(())
}

pub async fn login(ctx: &Ctx, username: String, password: String) -> Result<(), CliError> {
    let body = LoginRequest { username, password };
    let user = ctx
        .send(Method::POST, "api/login", Some(&body), &[])
        .await?
        .unwrap_or(Value::Null);
    signed_in(&user);
    Ok(())
}

/// The local session is dropped even when the server call fails, so a
/// stale cookie never outlives a logout.
pub async fn logout(ctx: &Ctx) -> Result<(), CliError> {
    let outcome = ctx
        .send::<Value>(Method::POST, "api/logout", None, &[])
        .await;
    ctx.forget_session()?;
    if let Some(message) = outcome?
        .as_ref()
        .and_then(|body| body.get("message"))
        .and_then(Value::as_str)
    {
        println!("{message}");
    }
    Ok(())
}

pub async fn whoami(ctx: &Ctx) -> Result<(), CliError> {
    match super::current_user(ctx).await? {
        Some(user) => print_json(&user),
        None => {
            println!("Not signed in.");
            Ok(())
        }
    }
}

fn signed_in(user: &Value) {
    println!(
        "Signed in as {} ({})",
        user.get("username").and_then(Value::as_str).unwrap_or("-"),
        user.get("role").and_then(Value::as_str).unwrap_or("-"),
    );
}
