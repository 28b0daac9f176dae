#![deny(clippy::all, clippy::pedantic)]

use coursehub::infra::http::api::models::UserAdminUpdateRequest;
use reqwest::Method;
use serde_json::Value;

use crate::args::DashboardCmd;
use crate::client::{CliError, Ctx};
use crate::print::{self, print_json};

/// Role a dashboard is meant for. Admins may also open the instructor one.
fn allowed(page: &str, role: &str) -> bool {
    match page {
        "instructor" => role == "instructor" || role == "admin",
        _ => role == page,
    }
}

/// Resolves the current user and checks the page role. Prints the
/// access-denied view and returns `None` on a mismatch; the server still
/// enforces the same rules on every call.
async fn gate(ctx: &Ctx, page: &str) -> Result<Option<Value>, CliError> {
    let Some(user) = super::current_user(ctx).await? else {
        print::access_denied(page, None);
        return Ok(None);
    };
    let role = user.get("role").and_then(Value::as_str).unwrap_or_default();
    if !allowed(page, role) {
        print::access_denied(page, Some(role));
        return Ok(None);
    }
    Ok(Some(user))
}

pub async fn handle(ctx: &Ctx, cmd: DashboardCmd) -> Result<(), CliError> {
    match cmd {
        DashboardCmd::Student => {
            if gate(ctx, "student").await?.is_none() {
                return Ok(());
            }
            let enrollments = ctx.get("api/my-enrollments", &[]).await?;
            let wishlist = ctx.get("api/my-wishlist", &[]).await?;
            print::student_dashboard(&enrollments, &wishlist);
        }
        DashboardCmd::Instructor => {
            let Some(user) = gate(ctx, "instructor").await? else {
                return Ok(());
            };
            let id = user.get("id").and_then(Value::as_str).unwrap_or_default();
            let q = [("instructorId", id.to_string()), ("limit", "100".to_string())];
            let courses = ctx.get("api/courses", &q).await?;
            print::instructor_dashboard(&courses);
        }
        DashboardCmd::Admin => {
            if gate(ctx, "admin").await?.is_none() {
                return Ok(());
            }
            let stats = ctx.get("api/admin/stats", &[]).await?;
            let users = ctx.get("api/admin/users", &[]).await?;
            let pending = ctx.get("api/admin/courses/pending", &[]).await?;
            print::admin_dashboard(&stats, &users, &pending);
        }
        DashboardCmd::Approve { id } => {
            let course = ctx
                .send::<Value>(
                    Method::POST,
                    &format!("api/admin/courses/{id}/approve"),
                    None,
                    &["api/admin", "api/courses"],
                )
                .await?;
            print_json(&course)?;
        }
        DashboardCmd::Reject { id } => {
            let course = ctx
                .send::<Value>(
                    Method::POST,
                    &format!("api/admin/courses/{id}/reject"),
                    None,
                    &["api/admin", "api/courses"],
                )
                .await?;
            print_json(&course)?;
        }
        DashboardCmd::SetUser { id, role, active } => {
            if role.is_none() && active.is_none() {
                return Err(CliError::InvalidInput(
                    "nothing to change (use --role or --active)".into(),
                ));
            }
            let body = UserAdminUpdateRequest {
                role: role.map(Into::into),
                is_active: active,
            };
            let user = ctx
                .send(
                    Method::PATCH,
                    &format!("api/admin/users/{id}"),
                    Some(&body),
                    &["api/admin", "api/instructors"],
                )
                .await?;
            print_json(&user)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::allowed;

    #[test]
    fn admins_may_open_the_instructor_page_only() {
        assert!(allowed("instructor", "admin"));
        assert!(allowed("instructor", "instructor"));
        assert!(!allowed("instructor", "student"));
        assert!(!allowed("student", "admin"));
        assert!(!allowed("admin", "instructor"));
        assert!(allowed("admin", "admin"));
    }
}
