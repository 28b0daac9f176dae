#![deny(clippy::all, clippy::pedantic)]

use coursehub::domain::money;
use coursehub::infra::http::api::models::{
    CourseCreateRequest, LessonCreateRequest, ReviewCreateRequest,
};
use reqwest::Method;
use serde_json::Value;
use uuid::Uuid;

use crate::args::CoursesCmd;
use crate::client::{CliError, Ctx};
use crate::print::{self, print_json};

const COURSES: &str = "api/courses";
const ENROLLMENTS: &str = "api/my-enrollments";
const WISHLIST: &str = "api/my-wishlist";

#[allow(clippy::too_many_lines)]
pub async fn handle(ctx: &Ctx, cmd: CoursesCmd) -> Result<(), CliError> {
    match cmd {
        CoursesCmd::List {
            category_id,
            instructor_id,
            level,
            search,
            all,
            featured,
            limit,
            offset,
        } => {
            let mut q = vec![("limit", limit.to_string()), ("offset", offset.to_string())];
            if !all {
                q.push(("isPublished", "true".to_string()));
            }
            if let Some(category_id) = category_id {
                q.push(("categoryId", category_id.to_string()));
            }
            if let Some(instructor_id) = instructor_id {
                q.push(("instructorId", instructor_id.to_string()));
            }
            if let Some(level) = level {
                q.push(("level", level.to_string()));
            }
            if let Some(featured) = featured {
                q.push(("isFeatured", featured.to_string()));
            }
            if let Some(search) = search {
                q.push(("search", search));
            }
            let courses = ctx.get(COURSES, &q).await?;
            print::catalog(&courses);
        }
        CoursesCmd::Show { id, slug } => {
            let path = match (id, slug) {
                (Some(id), _) => format!("{COURSES}/{id}"),
                (None, Some(slug)) => format!("{COURSES}/slug/{slug}"),
                (None, None) => {
                    return Err(CliError::InvalidInput("--id or --slug required".into()));
                }
            };
            let detail = ctx.get(&path, &[]).await?;
            print::course_detail(&detail);
        }
        CoursesCmd::Categories => {
            let categories = ctx.get("api/categories", &[]).await?;
            for category in categories.as_array().map_or(&[][..], Vec::as_slice) {
                println!(
                    "{}  {}",
                    category.get("id").and_then(Value::as_str).unwrap_or("-"),
                    category.get("name").and_then(Value::as_str).unwrap_or("-"),
                );
            }
        }
        CoursesCmd::Enroll { id } => {
            ctx.send::<Value>(
                Method::POST,
                &format!("{COURSES}/{id}/enroll"),
                None,
                &[ENROLLMENTS, COURSES, "api/my-payments"],
            )
            .await?;
            println!("Enrolled.");
        }
        CoursesCmd::Wishlist { id } => {
            ctx.send::<Value>(
                Method::POST,
                &wishlist_path(id),
                None,
                &[WISHLIST, &wishlist_path(id)],
            )
            .await?;
            println!("Added to wishlist.");
        }
        CoursesCmd::Unwishlist { id } => {
            ctx.send::<Value>(
                Method::DELETE,
                &wishlist_path(id),
                None,
                &[WISHLIST, &wishlist_path(id)],
            )
            .await?;
            println!("Removed from wishlist.");
        }
        CoursesCmd::Review {
            id,
            rating,
            comment,
        } => {
            let body = ReviewCreateRequest { rating, comment };
            let review = ctx
                .send(
                    Method::POST,
                    &format!("{COURSES}/{id}/reviews"),
                    Some(&body),
                    &[COURSES],
                )
                .await?;
            print_json(&review)?;
        }
        CoursesCmd::Complete { enrollment, lesson } => {
            let updated = ctx
                .send::<Value>(
                    Method::POST,
                    &format!("api/enrollments/{enrollment}/lessons/{lesson}/complete"),
                    None,
                    &[ENROLLMENTS],
                )
                .await?
                .unwrap_or(Value::Null);
            let progress = updated
                .get("progress")
                .map_or_else(|| "-".to_string(), Value::to_string);
            println!("Progress: {progress}%");
        }
        CoursesCmd::Create {
            title,
            description,
            price,
            level,
            category_id,
        } => {
            let price = money::parse_amount(&price)
                .map_err(|e| CliError::InvalidInput(format!("price: {e}")))?;
            let body = CourseCreateRequest {
                title,
                title_en: None,
                title_fa: None,
                slug: None,
                description,
                short_description: None,
                thumbnail: None,
                preview_video: None,
                price,
                original_price: None,
                level: level.into(),
                status: None,
                language: None,
                duration: None,
                category_id,
                tags: Vec::new(),
                requirements: Vec::new(),
                what_you_will_learn: Vec::new(),
                is_featured: None,
                is_published: None,
            };
            let course = ctx
                .send(Method::POST, COURSES, Some(&body), &[COURSES])
                .await?;
            print_json(&course)?;
        }
        CoursesCmd::Submit { id } => {
            let course = ctx
                .send::<Value>(
                    Method::POST,
                    &format!("{COURSES}/{id}/submit"),
                    None,
                    &[COURSES, "api/admin"],
                )
                .await?;
            print_json(&course)?;
        }
        CoursesCmd::AddLesson {
            id,
            title,
            video_url,
            duration,
            free,
        } => {
            let body = LessonCreateRequest {
                title,
                description: None,
                video_url,
                duration,
                order_index: None,
                is_free: Some(free),
            };
            let lesson = ctx
                .send(
                    Method::POST,
                    &format!("{COURSES}/{id}/lessons"),
                    Some(&body),
                    &[COURSES],
                )
                .await?;
            print_json(&lesson)?;
        }
        CoursesCmd::Delete { id } => {
            ctx.send::<Value>(
                Method::DELETE,
                &format!("{COURSES}/{id}"),
                None,
                &[COURSES, ENROLLMENTS, WISHLIST],
            )
            .await?;
            println!("Course deleted.");
        }
    }
    Ok(())
}

fn wishlist_path(id: Uuid) -> String {
    format!("{COURSES}/{id}/wishlist")
}
