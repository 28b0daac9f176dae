#![deny(clippy::all, clippy::pedantic)]

use serde::Serialize;
use serde_json::Value;

use crate::client::CliError;

pub fn print_json<T: Serialize>(value: &T) -> Result<(), CliError> {
    let out = serde_json::to_string_pretty(value)
        .map_err(|e| CliError::Server(format!("failed to render output: {e}")))?;
    println!("{out}");
    Ok(())
}

fn text<'a>(value: &'a Value, field: &str) -> &'a str {
    value.get(field).and_then(Value::as_str).unwrap_or("-")
}

fn number(value: &Value, field: &str) -> String {
    match value.get(field) {
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::String(s)) => s.clone(),
        _ => "-".to_string(),
    }
}

fn rows(value: &Value) -> &[Value] {
    value.as_array().map_or(&[], Vec::as_slice)
}

fn display_name(profile: &Value) -> String {
    let first = profile.get("firstName").and_then(Value::as_str);
    let last = profile.get("lastName").and_then(Value::as_str);
    match (first, last) {
        (Some(first), Some(last)) => format!("{first} {last}"),
        (Some(name), None) | (None, Some(name)) => name.to_string(),
        (None, None) => text(profile, "username").to_string(),
    }
}

pub fn course_line(course: &Value) -> String {
    format!(
        "{}  {}  [{}]  ${}  rating {} ({} reviews)  {} students",
        text(course, "id"),
        text(course, "title"),
        text(course, "level"),
        number(course, "price"),
        number(course, "rating"),
        number(course, "reviewsCount"),
        number(course, "studentsCount"),
    )
}

pub fn catalog(courses: &Value) {
    let list = rows(courses);
    if list.is_empty() {
        println!("No courses found.");
        return;
    }
    for course in list {
        println!("{}", course_line(course));
    }
}

pub fn course_detail(detail: &Value) {
    println!("{}", text(detail, "title"));
    println!("{}", text(detail, "description"));
    println!(
        "level {} | language {} | status {} | ${}",
        text(detail, "level"),
        text(detail, "language"),
        text(detail, "status"),
        number(detail, "price"),
    );
    if let Some(instructor) = detail.get("instructor").filter(|v| !v.is_null()) {
        println!("instructor: {}", display_name(instructor));
    }

    println!("\nLessons ({}):", number(detail, "lessonsCount"));
    for lesson in rows(detail.get("lessons").unwrap_or(&Value::Null)) {
        let free = if lesson.get("isFree").and_then(Value::as_bool) == Some(true) {
            " (free)"
        } else {
            ""
        };
        println!(
            "  {}. {}{}  {}",
            number(lesson, "orderIndex"),
            text(lesson, "title"),
            free,
            text(lesson, "id"),
        );
    }

    println!(
        "\nReviews ({}, rating {}):",
        number(detail, "reviewsCount"),
        number(detail, "rating")
    );
    for review in rows(detail.get("reviews").unwrap_or(&Value::Null)) {
        let author = review
            .get("user")
            .filter(|v| !v.is_null())
            .map_or_else(|| "anonymous".to_string(), display_name);
        println!(
            "  {}/5 by {}: {}",
            number(review, "rating"),
            author,
            review.get("comment").and_then(Value::as_str).unwrap_or(""),
        );
    }
}

pub fn blog_list(posts: &Value) {
    let list = rows(posts);
    if list.is_empty() {
        println!("No posts found.");
        return;
    }
    for post in list {
        println!(
            "{}  {}  ({} views)",
            text(post, "id"),
            text(post, "title"),
            number(post, "viewsCount"),
        );
    }
}

pub fn blog_detail(post: &Value) {
    println!("{}", text(post, "title"));
    if let Some(author) = post.get("author").filter(|v| !v.is_null()) {
        println!("by {}", display_name(author));
    }
    println!("\n{}\n", text(post, "content"));
    let comments = rows(post.get("comments").unwrap_or(&Value::Null));
    println!("Comments ({}):", comments.len());
    for comment in comments {
        let author = comment
            .get("user")
            .filter(|v| !v.is_null())
            .map_or_else(|| "anonymous".to_string(), display_name);
        let indent = if comment.get("parentId").is_some_and(|v| !v.is_null()) {
            "    "
        } else {
            "  "
        };
        println!("{indent}{author}: {}", text(comment, "content"));
    }
}

pub fn student_dashboard(enrollments: &Value, wishlist: &Value) {
    println!("My courses:");
    let list = rows(enrollments);
    if list.is_empty() {
        println!("  not enrolled in any course yet");
    }
    for enrollment in list {
        let title = enrollment
            .get("course")
            .map_or("-", |course| text(course, "title"));
        println!(
            "  {}  {}%  {}  enrollment {}",
            title,
            number(enrollment, "progress"),
            text(enrollment, "status"),
            text(enrollment, "id"),
        );
    }

    println!("\nWishlist:");
    let list = rows(wishlist);
    if list.is_empty() {
        println!("  empty");
    }
    for entry in list {
        match entry.get("course").filter(|v| !v.is_null()) {
            Some(course) => println!("  {}", course_line(course)),
            None => println!("  {}", text(entry, "courseId")),
        }
    }
}

pub fn instructor_dashboard(courses: &Value) {
    println!("My courses:");
    let list = rows(courses);
    if list.is_empty() {
        println!("  no courses yet");
    }
    for course in list {
        println!(
            "  {}  {}  [{}]  {} students  {} lessons",
            text(course, "id"),
            text(course, "title"),
            text(course, "status"),
            number(course, "studentsCount"),
            number(course, "lessonsCount"),
        );
    }
}

pub fn admin_dashboard(stats: &Value, users: &Value, pending: &Value) {
    println!(
        "users {} | courses {} | enrollments {} | revenue ${}",
        number(stats, "totalUsers"),
        number(stats, "totalCourses"),
        number(stats, "totalEnrollments"),
        number(stats, "totalRevenue"),
    );

    println!("\nUsers:");
    for user in rows(users) {
        let active = if user.get("isActive").and_then(Value::as_bool) == Some(false) {
            " (inactive)"
        } else {
            ""
        };
        println!(
            "  {}  {}  {}{}",
            text(user, "id"),
            text(user, "username"),
            text(user, "role"),
            active,
        );
    }

    println!("\nPending courses:");
    let list = rows(pending);
    if list.is_empty() {
        println!("  none");
    }
    for course in list {
        println!("  {}  {}", text(course, "id"), text(course, "title"));
    }
}

pub fn access_denied(required: &str, actual: Option<&str>) {
    match actual {
        Some(role) => {
            println!("Access denied: this page is for {required}s (signed in as {role}).");
        }
        None => println!("Access denied: sign in first."),
    }
}
