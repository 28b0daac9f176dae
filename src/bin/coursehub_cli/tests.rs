#![deny(clippy::all, clippy::pedantic)]

use clap::Parser;
use httpmock::MockServer;
use reqwest::StatusCode;
use serde_json::json;
use tempfile::TempDir;
use uuid::Uuid;

use crate::args::{Cli, Commands, CoursesCmd, DashboardCmd, LevelArg, ShellLine};
use crate::cache::QueryCache;
use crate::client::{CliError, Ctx, build_ctx_from_cli};
use crate::handlers::{auth, courses, dashboard};
use crate::session::SessionFile;

fn ctx(server: &MockServer, dir: &TempDir) -> Ctx {
    Ctx::new(&server.base_url(), SessionFile::new(dir.path().join("session"))).expect("ctx")
}

fn course_list_cmd() -> CoursesCmd {
    CoursesCmd::List {
        category_id: None,
        instructor_id: None,
        level: None,
        search: None,
        all: false,
        featured: None,
        limit: 20,
        offset: 0,
    }
}

#[test]
fn build_ctx_requires_site() {
    let cli = Cli {
        site: None,
        session_file: ".coursehub-session".into(),
        command: Commands::Whoami,
    };
    let err = build_ctx_from_cli(&cli).err().expect("missing site should fail");
    assert!(matches!(err, CliError::MissingSite));
}

#[test]
fn cache_key_ignores_param_order() {
    let a = QueryCache::key(
        "api/courses",
        &[("level", "beginner".into()), ("categoryId", "c1".into())],
    );
    let b = QueryCache::key(
        "api/courses",
        &[("categoryId", "c1".into()), ("level", "beginner".into())],
    );
    assert_eq!(a, b);
    assert_eq!(a, "api/courses?categoryId=c1&level=beginner");
    assert_eq!(QueryCache::key("api/user", &[]), "api/user");
}

#[test]
fn invalidate_prefix_drops_matching_entries_only() {
    let mut cache = QueryCache::new(8);
    cache.put("api/courses?limit=20".into(), json!([]));
    cache.put("api/courses/abc".into(), json!({}));
    cache.put("api/my-wishlist".into(), json!([]));

    assert_eq!(cache.invalidate_prefix("api/courses"), 2);
    assert_eq!(cache.len(), 1);
    assert!(cache.get("api/my-wishlist").is_some());
}

#[test]
fn cache_evicts_least_recently_used() {
    let mut cache = QueryCache::new(2);
    cache.put("a".into(), json!(1));
    cache.put("b".into(), json!(2));
    assert!(cache.get("a").is_some());
    cache.put("c".into(), json!(3));

    assert!(cache.get("b").is_none());
    assert!(cache.get("a").is_some());
    assert!(cache.get("c").is_some());
}

#[test]
fn shell_line_parses_quoted_arguments() {
    let words = crate::split_line(r#"courses review 7d0f4e55-0000-4000-8000-000000000001 --rating 5 --comment "great course""#)
        .expect("split");
    assert_eq!(words.last().map(String::as_str), Some("great course"));

    let parsed = ShellLine::try_parse_from(words).expect("parse");
    match parsed.command {
        Commands::Courses(cmd) => match cmd.action {
            CoursesCmd::Review {
                rating, comment, ..
            } => {
                assert_eq!(rating, 5);
                assert_eq!(comment.as_deref(), Some("great course"));
            }
            other => panic!("unexpected action {other:?}"),
        },
        other => panic!("unexpected command {other:?}"),
    }
}

#[test]
fn shell_line_rejects_unterminated_quote() {
    let err = crate::split_line("blog comment 'oops").expect_err("should fail");
    assert!(matches!(err, CliError::InvalidInput(_)));
}

#[test]
fn session_file_round_trips_and_clears() -> Result<(), CliError> {
    let dir = TempDir::new().expect("tmp dir");
    let file = SessionFile::new(dir.path().join("session"));
    assert_eq!(file.load()?, None);

    file.save("coursehub_session=abc")?;
    assert_eq!(file.load()?.as_deref(), Some("coursehub_session=abc"));

    file.clear()?;
    file.clear()?;
    assert_eq!(file.load()?, None);
    Ok(())
}

#[tokio::test]
async fn catalog_list_is_served_from_cache() -> Result<(), CliError> {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method("GET")
            .path("/api/courses")
            .query_param("isPublished", "true")
            .query_param("limit", "20");
        then.status(200).json_body(json!([]));
    });

    let dir = TempDir::new().expect("tmp dir");
    let ctx = ctx(&server, &dir);
    courses::handle(&ctx, course_list_cmd()).await?;
    courses::handle(&ctx, course_list_cmd()).await?;

    mock.assert();
    Ok(())
}

#[tokio::test]
async fn enrolling_invalidates_course_and_enrollment_queries() -> Result<(), CliError> {
    let server = MockServer::start();
    let id = Uuid::new_v4();
    server.mock(|when, then| {
        when.method("GET").path("/api/courses");
        then.status(200).json_body(json!([]));
    });
    server.mock(|when, then| {
        when.method("GET").path("/api/my-wishlist");
        then.status(200).json_body(json!([]));
    });
    let enroll = server.mock(|when, then| {
        when.method("POST").path(format!("/api/courses/{id}/enroll"));
        then.status(201)
            .json_body(json!({"id": Uuid::new_v4(), "courseId": id, "progress": 0}));
    });

    let dir = TempDir::new().expect("tmp dir");
    let ctx = ctx(&server, &dir);
    ctx.get("api/courses", &[("limit", "20".into())]).await?;
    ctx.get("api/my-wishlist", &[]).await?;
    assert_eq!(ctx.cache().len(), 2);

    courses::handle(&ctx, CoursesCmd::Enroll { id }).await?;

    enroll.assert();
    assert_eq!(ctx.cache().len(), 1);
    assert!(ctx.cache().get("api/my-wishlist").is_some());
    Ok(())
}

#[tokio::test]
async fn api_errors_surface_server_message() {
    let server = MockServer::start();
    let id = Uuid::new_v4();
    server.mock(|when, then| {
        when.method("POST").path(format!("/api/courses/{id}/enroll"));
        then.status(400)
            .json_body(json!({"message": "Already enrolled in this course"}));
    });

    let dir = TempDir::new().expect("tmp dir");
    let ctx = ctx(&server, &dir);
    let err = courses::handle(&ctx, CoursesCmd::Enroll { id })
        .await
        .expect_err("duplicate enrollment");

    assert_eq!(err.status(), Some(StatusCode::BAD_REQUEST));
    assert_eq!(err.to_string(), "Already enrolled in this course");
}

#[tokio::test]
async fn login_persists_cookie_and_sends_it_back() -> Result<(), CliError> {
    let server = MockServer::start();
    let login = server.mock(|when, then| {
        when.method("POST")
            .path("/api/login")
            .json_body_includes(r#"{"username":"ana","password":"secret123"}"#);
        then.status(200)
            .header("set-cookie", "coursehub_session=tok123; HttpOnly; SameSite=Lax; Path=/")
            .json_body(json!({"username": "ana", "role": "student"}));
    });
    let whoami = server.mock(|when, then| {
        when.method("GET")
            .path("/api/user")
            .header("cookie", "coursehub_session=tok123");
        then.status(200)
            .json_body(json!({"username": "ana", "role": "student"}));
    });

    let dir = TempDir::new().expect("tmp dir");
    let ctx = ctx(&server, &dir);
    auth::login(&ctx, "ana".into(), "secret123".into()).await?;
    login.assert();

    let saved = SessionFile::new(dir.path().join("session")).load()?;
    assert_eq!(saved.as_deref(), Some("coursehub_session=tok123"));

    // A fresh context picks the cookie up from disk.
    let reopened = Ctx::new(&server.base_url(), SessionFile::new(dir.path().join("session")))?;
    auth::whoami(&reopened).await?;
    whoami.assert();
    Ok(())
}

#[tokio::test]
async fn logout_clears_local_session() -> Result<(), CliError> {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method("POST").path("/api/logout");
        then.status(200)
            .header(
                "set-cookie",
                "coursehub_session=; Path=/; Max-Age=0; Expires=Thu, 01 Jan 1970 00:00:00 GMT",
            )
            .json_body(json!({"message": "Logged out successfully"}));
    });

    let dir = TempDir::new().expect("tmp dir");
    let file = SessionFile::new(dir.path().join("session"));
    file.save("coursehub_session=tok123")?;

    let ctx = ctx(&server, &dir);
    assert!(ctx.cookie().is_some());
    auth::logout(&ctx).await?;

    assert!(ctx.cookie().is_none());
    assert_eq!(file.load()?, None);
    Ok(())
}

#[tokio::test]
async fn instructor_dashboard_denies_students_without_fetching() -> Result<(), CliError> {
    let server = MockServer::start();
    let user = server.mock(|when, then| {
        when.method("GET").path("/api/user");
        then.status(200)
            .json_body(json!({"id": Uuid::new_v4(), "username": "sam", "role": "student"}));
    });

    let dir = TempDir::new().expect("tmp dir");
    let ctx = ctx(&server, &dir);
    // No course mock exists, so any fetch past the gate would fail with 404.
    dashboard::handle(&ctx, DashboardCmd::Instructor).await?;
    user.assert();
    Ok(())
}

#[tokio::test]
async fn dashboard_treats_unauthenticated_as_denied() -> Result<(), CliError> {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method("GET").path("/api/user");
        then.status(401)
            .json_body(json!({"message": "Authentication required"}));
    });

    let dir = TempDir::new().expect("tmp dir");
    let ctx = ctx(&server, &dir);
    dashboard::handle(&ctx, DashboardCmd::Admin).await?;
    Ok(())
}

#[tokio::test]
async fn instructor_dashboard_lists_own_courses() -> Result<(), CliError> {
    let server = MockServer::start();
    let me = Uuid::new_v4();
    server.mock(|when, then| {
        when.method("GET").path("/api/user");
        then.status(200)
            .json_body(json!({"id": me, "username": "ines", "role": "instructor"}));
    });
    let mine = server.mock(|when, then| {
        when.method("GET")
            .path("/api/courses")
            .query_param("instructorId", me.to_string());
        then.status(200).json_body(json!([
            {"id": Uuid::new_v4(), "title": "Rust 101", "status": "draft", "studentsCount": 0, "lessonsCount": 2}
        ]));
    });

    let dir = TempDir::new().expect("tmp dir");
    let ctx = ctx(&server, &dir);
    dashboard::handle(&ctx, DashboardCmd::Instructor).await?;
    mine.assert();
    Ok(())
}

#[tokio::test]
async fn create_course_sends_parsed_price_and_level() -> Result<(), CliError> {
    let server = MockServer::start();
    let category = Uuid::new_v4();
    let mock = server.mock(|when, then| {
        when.method("POST").path("/api/courses").json_body_includes(
            json!({"title": "Async Rust", "price": "49.99", "level": "advanced", "categoryId": category})
                .to_string(),
        );
        then.status(201)
            .json_body(json!({"id": Uuid::new_v4(), "title": "Async Rust", "status": "draft"}));
    });

    let dir = TempDir::new().expect("tmp dir");
    let ctx = ctx(&server, &dir);
    courses::handle(
        &ctx,
        CoursesCmd::Create {
            title: "Async Rust".into(),
            description: "Futures and executors".into(),
            price: "49.99".into(),
            level: LevelArg::Advanced,
            category_id: category,
        },
    )
    .await?;
    mock.assert();
    Ok(())
}

#[tokio::test]
async fn create_course_rejects_bad_price_locally() {
    let server = MockServer::start();
    let dir = TempDir::new().expect("tmp dir");
    let ctx = ctx(&server, &dir);

    let err = courses::handle(
        &ctx,
        CoursesCmd::Create {
            title: "Async Rust".into(),
            description: "Futures and executors".into(),
            price: "forty".into(),
            level: LevelArg::Beginner,
            category_id: Uuid::new_v4(),
        },
    )
    .await
    .expect_err("bad price");
    assert!(matches!(err, CliError::InvalidInput(_)));
}
