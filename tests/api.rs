use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use coursehub::application::auth::RegisterCommand;
use coursehub::application::sessions::SessionStore;
use coursehub::domain::types::UserRole;
use coursehub::infra::http::{ApiState, AuthCookieSettings, build_router};
use coursehub::infra::memory::MemoryRepositories;

struct TestApp {
    router: Router,
    state: ApiState,
}

struct Response {
    status: StatusCode,
    cookie: Option<String>,
    body: Value,
}

fn app() -> TestApp {
    let repos = Arc::new(MemoryRepositories::new());
    let sessions = Arc::new(SessionStore::new(Duration::from_secs(3600)));
    let state = ApiState::from_repositories(repos, sessions, AuthCookieSettings::default());
    TestApp {
        router: build_router(state.clone()),
        state,
    }
}

impl TestApp {
    async fn call(
        &self,
        method: Method,
        uri: &str,
        cookie: Option<&str>,
        body: Option<Value>,
    ) -> Response {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("request");

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");
        let status = response.status();
        let cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|value| value.to_str().ok())
            .and_then(|raw| raw.split(';').next())
            .map(str::to_string);
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("body")
            .to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("json body")
        };
        Response {
            status,
            cookie,
            body,
        }
    }

    async fn register(&self, username: &str, role: Option<&str>) -> (String, String) {
        let mut payload = json!({
            "username": username,
            "email": format!("{username}@example.com"),
            "password": "secret123",
        });
        if let Some(role) = role {
            payload["role"] = json!(role);
        }
        let res = self
            .call(Method::POST, "/api/register", None, Some(payload))
            .await;
        assert_eq!(res.status, StatusCode::CREATED, "{}", res.body);
        let cookie = res.cookie.expect("session cookie");
        let id = res.body["id"].as_str().expect("user id").to_string();
        (cookie, id)
    }

    async fn admin(&self) -> String {
        self.state
            .auth
            .create_user(RegisterCommand {
                username: "root".into(),
                email: "root@example.com".into(),
                password: "secret123".into(),
                first_name: None,
                last_name: None,
                role: Some(UserRole::Admin),
            })
            .await
            .expect("admin");
        let res = self
            .call(
                Method::POST,
                "/api/login",
                None,
                Some(json!({"username": "root", "password": "secret123"})),
            )
            .await;
        assert_eq!(res.status, StatusCode::OK);
        res.cookie.expect("admin cookie")
    }

    async fn category(&self, admin: &str, name: &str) -> String {
        let res = self
            .call(
                Method::POST,
                "/api/categories",
                Some(admin),
                Some(json!({"name": name})),
            )
            .await;
        assert_eq!(res.status, StatusCode::CREATED, "{}", res.body);
        res.body["id"].as_str().expect("category id").to_string()
    }

    async fn course(&self, cookie: &str, payload: Value) -> Value {
        let res = self
            .call(Method::POST, "/api/courses", Some(cookie), Some(payload))
            .await;
        assert_eq!(res.status, StatusCode::CREATED, "{}", res.body);
        res.body
    }

    /// Admin-created course that is live immediately.
    async fn published_course(
        &self,
        admin: &str,
        category: &str,
        title: &str,
        level: &str,
    ) -> String {
        let course = self
            .course(
                admin,
                json!({
                    "title": title,
                    "description": "A course",
                    "price": "49.99",
                    "level": level,
                    "categoryId": category,
                    "status": "published",
                }),
            )
            .await;
        course["id"].as_str().expect("course id").to_string()
    }
}

fn ids(body: &Value) -> Vec<String> {
    body.as_array()
        .expect("array body")
        .iter()
        .map(|row| row["id"].as_str().expect("id").to_string())
        .collect()
}

#[tokio::test]
async fn register_signs_in_and_resolves_current_user() {
    let app = app();
    let (cookie, id) = app.register("alice", None).await;

    let res = app.call(Method::GET, "/api/user", Some(&cookie), None).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["id"], json!(id));
    assert_eq!(res.body["role"], json!("student"));
    assert!(res.body.get("passwordHash").is_none());
}

#[tokio::test]
async fn logout_ends_the_session() {
    let app = app();
    let (cookie, _) = app.register("alice", None).await;

    let res = app.call(Method::POST, "/api/logout", Some(&cookie), None).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["message"], json!("Logged out successfully"));

    let res = app.call(Method::GET, "/api/user", Some(&cookie), None).await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn unauthenticated_writes_get_401() {
    let app = app();
    let admin = app.admin().await;
    let category = app.category(&admin, "Programming").await;
    let course = app
        .published_course(&admin, &category, "Rust", "beginner")
        .await;

    for (method, uri) in [
        (Method::POST, "/api/courses".to_string()),
        (Method::POST, format!("/api/courses/{course}/enroll")),
        (Method::POST, format!("/api/courses/{course}/wishlist")),
        (Method::DELETE, format!("/api/courses/{course}")),
        (Method::GET, "/api/my-enrollments".to_string()),
    ] {
        let res = app
            .call(method, &uri, None, Some(json!({"title": "x"})))
            .await;
        assert_eq!(res.status, StatusCode::UNAUTHORIZED, "{uri}");
        assert_eq!(res.body["message"], json!("Authentication required"));
    }
}

#[tokio::test]
async fn students_cannot_register_as_admin() {
    let app = app();
    let res = app
        .call(
            Method::POST,
            "/api/register",
            None,
            Some(json!({
                "username": "mallory",
                "email": "mallory@example.com",
                "password": "secret123",
                "role": "admin",
            })),
        )
        .await;
    assert_eq!(res.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn course_without_price_is_rejected_and_not_stored() {
    let app = app();
    let admin = app.admin().await;
    let category = app.category(&admin, "Programming").await;
    let (instructor, _) = app.register("ines", Some("instructor")).await;

    let res = app
        .call(
            Method::POST,
            "/api/courses",
            Some(&instructor),
            Some(json!({
                "title": "Rust",
                "description": "No price here",
                "level": "beginner",
                "categoryId": category,
            })),
        )
        .await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert!(res.body["message"].is_string());

    let res = app.call(Method::GET, "/api/courses", None, None).await;
    assert_eq!(res.body, json!([]));
}

#[tokio::test]
async fn students_cannot_create_courses() {
    let app = app();
    let admin = app.admin().await;
    let category = app.category(&admin, "Programming").await;
    let (student, _) = app.register("sam", None).await;

    let res = app
        .call(
            Method::POST,
            "/api/courses",
            Some(&student),
            Some(json!({
                "title": "Rust",
                "description": "d",
                "price": "10.00",
                "level": "beginner",
                "categoryId": category,
            })),
        )
        .await;
    assert_eq!(res.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn only_the_owner_may_change_a_course() {
    let app = app();
    let admin = app.admin().await;
    let category = app.category(&admin, "Programming").await;
    let (owner, _) = app.register("ines", Some("instructor")).await;
    let (other, _) = app.register("omar", Some("instructor")).await;

    let course = app
        .course(
            &owner,
            json!({
                "title": "Rust",
                "description": "d",
                "price": "10.00",
                "level": "beginner",
                "categoryId": category,
            }),
        )
        .await;
    let id = course["id"].as_str().expect("id");
    let uri = format!("/api/courses/{id}");

    let res = app
        .call(Method::PUT, &uri, Some(&other), Some(json!({"title": "Mine now"})))
        .await;
    assert_eq!(res.status, StatusCode::FORBIDDEN);
    let res = app.call(Method::DELETE, &uri, Some(&other), None).await;
    assert_eq!(res.status, StatusCode::FORBIDDEN);

    let res = app
        .call(Method::PUT, &uri, Some(&owner), Some(json!({"title": "Rust, revised"})))
        .await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["title"], json!("Rust, revised"));

    let res = app.call(Method::DELETE, &uri, Some(&admin), None).await;
    assert_eq!(res.status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn submitted_course_goes_live_after_approval() {
    let app = app();
    let admin = app.admin().await;
    let category = app.category(&admin, "Programming").await;
    let (instructor, _) = app.register("ines", Some("instructor")).await;
    let (student, _) = app.register("sam", None).await;

    let course = app
        .course(
            &instructor,
            json!({
                "title": "Rust",
                "description": "d",
                "price": "49.99",
                "level": "beginner",
                "categoryId": category,
            }),
        )
        .await;
    assert_eq!(course["status"], json!("draft"));
    assert_eq!(course["isPublished"], json!(false));
    let id = course["id"].as_str().expect("id").to_string();

    let res = app
        .call(Method::POST, &format!("/api/courses/{id}/enroll"), Some(&student), None)
        .await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);

    let res = app
        .call(Method::POST, &format!("/api/courses/{id}/submit"), Some(&instructor), None)
        .await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["status"], json!("pending"));

    let res = app
        .call(Method::GET, "/api/admin/courses/pending", Some(&admin), None)
        .await;
    assert_eq!(ids(&res.body), vec![id.clone()]);

    let res = app
        .call(
            Method::POST,
            &format!("/api/admin/courses/{id}/approve"),
            Some(&instructor),
            None,
        )
        .await;
    assert_eq!(res.status, StatusCode::FORBIDDEN);

    let res = app
        .call(
            Method::POST,
            &format!("/api/admin/courses/{id}/approve"),
            Some(&admin),
            None,
        )
        .await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["status"], json!("published"));
    assert_eq!(res.body["isPublished"], json!(true));

    let res = app
        .call(Method::GET, "/api/courses?isPublished=true", None, None)
        .await;
    assert_eq!(ids(&res.body), vec![id.clone()]);

    let res = app
        .call(Method::POST, &format!("/api/courses/{id}/enroll"), Some(&student), None)
        .await;
    assert_eq!(res.status, StatusCode::CREATED);

    let res = app
        .call(Method::GET, "/api/my-payments", Some(&student), None)
        .await;
    let payments = res.body.as_array().expect("payments");
    assert_eq!(payments.len(), 1);
    assert_eq!(payments[0]["amount"], json!("49.99"));
    assert_eq!(payments[0]["status"], json!("completed"));
}

#[tokio::test]
async fn duplicate_enrollment_and_wishlist_entries_are_rejected() {
    let app = app();
    let admin = app.admin().await;
    let category = app.category(&admin, "Programming").await;
    let course = app
        .published_course(&admin, &category, "Rust", "beginner")
        .await;
    let (student, _) = app.register("sam", None).await;

    let enroll = format!("/api/courses/{course}/enroll");
    let res = app.call(Method::POST, &enroll, Some(&student), None).await;
    assert_eq!(res.status, StatusCode::CREATED);
    let res = app.call(Method::POST, &enroll, Some(&student), None).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);

    let wishlist = format!("/api/courses/{course}/wishlist");
    let res = app.call(Method::POST, &wishlist, Some(&student), None).await;
    assert_eq!(res.status, StatusCode::CREATED);
    let res = app.call(Method::POST, &wishlist, Some(&student), None).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);

    let res = app.call(Method::GET, &wishlist, Some(&student), None).await;
    assert_eq!(res.body["inWishlist"], json!(true));

    let res = app.call(Method::GET, "/api/my-enrollments", Some(&student), None).await;
    assert_eq!(res.body.as_array().map(Vec::len), Some(1));

    let res = app.call(Method::GET, &format!("/api/courses/{course}"), None, None).await;
    assert_eq!(res.body["studentsCount"], json!(1));
}

#[tokio::test]
async fn reviews_require_enrollment() {
    let app = app();
    let admin = app.admin().await;
    let category = app.category(&admin, "Programming").await;
    let course = app
        .published_course(&admin, &category, "Rust", "beginner")
        .await;
    let (student, _) = app.register("sam", None).await;
    let reviews = format!("/api/courses/{course}/reviews");

    let res = app
        .call(Method::POST, &reviews, Some(&student), Some(json!({"rating": 5})))
        .await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);

    app.call(Method::POST, &format!("/api/courses/{course}/enroll"), Some(&student), None)
        .await;
    let res = app
        .call(
            Method::POST,
            &reviews,
            Some(&student),
            Some(json!({"rating": 4, "comment": "Solid"})),
        )
        .await;
    assert_eq!(res.status, StatusCode::CREATED);

    let res = app.call(Method::GET, &format!("/api/courses/{course}"), None, None).await;
    assert_eq!(res.body["reviewsCount"], json!(1));
    assert_eq!(res.body["reviews"][0]["comment"], json!("Solid"));
}

#[tokio::test]
async fn catalog_filters_intersect() {
    let app = app();
    let admin = app.admin().await;
    let programming = app.category(&admin, "Programming").await;
    let design = app.category(&admin, "Design").await;

    let wanted = app
        .published_course(&admin, &programming, "Rust basics", "beginner")
        .await;
    app.published_course(&admin, &programming, "Rust internals", "advanced")
        .await;
    app.published_course(&admin, &design, "Colour theory", "beginner")
        .await;
    let (instructor, _) = app.register("ines", Some("instructor")).await;
    app.course(
        &instructor,
        json!({
            "title": "Draft course",
            "description": "d",
            "price": "0",
            "level": "beginner",
            "categoryId": programming,
        }),
    )
    .await;

    let res = app
        .call(
            Method::GET,
            &format!("/api/courses?categoryId={programming}&level=beginner&isPublished=true"),
            None,
            None,
        )
        .await;
    assert_eq!(ids(&res.body), vec![wanted]);

    let res = app
        .call(Method::GET, "/api/courses?isPublished=true", None, None)
        .await;
    assert_eq!(ids(&res.body).len(), 3);

    let res = app
        .call(Method::GET, "/api/courses?isPublished=false", None, None)
        .await;
    assert_eq!(res.body[0]["title"], json!("Draft course"));
    assert_eq!(ids(&res.body).len(), 1);
}

#[tokio::test]
async fn catalog_pages_by_offset_and_clamps_limit() {
    let app = app();
    let admin = app.admin().await;
    let category = app.category(&admin, "Programming").await;
    let mut courses = Vec::new();
    for title in ["First", "Second", "Third"] {
        courses.push(
            app.published_course(&admin, &category, title, "beginner")
                .await,
        );
    }

    let res = app
        .call(Method::GET, "/api/courses?limit=1&offset=1", None, None)
        .await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(ids(&res.body), vec![courses[1].clone()]);

    let res = app
        .call(Method::GET, "/api/courses?limit=0", None, None)
        .await;
    assert_eq!(ids(&res.body), vec![courses[0].clone()]);

    let res = app
        .call(Method::GET, "/api/courses?limit=500&offset=2", None, None)
        .await;
    assert_eq!(ids(&res.body), vec![courses[2].clone()]);

    let res = app
        .call(Method::GET, "/api/courses?offset=3", None, None)
        .await;
    assert!(ids(&res.body).is_empty());
}

#[tokio::test]
async fn course_prices_keep_two_decimals() {
    let app = app();
    let admin = app.admin().await;
    let category = app.category(&admin, "Programming").await;

    let course = app
        .course(
            &admin,
            json!({
                "title": "Rust",
                "description": "d",
                "price": "12",
                "originalPrice": 20.5,
                "level": "beginner",
                "categoryId": category,
            }),
        )
        .await;
    assert_eq!(course["price"], json!("12.00"));
    assert_eq!(course["originalPrice"], json!("20.50"));
    assert_eq!(course["rating"], json!("0.00"));

    for price in ["-1", "1.234"] {
        let res = app
            .call(
                Method::POST,
                "/api/courses",
                Some(&admin),
                Some(json!({
                    "title": format!("Priced {price}"),
                    "description": "d",
                    "price": price,
                    "level": "beginner",
                    "categoryId": category,
                })),
            )
            .await;
        assert_eq!(res.status, StatusCode::BAD_REQUEST, "{price}");
    }

    let id = course["id"].as_str().expect("course id");
    let res = app
        .call(
            Method::PUT,
            &format!("/api/courses/{id}"),
            Some(&admin),
            Some(json!({"price": "-5"})),
        )
        .await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn appending_after_the_last_possible_lesson_is_rejected() {
    let app = app();
    let admin = app.admin().await;
    let category = app.category(&admin, "Programming").await;
    let course = app
        .published_course(&admin, &category, "Rust", "beginner")
        .await;
    let lessons = format!("/api/courses/{course}/lessons");

    let res = app
        .call(
            Method::POST,
            &lessons,
            Some(&admin),
            Some(json!({"title": "a", "orderIndex": i32::MAX})),
        )
        .await;
    assert_eq!(res.status, StatusCode::CREATED, "{}", res.body);

    let res = app
        .call(Method::POST, &lessons, Some(&admin), Some(json!({"title": "b"})))
        .await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);

    let res = app
        .call(
            Method::POST,
            &lessons,
            Some(&admin),
            Some(json!({"title": "b", "orderIndex": 0})),
        )
        .await;
    assert_eq!(res.status, StatusCode::CREATED, "{}", res.body);
}

#[tokio::test]
async fn completing_every_lesson_finishes_the_enrollment() {
    let app = app();
    let admin = app.admin().await;
    let category = app.category(&admin, "Programming").await;
    let course = app
        .published_course(&admin, &category, "Rust", "beginner")
        .await;

    let mut lessons = Vec::new();
    for title in ["Ownership", "Borrowing", "Lifetimes"] {
        let res = app
            .call(
                Method::POST,
                &format!("/api/courses/{course}/lessons"),
                Some(&admin),
                Some(json!({"title": title})),
            )
            .await;
        assert_eq!(res.status, StatusCode::CREATED, "{}", res.body);
        lessons.push(res.body["id"].as_str().expect("lesson id").to_string());
    }

    let (student, _) = app.register("sam", None).await;
    let res = app
        .call(Method::POST, &format!("/api/courses/{course}/enroll"), Some(&student), None)
        .await;
    let enrollment = res.body["id"].as_str().expect("enrollment id").to_string();

    let mut progress = Vec::new();
    for lesson in &lessons {
        let res = app
            .call(
                Method::POST,
                &format!("/api/enrollments/{enrollment}/lessons/{lesson}/complete"),
                Some(&student),
                None,
            )
            .await;
        assert_eq!(res.status, StatusCode::OK, "{}", res.body);
        progress.push(res.body["progress"].as_i64().expect("progress"));
    }
    assert_eq!(progress, vec![33, 66, 100]);

    let res = app
        .call(
            Method::POST,
            &format!("/api/enrollments/{enrollment}/lessons/{}/complete", lessons[0]),
            Some(&student),
            None,
        )
        .await;
    assert_eq!(res.body["progress"], json!(100));
    assert_eq!(res.body["status"], json!("completed"));
    assert_eq!(res.body["certificateIssued"], json!(true));

    let (stranger, _) = app.register("eve", None).await;
    let res = app
        .call(
            Method::POST,
            &format!("/api/enrollments/{enrollment}/lessons/{}/complete", lessons[1]),
            Some(&stranger),
            None,
        )
        .await;
    assert_eq!(res.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn deleting_a_course_removes_its_dependents() {
    let app = app();
    let admin = app.admin().await;
    let category = app.category(&admin, "Programming").await;
    let course = app
        .published_course(&admin, &category, "Rust", "beginner")
        .await;
    let (student, _) = app.register("sam", None).await;

    app.call(Method::POST, &format!("/api/courses/{course}/enroll"), Some(&student), None)
        .await;
    app.call(Method::POST, &format!("/api/courses/{course}/wishlist"), Some(&student), None)
        .await;

    let res = app
        .call(Method::DELETE, &format!("/api/courses/{course}"), Some(&admin), None)
        .await;
    assert_eq!(res.status, StatusCode::NO_CONTENT);

    let res = app.call(Method::GET, &format!("/api/courses/{course}"), None, None).await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    let res = app.call(Method::GET, "/api/my-enrollments", Some(&student), None).await;
    assert_eq!(res.body, json!([]));
    let res = app.call(Method::GET, "/api/my-wishlist", Some(&student), None).await;
    assert_eq!(res.body, json!([]));
}

#[tokio::test]
async fn admin_routes_reject_other_roles() {
    let app = app();
    let (student, _) = app.register("sam", None).await;

    let res = app.call(Method::GET, "/api/admin/stats", Some(&student), None).await;
    assert_eq!(res.status, StatusCode::FORBIDDEN);
    let res = app.call(Method::GET, "/api/admin/stats", None, None).await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);

    let admin = app.admin().await;
    let res = app.call(Method::GET, "/api/admin/stats", Some(&admin), None).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["totalUsers"], json!(2));
}

#[tokio::test]
async fn malformed_ids_are_bad_requests() {
    let app = app();
    let res = app.call(Method::GET, "/api/courses/not-a-uuid", None, None).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert!(res.body["message"].is_string());
}

#[tokio::test]
async fn blog_drafts_stay_hidden_and_comments_thread() {
    let app = app();
    let admin = app.admin().await;
    let (reader, _) = app.register("rita", None).await;

    let res = app
        .call(
            Method::POST,
            "/api/blog/posts",
            Some(&reader),
            Some(json!({"title": "Nope", "content": "x"})),
        )
        .await;
    assert_eq!(res.status, StatusCode::FORBIDDEN);

    let res = app
        .call(
            Method::POST,
            "/api/blog/posts",
            Some(&admin),
            Some(json!({"title": "Draft notes", "content": "wip"})),
        )
        .await;
    assert_eq!(res.status, StatusCode::CREATED);
    let draft = res.body["id"].as_str().expect("draft id").to_string();

    let res = app
        .call(
            Method::POST,
            "/api/blog/posts",
            Some(&admin),
            Some(json!({"title": "Launch", "content": "We are live", "isPublished": true})),
        )
        .await;
    assert_eq!(res.status, StatusCode::CREATED);
    let post = res.body["id"].as_str().expect("post id").to_string();

    let res = app.call(Method::GET, "/api/blog/posts", None, None).await;
    assert_eq!(ids(&res.body), vec![post.clone()]);
    let res = app
        .call(Method::GET, &format!("/api/blog/posts/{draft}"), Some(&reader), None)
        .await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    let res = app
        .call(Method::GET, &format!("/api/blog/posts/{draft}"), Some(&admin), None)
        .await;
    assert_eq!(res.status, StatusCode::OK);

    let comments = format!("/api/blog/posts/{post}/comments");
    let res = app
        .call(Method::POST, &comments, None, Some(json!({"content": "hi"})))
        .await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);

    let res = app
        .call(Method::POST, &comments, Some(&reader), Some(json!({"content": "Congrats"})))
        .await;
    assert_eq!(res.status, StatusCode::CREATED);
    let parent = res.body["id"].as_str().expect("comment id").to_string();
    let res = app
        .call(
            Method::POST,
            &comments,
            Some(&admin),
            Some(json!({"content": "Thanks", "parentId": parent})),
        )
        .await;
    assert_eq!(res.status, StatusCode::CREATED);

    let res = app
        .call(
            Method::POST,
            &format!("/api/blog/posts/{draft}/comments"),
            Some(&admin),
            Some(json!({"content": "Wrong thread", "parentId": parent})),
        )
        .await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);

    let res = app.call(Method::GET, &format!("/api/blog/posts/{post}"), None, None).await;
    assert_eq!(res.body["comments"].as_array().map(Vec::len), Some(2));
    let views = res.body["viewsCount"].as_i64().expect("views");
    let res = app.call(Method::GET, &format!("/api/blog/posts/{post}"), None, None).await;
    assert_eq!(res.body["viewsCount"].as_i64(), Some(views + 1));

    let res = app
        .call(Method::DELETE, &format!("/api/comments/{parent}"), Some(&reader), None)
        .await;
    assert_eq!(res.status, StatusCode::NO_CONTENT);
    let res = app.call(Method::GET, &format!("/api/blog/posts/{post}"), None, None).await;
    assert_eq!(res.body["comments"], json!([]));
}

#[tokio::test]
async fn blog_lists_newest_posts_first() {
    let app = app();
    let admin = app.admin().await;
    let mut posts = Vec::new();
    for title in ["Older", "Newer"] {
        let res = app
            .call(
                Method::POST,
                "/api/blog/posts",
                Some(&admin),
                Some(json!({"title": title, "content": "x", "isPublished": true})),
            )
            .await;
        assert_eq!(res.status, StatusCode::CREATED);
        posts.push(res.body["id"].as_str().expect("post id").to_string());
    }

    let res = app.call(Method::GET, "/api/blog/posts", None, None).await;
    assert_eq!(ids(&res.body), vec![posts[1].clone(), posts[0].clone()]);

    let res = app
        .call(Method::GET, "/api/blog/posts?limit=1&offset=1", None, None)
        .await;
    assert_eq!(ids(&res.body), vec![posts[0].clone()]);
}

#[tokio::test]
async fn admins_manage_roles_and_deactivate_users() {
    let app = app();
    let admin = app.admin().await;
    let (student, student_id) = app.register("sam", None).await;

    let res = app.call(Method::GET, "/api/instructors", None, None).await;
    assert_eq!(res.body, json!([]));

    let uri = format!("/api/admin/users/{student_id}");
    let res = app
        .call(Method::PATCH, &uri, Some(&student), Some(json!({"role": "admin"})))
        .await;
    assert_eq!(res.status, StatusCode::FORBIDDEN);

    let res = app
        .call(Method::PATCH, &uri, Some(&admin), Some(json!({"role": "instructor"})))
        .await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["role"], json!("instructor"));

    let res = app.call(Method::GET, "/api/instructors", None, None).await;
    assert_eq!(res.body[0]["username"], json!("sam"));
    assert!(res.body[0].get("email").is_none());

    let res = app
        .call(Method::PATCH, &uri, Some(&admin), Some(json!({"isActive": false})))
        .await;
    assert_eq!(res.status, StatusCode::OK);
    let res = app.call(Method::GET, "/api/user", Some(&student), None).await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);

    let res = app
        .call(
            Method::POST,
            "/api/login",
            None,
            Some(json!({"username": "sam", "password": "secret123"})),
        )
        .await;
    assert_ne!(res.status, StatusCode::OK);

    let res = app.call(Method::GET, "/api/user", Some(&admin), None).await;
    let admin_id = res.body["id"].as_str().expect("admin id").to_string();
    let res = app
        .call(
            Method::PATCH,
            &format!("/api/admin/users/{admin_id}"),
            Some(&admin),
            Some(json!({"role": "student"})),
        )
        .await;
    assert_eq!(res.status, StatusCode::FORBIDDEN);
}
