use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use metrics_util::debugging::DebuggingRecorder;
use tower::ServiceExt;

use coursehub::application::sessions::SessionStore;
use coursehub::infra::http::{ApiState, AuthCookieSettings, build_router};
use coursehub::infra::memory::MemoryRepositories;

#[tokio::test]
async fn requests_emit_http_and_session_metrics() {
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();
    recorder
        .install()
        .expect("debug metrics recorder should install in this test process");

    let state = ApiState::from_repositories(
        Arc::new(MemoryRepositories::new()),
        Arc::new(SessionStore::new(Duration::from_secs(60))),
        AuthCookieSettings::default(),
    );
    let router = build_router(state);

    let health = router
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/health")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");
    assert_eq!(health.status(), StatusCode::NO_CONTENT);

    let register = router
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/api/register")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    r#"{"username":"metrics","email":"metrics@example.com","password":"secret123"}"#,
                ))
                .expect("request"),
        )
        .await
        .expect("response");
    assert_eq!(register.status(), StatusCode::CREATED);

    let names: HashSet<String> = snapshotter
        .snapshot()
        .into_vec()
        .into_iter()
        .map(|(composite_key, _, _, _)| composite_key.key().name().to_string())
        .collect();

    for expected in [
        "coursehub_http_requests_total",
        "coursehub_http_request_duration_ms",
        "coursehub_sessions_issued_total",
    ] {
        assert!(names.contains(expected), "missing metric {expected}: {names:?}");
    }
}
