pub mod error;
pub mod extract;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod state;

pub use state::{ApiState, AuthCookieSettings};

use axum::{
    Router, middleware as axum_middleware,
    routing::{delete, get, patch, post, put},
};

use crate::infra::http::middleware::{log_responses, set_request_context};

pub fn build_api_router(state: ApiState) -> Router {
    let session_state = state.clone();

    Router::new()
        .route("/api/health", get(handlers::health))
        .route("/api/register", post(handlers::register))
        .route("/api/login", post(handlers::login))
        .route("/api/logout", post(handlers::logout))
        .route("/api/user", get(handlers::current_user))
        .route(
            "/api/categories",
            get(handlers::list_categories).post(handlers::create_category),
        )
        .route(
            "/api/categories/{id}",
            get(handlers::get_category)
                .put(handlers::update_category)
                .delete(handlers::delete_category),
        )
        .route(
            "/api/courses",
            get(handlers::list_courses).post(handlers::create_course),
        )
        .route(
            "/api/courses/{id}",
            get(handlers::get_course)
                .put(handlers::update_course)
                .delete(handlers::delete_course),
        )
        .route("/api/courses/slug/{slug}", get(handlers::get_course_by_slug))
        .route("/api/courses/{id}/submit", post(handlers::submit_course))
        .route("/api/courses/{id}/enroll", post(handlers::enroll))
        .route(
            "/api/courses/{id}/reviews",
            get(handlers::list_reviews).post(handlers::create_review),
        )
        .route("/api/reviews/{id}", delete(handlers::delete_review))
        .route(
            "/api/courses/{id}/wishlist",
            get(handlers::wishlist_status)
                .post(handlers::add_to_wishlist)
                .delete(handlers::remove_from_wishlist),
        )
        .route(
            "/api/courses/{id}/lessons",
            get(handlers::list_lessons).post(handlers::create_lesson),
        )
        .route(
            "/api/lessons/{id}",
            put(handlers::update_lesson).delete(handlers::delete_lesson),
        )
        .route("/api/my-enrollments", get(handlers::my_enrollments))
        .route("/api/my-wishlist", get(handlers::my_wishlist))
        .route("/api/my-payments", get(handlers::my_payments))
        .route(
            "/api/enrollments/{id}/lessons/{lesson_id}/complete",
            post(handlers::complete_lesson),
        )
        .route("/api/instructors", get(handlers::list_instructors))
        .route(
            "/api/blog/posts",
            get(handlers::list_blog_posts).post(handlers::create_blog_post),
        )
        .route(
            "/api/blog/posts/{id}",
            get(handlers::get_blog_post)
                .put(handlers::update_blog_post)
                .delete(handlers::delete_blog_post),
        )
        .route(
            "/api/blog/posts/{id}/comments",
            post(handlers::create_comment),
        )
        .route("/api/comments/{id}", delete(handlers::delete_comment))
        .route("/api/admin/stats", get(handlers::admin_stats))
        .route("/api/admin/users", get(handlers::admin_list_users))
        .route("/api/admin/users/{id}", patch(handlers::admin_update_user))
        .route(
            "/api/admin/courses/pending",
            get(handlers::admin_pending_courses),
        )
        .route(
            "/api/admin/courses/{id}/approve",
            post(handlers::admin_approve_course),
        )
        .route(
            "/api/admin/courses/{id}/reject",
            post(handlers::admin_reject_course),
        )
        .with_state(state)
        .layer(axum_middleware::from_fn_with_state(
            session_state,
            middleware::resolve_session,
        ))
        .layer(axum_middleware::from_fn(log_responses))
        .layer(axum_middleware::from_fn(set_request_context))
}
