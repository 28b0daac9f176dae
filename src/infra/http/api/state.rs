use std::sync::Arc;

use crate::application::auth::AuthService;
use crate::application::blog::BlogService;
use crate::application::categories::CategoryService;
use crate::application::courses::CourseService;
use crate::application::dashboard::DashboardService;
use crate::application::enrollments::EnrollmentService;
use crate::application::lessons::LessonService;
use crate::application::repos::{HealthRepo, Repositories};
use crate::application::reviews::ReviewService;
use crate::application::sessions::SessionStore;
use crate::application::users::UserService;
use crate::application::wishlist::WishlistService;

/// How the session cookie is written.
#[derive(Debug, Clone)]
pub struct AuthCookieSettings {
    pub name: String,
    pub secure: bool,
}

impl Default for AuthCookieSettings {
    fn default() -> Self {
        Self {
            name: "coursehub_session".to_string(),
            secure: false,
        }
    }
}

#[derive(Clone)]
pub struct ApiState {
    pub auth: Arc<AuthService>,
    pub users: Arc<UserService>,
    pub categories: Arc<CategoryService>,
    pub courses: Arc<CourseService>,
    pub lessons: Arc<LessonService>,
    pub reviews: Arc<ReviewService>,
    pub enrollments: Arc<EnrollmentService>,
    pub wishlist: Arc<WishlistService>,
    pub blog: Arc<BlogService>,
    pub dashboard: Arc<DashboardService>,
    pub health: Arc<dyn HealthRepo>,
    pub cookies: Arc<AuthCookieSettings>,
}

impl ApiState {
    /// Wire every service to a single backend.
    pub fn from_repositories<R: Repositories>(
        repos: Arc<R>,
        sessions: Arc<SessionStore>,
        cookies: AuthCookieSettings,
    ) -> Self {
        Self {
            auth: Arc::new(AuthService::new(repos.clone(), sessions.clone())),
            users: Arc::new(UserService::new(repos.clone(), sessions)),
            categories: Arc::new(CategoryService::new(repos.clone())),
            courses: Arc::new(CourseService::new(
                repos.clone(),
                repos.clone(),
                repos.clone(),
                repos.clone(),
                repos.clone(),
            )),
            lessons: Arc::new(LessonService::new(repos.clone(), repos.clone())),
            reviews: Arc::new(ReviewService::new(
                repos.clone(),
                repos.clone(),
                repos.clone(),
                repos.clone(),
            )),
            enrollments: Arc::new(EnrollmentService::new(
                repos.clone(),
                repos.clone(),
                repos.clone(),
                repos.clone(),
            )),
            wishlist: Arc::new(WishlistService::new(repos.clone(), repos.clone())),
            blog: Arc::new(BlogService::new(
                repos.clone(),
                repos.clone(),
                repos.clone(),
                repos.clone(),
            )),
            dashboard: Arc::new(DashboardService::new(
                repos.clone(),
                repos.clone(),
                repos.clone(),
                repos.clone(),
            )),
            health: repos,
            cookies: Arc::new(cookies),
        }
    }
}
