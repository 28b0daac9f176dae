//! Aggregates shown on the admin dashboard.

use std::collections::BTreeMap;
use std::sync::Arc;

use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;

use crate::application::pagination::PageRequest;
use crate::application::repos::{
    CourseQueryFilter, CoursesRepo, EnrollmentsRepo, PaymentsRepo, RepoError, UsersRepo,
};
use crate::domain::entities::{CourseRecord, UserRecord};
use crate::domain::types::{CourseStatus, UserRole};

#[derive(Debug, Error)]
pub enum DashboardError {
    #[error("Admin access required")]
    Forbidden,
    #[error(transparent)]
    Repo(#[from] RepoError),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminStats {
    pub total_users: u64,
    pub total_courses: u64,
    pub total_enrollments: u64,
    pub total_revenue: Decimal,
    pub users_by_role: BTreeMap<UserRole, u64>,
    pub courses_by_status: BTreeMap<CourseStatus, u64>,
}

#[derive(Clone)]
pub struct DashboardService {
    users: Arc<dyn UsersRepo>,
    courses: Arc<dyn CoursesRepo>,
    enrollments: Arc<dyn EnrollmentsRepo>,
    payments: Arc<dyn PaymentsRepo>,
}

impl DashboardService {
    pub fn new(
        users: Arc<dyn UsersRepo>,
        courses: Arc<dyn CoursesRepo>,
        enrollments: Arc<dyn EnrollmentsRepo>,
        payments: Arc<dyn PaymentsRepo>,
    ) -> Self {
        Self {
            users,
            courses,
            enrollments,
            payments,
        }
    }

    pub async fn stats(&self, actor: &UserRecord) -> Result<AdminStats, DashboardError> {
        if !actor.is_admin() {
            return Err(DashboardError::Forbidden);
        }
        let users_by_role: BTreeMap<UserRole, u64> = self
            .users
            .count_users_by_role()
            .await?
            .into_iter()
            .collect();
        let courses_by_status: BTreeMap<CourseStatus, u64> = self
            .courses
            .count_courses_by_status()
            .await?
            .into_iter()
            .collect();

        Ok(AdminStats {
            total_users: users_by_role.values().sum(),
            total_courses: courses_by_status.values().sum(),
            total_enrollments: self.enrollments.count_enrollments().await?,
            total_revenue: self.payments.completed_revenue().await?,
            users_by_role,
            courses_by_status,
        })
    }

    /// Courses waiting for an admin decision.
    pub async fn pending_courses(
        &self,
        actor: &UserRecord,
        page: PageRequest,
    ) -> Result<Vec<CourseRecord>, DashboardError> {
        if !actor.is_admin() {
            return Err(DashboardError::Forbidden);
        }
        let filter = CourseQueryFilter {
            status: Some(CourseStatus::Pending),
            ..CourseQueryFilter::default()
        };
        Ok(self.courses.list_courses(&filter, page).await?)
    }
}
