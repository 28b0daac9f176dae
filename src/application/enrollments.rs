use std::collections::HashSet;
use std::sync::Arc;

use metrics::counter;
use serde::Serialize;
use thiserror::Error;
use time::OffsetDateTime;
use tracing::info;
use uuid::Uuid;

use crate::application::repos::{
    CoursesRepo, CreateEnrollmentParams, CreatePaymentParams, EnrollmentsRepo, LessonsRepo,
    PaymentsRepo, RepoError,
};
use crate::domain::entities::{CourseRecord, EnrollmentRecord, PaymentRecord, UserRecord};
use crate::domain::types::{EnrollmentStatus, PaymentStatus};

const DEFAULT_CURRENCY: &str = "USD";
const ENROLLMENT_PAYMENT_METHOD: &str = "card";

#[derive(Debug, Error)]
pub enum EnrollmentError {
    #[error("Enrollment not found")]
    NotFound,
    #[error("Course not found")]
    CourseNotFound,
    #[error("Lesson not found")]
    LessonNotFound,
    #[error("Already enrolled in this course")]
    AlreadyEnrolled,
    #[error("Course is not available for enrollment")]
    CourseUnavailable,
    #[error("Not authorized to update this enrollment")]
    Forbidden,
    #[error(transparent)]
    Repo(#[from] RepoError),
}

/// An enrollment together with the course it refers to.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrollmentView {
    #[serde(flatten)]
    pub enrollment: EnrollmentRecord,
    pub course: Option<CourseRecord>,
}

#[derive(Clone)]
pub struct EnrollmentService {
    enrollments: Arc<dyn EnrollmentsRepo>,
    courses: Arc<dyn CoursesRepo>,
    lessons: Arc<dyn LessonsRepo>,
    payments: Arc<dyn PaymentsRepo>,
}

impl EnrollmentService {
    pub fn new(
        enrollments: Arc<dyn EnrollmentsRepo>,
        courses: Arc<dyn CoursesRepo>,
        lessons: Arc<dyn LessonsRepo>,
        payments: Arc<dyn PaymentsRepo>,
    ) -> Self {
        Self {
            enrollments,
            courses,
            lessons,
            payments,
        }
    }

    /// Enroll the actor in a published course, charging paid courses.
    pub async fn enroll(
        &self,
        actor: &UserRecord,
        course_id: Uuid,
    ) -> Result<EnrollmentRecord, EnrollmentError> {
        let course = self
            .courses
            .find_course(course_id)
            .await?
            .ok_or(EnrollmentError::CourseNotFound)?;
        if !course.is_published {
            return Err(EnrollmentError::CourseUnavailable);
        }
        if self
            .enrollments
            .find_enrollment_for(actor.id, course_id)
            .await?
            .is_some()
        {
            return Err(EnrollmentError::AlreadyEnrolled);
        }

        let enrollment = self
            .enrollments
            .create_enrollment(CreateEnrollmentParams {
                user_id: actor.id,
                course_id,
            })
            .await
            .map_err(|err| match err {
                RepoError::Duplicate { .. } => EnrollmentError::AlreadyEnrolled,
                other => EnrollmentError::Repo(other),
            })?;

        if !course.price.is_zero() {
            let payment = self
                .payments
                .create_payment(CreatePaymentParams {
                    user_id: actor.id,
                    course_id,
                    amount: course.price,
                    currency: DEFAULT_CURRENCY.to_string(),
                    status: PaymentStatus::Completed,
                    payment_method: Some(ENROLLMENT_PAYMENT_METHOD.to_string()),
                    transaction_id: Some(format!("txn_{}", Uuid::new_v4().simple())),
                })
                .await?;
            info!(
                target = "coursehub::payments",
                payment_id = %payment.id,
                amount = %payment.amount,
                "payment recorded"
            );
        }
        self.courses.refresh_course_stats(course_id).await?;

        counter!("coursehub_enrollments_total").increment(1);
        info!(
            target = "coursehub::enrollments",
            enrollment_id = %enrollment.id,
            user_id = %actor.id,
            course_id = %course_id,
            "user enrolled"
        );
        Ok(enrollment)
    }

    pub async fn my_enrollments(
        &self,
        actor: &UserRecord,
    ) -> Result<Vec<EnrollmentView>, EnrollmentError> {
        let enrollments = self.enrollments.list_enrollments_for_user(actor.id).await?;
        let mut views = Vec::with_capacity(enrollments.len());
        for enrollment in enrollments {
            let course = self.courses.find_course(enrollment.course_id).await?;
            views.push(EnrollmentView { enrollment, course });
        }
        Ok(views)
    }

    pub async fn my_payments(
        &self,
        actor: &UserRecord,
    ) -> Result<Vec<PaymentRecord>, EnrollmentError> {
        Ok(self.payments.list_payments_for_user(actor.id).await?)
    }

    /// Mark a lesson as done and recompute progress.
    ///
    /// Progress counts only lessons that still belong to the course. Reaching
    /// 100 completes the enrollment and issues the certificate once.
    pub async fn complete_lesson(
        &self,
        actor: &UserRecord,
        enrollment_id: Uuid,
        lesson_id: Uuid,
    ) -> Result<EnrollmentRecord, EnrollmentError> {
        let mut enrollment = self
            .enrollments
            .find_enrollment(enrollment_id)
            .await?
            .ok_or(EnrollmentError::NotFound)?;
        if enrollment.user_id != actor.id {
            return Err(EnrollmentError::Forbidden);
        }

        let lessons = self.lessons.list_lessons(enrollment.course_id).await?;
        if !lessons.iter().any(|lesson| lesson.id == lesson_id) {
            return Err(EnrollmentError::LessonNotFound);
        }
        if !enrollment.completed_lessons.contains(&lesson_id) {
            enrollment.completed_lessons.push(lesson_id);
        }

        let done: HashSet<Uuid> = enrollment.completed_lessons.iter().copied().collect();
        let completed = lessons.iter().filter(|lesson| done.contains(&lesson.id)).count();
        enrollment.progress = progress_percent(completed, lessons.len());

        if enrollment.progress >= 100 && enrollment.status != EnrollmentStatus::Completed {
            enrollment.status = EnrollmentStatus::Completed;
            enrollment.completed_at = Some(OffsetDateTime::now_utc());
            enrollment.certificate_issued = true;
            info!(
                target = "coursehub::enrollments",
                enrollment_id = %enrollment.id,
                "course completed"
            );
        }

        Ok(self.enrollments.update_enrollment(&enrollment).await?)
    }
}

fn progress_percent(completed: usize, total: usize) -> i32 {
    if total == 0 {
        return 0;
    }
    let percent = completed.min(total) * 100 / total;
    i32::try_from(percent).unwrap_or(100)
}

#[cfg(test)]
mod tests {
    use super::progress_percent;

    #[test]
    fn progress_is_floored_percentage() {
        assert_eq!(progress_percent(0, 3), 0);
        assert_eq!(progress_percent(1, 3), 33);
        assert_eq!(progress_percent(2, 3), 66);
        assert_eq!(progress_percent(3, 3), 100);
    }

    #[test]
    fn empty_course_has_no_progress() {
        assert_eq!(progress_percent(0, 0), 0);
        assert_eq!(progress_percent(5, 2), 100);
    }
}
