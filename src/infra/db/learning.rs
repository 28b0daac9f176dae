use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::types::Json;
use uuid::Uuid;

use crate::application::repos::{
    CreateEnrollmentParams, CreatePaymentParams, CreateReviewParams, CreateWishlistParams,
    EnrollmentsRepo, PaymentsRepo, RepoError, ReviewsRepo, WishlistRepo,
};
use crate::domain::entities::{EnrollmentRecord, PaymentRecord, ReviewRecord, WishlistRecord};

use super::PostgresRepositories;
use super::util::{count_to_u64, map_sqlx_error};

const ENROLLMENT_COLUMNS: &str = "id, user_id, course_id, status, progress, completed_lessons, \
    certificate_issued, enrolled_at, completed_at";

const REVIEW_COLUMNS: &str =
    "id, user_id, course_id, rating, comment, is_published, created_at, updated_at";

const PAYMENT_COLUMNS: &str = "id, user_id, course_id, amount, currency, status, \
    payment_method, transaction_id, created_at, updated_at";

const WISHLIST_COLUMNS: &str = "id, user_id, course_id, created_at";

#[async_trait]
impl EnrollmentsRepo for PostgresRepositories {
    async fn list_enrollments_for_user(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<EnrollmentRecord>, RepoError> {
        let sql = format!(
            "SELECT {ENROLLMENT_COLUMNS} FROM enrollments WHERE user_id = $1 ORDER BY seq"
        );
        sqlx::query_as::<_, EnrollmentRecord>(&sql)
            .bind(user_id)
            .fetch_all(self.pool())
            .await
            .map_err(map_sqlx_error)
    }

    async fn find_enrollment(&self, id: Uuid) -> Result<Option<EnrollmentRecord>, RepoError> {
        let sql = format!("SELECT {ENROLLMENT_COLUMNS} FROM enrollments WHERE id = $1");
        sqlx::query_as::<_, EnrollmentRecord>(&sql)
            .bind(id)
            .fetch_optional(self.pool())
            .await
            .map_err(map_sqlx_error)
    }

    async fn find_enrollment_for(
        &self,
        user_id: Uuid,
        course_id: Uuid,
    ) -> Result<Option<EnrollmentRecord>, RepoError> {
        let sql = format!(
            "SELECT {ENROLLMENT_COLUMNS} FROM enrollments WHERE user_id = $1 AND course_id = $2"
        );
        sqlx::query_as::<_, EnrollmentRecord>(&sql)
            .bind(user_id)
            .bind(course_id)
            .fetch_optional(self.pool())
            .await
            .map_err(map_sqlx_error)
    }

    async fn create_enrollment(
        &self,
        params: CreateEnrollmentParams,
    ) -> Result<EnrollmentRecord, RepoError> {
        let sql = format!(
            "INSERT INTO enrollments (id, user_id, course_id) VALUES ($1, $2, $3) \
             RETURNING {ENROLLMENT_COLUMNS}"
        );
        sqlx::query_as::<_, EnrollmentRecord>(&sql)
            .bind(Uuid::new_v4())
            .bind(params.user_id)
            .bind(params.course_id)
            .fetch_one(self.pool())
            .await
            .map_err(map_sqlx_error)
    }

    async fn update_enrollment(
        &self,
        enrollment: &EnrollmentRecord,
    ) -> Result<EnrollmentRecord, RepoError> {
        let sql = format!(
            "UPDATE enrollments SET status = $2, progress = $3, completed_lessons = $4, \
                 certificate_issued = $5, completed_at = $6 \
             WHERE id = $1 \
             RETURNING {ENROLLMENT_COLUMNS}"
        );
        sqlx::query_as::<_, EnrollmentRecord>(&sql)
            .bind(enrollment.id)
            .bind(enrollment.status)
            .bind(enrollment.progress)
            .bind(Json(&enrollment.completed_lessons))
            .bind(enrollment.certificate_issued)
            .bind(enrollment.completed_at)
            .fetch_one(self.pool())
            .await
            .map_err(map_sqlx_error)
    }

    async fn count_enrollments(&self) -> Result<u64, RepoError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM enrollments")
            .fetch_one(self.pool())
            .await
            .map_err(map_sqlx_error)?;
        count_to_u64(count)
    }
}

#[async_trait]
impl ReviewsRepo for PostgresRepositories {
    async fn list_reviews_for_course(
        &self,
        course_id: Uuid,
    ) -> Result<Vec<ReviewRecord>, RepoError> {
        let sql = format!(
            "SELECT {REVIEW_COLUMNS} FROM reviews \
             WHERE course_id = $1 AND is_published \
             ORDER BY created_at DESC"
        );
        sqlx::query_as::<_, ReviewRecord>(&sql)
            .bind(course_id)
            .fetch_all(self.pool())
            .await
            .map_err(map_sqlx_error)
    }

    async fn find_review(&self, id: Uuid) -> Result<Option<ReviewRecord>, RepoError> {
        let sql = format!("SELECT {REVIEW_COLUMNS} FROM reviews WHERE id = $1");
        sqlx::query_as::<_, ReviewRecord>(&sql)
            .bind(id)
            .fetch_optional(self.pool())
            .await
            .map_err(map_sqlx_error)
    }

    async fn create_review(&self, params: CreateReviewParams) -> Result<ReviewRecord, RepoError> {
        let sql = format!(
            "INSERT INTO reviews (id, user_id, course_id, rating, comment) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {REVIEW_COLUMNS}"
        );
        sqlx::query_as::<_, ReviewRecord>(&sql)
            .bind(Uuid::new_v4())
            .bind(params.user_id)
            .bind(params.course_id)
            .bind(params.rating)
            .bind(params.comment)
            .fetch_one(self.pool())
            .await
            .map_err(map_sqlx_error)
    }

    async fn delete_review(&self, id: Uuid) -> Result<bool, RepoError> {
        let result = sqlx::query("DELETE FROM reviews WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await
            .map_err(map_sqlx_error)?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl PaymentsRepo for PostgresRepositories {
    async fn list_payments_for_user(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<PaymentRecord>, RepoError> {
        let sql = format!("SELECT {PAYMENT_COLUMNS} FROM payments WHERE user_id = $1 ORDER BY seq");
        sqlx::query_as::<_, PaymentRecord>(&sql)
            .bind(user_id)
            .fetch_all(self.pool())
            .await
            .map_err(map_sqlx_error)
    }

    async fn create_payment(
        &self,
        params: CreatePaymentParams,
    ) -> Result<PaymentRecord, RepoError> {
        let sql = format!(
            "INSERT INTO payments (id, user_id, course_id, amount, currency, status, \
                 payment_method, transaction_id) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING {PAYMENT_COLUMNS}"
        );
        sqlx::query_as::<_, PaymentRecord>(&sql)
            .bind(Uuid::new_v4())
            .bind(params.user_id)
            .bind(params.course_id)
            .bind(params.amount)
            .bind(params.currency)
            .bind(params.status)
            .bind(params.payment_method)
            .bind(params.transaction_id)
            .fetch_one(self.pool())
            .await
            .map_err(map_sqlx_error)
    }

    async fn completed_revenue(&self) -> Result<Decimal, RepoError> {
        let (total,): (Decimal,) = sqlx::query_as(
            "SELECT COALESCE(SUM(amount), 0)::NUMERIC(12, 2) FROM payments \
             WHERE status = 'completed'::payment_status",
        )
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)?;
        Ok(total)
    }
}

#[async_trait]
impl WishlistRepo for PostgresRepositories {
    async fn list_wishlist_for_user(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<WishlistRecord>, RepoError> {
        let sql = format!(
            "SELECT {WISHLIST_COLUMNS} FROM wishlist WHERE user_id = $1 ORDER BY created_at DESC"
        );
        sqlx::query_as::<_, WishlistRecord>(&sql)
            .bind(user_id)
            .fetch_all(self.pool())
            .await
            .map_err(map_sqlx_error)
    }

    async fn find_wishlist_entry(
        &self,
        user_id: Uuid,
        course_id: Uuid,
    ) -> Result<Option<WishlistRecord>, RepoError> {
        let sql = format!(
            "SELECT {WISHLIST_COLUMNS} FROM wishlist WHERE user_id = $1 AND course_id = $2"
        );
        sqlx::query_as::<_, WishlistRecord>(&sql)
            .bind(user_id)
            .bind(course_id)
            .fetch_optional(self.pool())
            .await
            .map_err(map_sqlx_error)
    }

    async fn add_to_wishlist(
        &self,
        params: CreateWishlistParams,
    ) -> Result<WishlistRecord, RepoError> {
        let sql = format!(
            "INSERT INTO wishlist (id, user_id, course_id) VALUES ($1, $2, $3) \
             RETURNING {WISHLIST_COLUMNS}"
        );
        sqlx::query_as::<_, WishlistRecord>(&sql)
            .bind(Uuid::new_v4())
            .bind(params.user_id)
            .bind(params.course_id)
            .fetch_one(self.pool())
            .await
            .map_err(map_sqlx_error)
    }

    async fn remove_from_wishlist(
        &self,
        user_id: Uuid,
        course_id: Uuid,
    ) -> Result<bool, RepoError> {
        let result = sqlx::query("DELETE FROM wishlist WHERE user_id = $1 AND course_id = $2")
            .bind(user_id)
            .bind(course_id)
            .execute(self.pool())
            .await
            .map_err(map_sqlx_error)?;
        Ok(result.rows_affected() > 0)
    }
}
