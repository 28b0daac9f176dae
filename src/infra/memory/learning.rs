use async_trait::async_trait;
use rust_decimal::Decimal;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::application::repos::{
    CreateEnrollmentParams, CreatePaymentParams, CreateReviewParams, CreateWishlistParams,
    EnrollmentsRepo, PaymentsRepo, RepoError, ReviewsRepo, WishlistRepo, constraints,
};
use crate::domain::entities::{EnrollmentRecord, PaymentRecord, ReviewRecord, WishlistRecord};
use crate::domain::money::SCALE;
use crate::domain::types::{EnrollmentStatus, PaymentStatus};

use super::MemoryRepositories;
use super::lock::{read_table, write_table};
use super::replace_row;

#[async_trait]
impl EnrollmentsRepo for MemoryRepositories {
    async fn list_enrollments_for_user(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<EnrollmentRecord>, RepoError> {
        let enrollments = read_table(&self.enrollments, "enrollments");
        Ok(enrollments
            .iter()
            .filter(|enrollment| enrollment.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn find_enrollment(&self, id: Uuid) -> Result<Option<EnrollmentRecord>, RepoError> {
        let enrollments = read_table(&self.enrollments, "enrollments");
        Ok(enrollments.iter().find(|enrollment| enrollment.id == id).cloned())
    }

    async fn find_enrollment_for(
        &self,
        user_id: Uuid,
        course_id: Uuid,
    ) -> Result<Option<EnrollmentRecord>, RepoError> {
        let enrollments = read_table(&self.enrollments, "enrollments");
        Ok(enrollments
            .iter()
            .find(|enrollment| enrollment.user_id == user_id && enrollment.course_id == course_id)
            .cloned())
    }

    async fn create_enrollment(
        &self,
        params: CreateEnrollmentParams,
    ) -> Result<EnrollmentRecord, RepoError> {
        let mut enrollments = write_table(&self.enrollments, "enrollments");
        if enrollments.iter().any(|enrollment| {
            enrollment.user_id == params.user_id && enrollment.course_id == params.course_id
        }) {
            return Err(RepoError::duplicate(constraints::ENROLLMENTS_USER_COURSE));
        }
        let enrollment = EnrollmentRecord {
            id: Uuid::new_v4(),
            user_id: params.user_id,
            course_id: params.course_id,
            status: EnrollmentStatus::Active,
            progress: 0,
            completed_lessons: Vec::new(),
            certificate_issued: false,
            enrolled_at: OffsetDateTime::now_utc(),
            completed_at: None,
        };
        enrollments.push(enrollment.clone());
        Ok(enrollment)
    }

    async fn update_enrollment(
        &self,
        enrollment: &EnrollmentRecord,
    ) -> Result<EnrollmentRecord, RepoError> {
        let mut enrollments = write_table(&self.enrollments, "enrollments");
        replace_row(&mut enrollments, enrollment, |row| row.id)
    }

    async fn count_enrollments(&self) -> Result<u64, RepoError> {
        let enrollments = read_table(&self.enrollments, "enrollments");
        Ok(enrollments.len() as u64)
    }
}

#[async_trait]
impl ReviewsRepo for MemoryRepositories {
    async fn list_reviews_for_course(
        &self,
        course_id: Uuid,
    ) -> Result<Vec<ReviewRecord>, RepoError> {
        let reviews = read_table(&self.reviews, "reviews");
        // Newest first; reverse insertion order breaks timestamp ties.
        let mut rows: Vec<ReviewRecord> = reviews
            .iter()
            .rev()
            .filter(|review| review.course_id == course_id && review.is_published)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }

    async fn find_review(&self, id: Uuid) -> Result<Option<ReviewRecord>, RepoError> {
        let reviews = read_table(&self.reviews, "reviews");
        Ok(reviews.iter().find(|review| review.id == id).cloned())
    }

    async fn create_review(&self, params: CreateReviewParams) -> Result<ReviewRecord, RepoError> {
        let now = OffsetDateTime::now_utc();
        let review = ReviewRecord {
            id: Uuid::new_v4(),
            user_id: params.user_id,
            course_id: params.course_id,
            rating: params.rating,
            comment: params.comment,
            is_published: true,
            created_at: now,
            updated_at: now,
        };
        write_table(&self.reviews, "reviews").push(review.clone());
        Ok(review)
    }

    async fn delete_review(&self, id: Uuid) -> Result<bool, RepoError> {
        let mut reviews = write_table(&self.reviews, "reviews");
        let before = reviews.len();
        reviews.retain(|review| review.id != id);
        Ok(reviews.len() != before)
    }
}

#[async_trait]
impl PaymentsRepo for MemoryRepositories {
    async fn list_payments_for_user(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<PaymentRecord>, RepoError> {
        let payments = read_table(&self.payments, "payments");
        Ok(payments
            .iter()
            .filter(|payment| payment.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn create_payment(
        &self,
        params: CreatePaymentParams,
    ) -> Result<PaymentRecord, RepoError> {
        let now = OffsetDateTime::now_utc();
        let payment = PaymentRecord {
            id: Uuid::new_v4(),
            user_id: params.user_id,
            course_id: params.course_id,
            amount: params.amount,
            currency: params.currency,
            status: params.status,
            payment_method: params.payment_method,
            transaction_id: params.transaction_id,
            created_at: now,
            updated_at: now,
        };
        write_table(&self.payments, "payments").push(payment.clone());
        Ok(payment)
    }

    async fn completed_revenue(&self) -> Result<Decimal, RepoError> {
        let payments = read_table(&self.payments, "payments");
        let mut total = payments
            .iter()
            .filter(|payment| payment.status == PaymentStatus::Completed)
            .try_fold(Decimal::ZERO, |sum, payment| sum.checked_add(payment.amount))
            .ok_or_else(|| RepoError::Integrity {
                message: "revenue total overflowed".to_string(),
            })?;
        total.rescale(SCALE);
        Ok(total)
    }
}

#[async_trait]
impl WishlistRepo for MemoryRepositories {
    async fn list_wishlist_for_user(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<WishlistRecord>, RepoError> {
        let wishlist = read_table(&self.wishlist, "wishlist");
        let mut rows: Vec<WishlistRecord> = wishlist
            .iter()
            .rev()
            .filter(|entry| entry.user_id == user_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }

    async fn find_wishlist_entry(
        &self,
        user_id: Uuid,
        course_id: Uuid,
    ) -> Result<Option<WishlistRecord>, RepoError> {
        let wishlist = read_table(&self.wishlist, "wishlist");
        Ok(wishlist
            .iter()
            .find(|entry| entry.user_id == user_id && entry.course_id == course_id)
            .cloned())
    }

    async fn add_to_wishlist(
        &self,
        params: CreateWishlistParams,
    ) -> Result<WishlistRecord, RepoError> {
        let mut wishlist = write_table(&self.wishlist, "wishlist");
        if wishlist
            .iter()
            .any(|entry| entry.user_id == params.user_id && entry.course_id == params.course_id)
        {
            return Err(RepoError::duplicate(constraints::WISHLIST_USER_COURSE));
        }
        let entry = WishlistRecord {
            id: Uuid::new_v4(),
            user_id: params.user_id,
            course_id: params.course_id,
            created_at: OffsetDateTime::now_utc(),
        };
        wishlist.push(entry.clone());
        Ok(entry)
    }

    async fn remove_from_wishlist(
        &self,
        user_id: Uuid,
        course_id: Uuid,
    ) -> Result<bool, RepoError> {
        let mut wishlist = write_table(&self.wishlist, "wishlist");
        let before = wishlist.len();
        wishlist.retain(|entry| !(entry.user_id == user_id && entry.course_id == course_id));
        Ok(wishlist.len() != before)
    }
}
