//! Course review workflow.
//!
//! Allowed moves: `draft → pending` (submit), `pending → published | rejected`
//! (review), `pending → draft` (withdraw), `rejected → pending | draft`
//! (resubmit or rework) and `published → draft` (unpublish). Only admins may
//! move a course into `published` or `rejected`.

use time::OffsetDateTime;

use crate::domain::{entities::CourseRecord, error::DomainError, types::CourseStatus};

/// Who is asking for the transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reviewer {
    Author,
    Admin,
}

/// Outcome of validating a status change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Unchanged,
    Move {
        from: CourseStatus,
        to: CourseStatus,
    },
}

fn edge_allowed(from: CourseStatus, to: CourseStatus) -> bool {
    use CourseStatus::*;
    matches!(
        (from, to),
        (Draft, Pending)
            | (Pending, Published)
            | (Pending, Rejected)
            | (Pending, Draft)
            | (Rejected, Pending)
            | (Rejected, Draft)
            | (Published, Draft)
    )
}

/// Validate `from → to` for the given reviewer.
pub fn plan_transition(
    from: CourseStatus,
    to: CourseStatus,
    reviewer: Reviewer,
) -> Result<Transition, DomainError> {
    if from == to {
        return Ok(Transition::Unchanged);
    }
    if matches!(to, CourseStatus::Published | CourseStatus::Rejected) && reviewer != Reviewer::Admin
    {
        return Err(DomainError::forbidden(
            "Only admins can publish or reject courses",
        ));
    }
    if !edge_allowed(from, to) {
        return Err(DomainError::validation(format!(
            "Cannot change course status from {from} to {to}"
        )));
    }
    Ok(Transition::Move { from, to })
}

/// Apply a validated transition to `course`.
///
/// `explicit_published` carries an `isPublished` value supplied in the same
/// request; when present it wins over the status-implied visibility.
pub fn apply_transition(
    course: &mut CourseRecord,
    transition: Transition,
    explicit_published: Option<bool>,
    now: OffsetDateTime,
) {
    if let Transition::Move { from, to } = transition {
        course.status = to;
        let implied = match (from, to) {
            (_, CourseStatus::Published) => Some(true),
            (_, CourseStatus::Rejected) | (CourseStatus::Published, _) => Some(false),
            _ => None,
        };
        if let Some(visible) = explicit_published.or(implied) {
            set_published(course, visible, now);
        }
    } else if let Some(visible) = explicit_published {
        set_published(course, visible, now);
    }
}

/// Toggle visibility, stamping `published_at` the first time a course goes live.
pub fn set_published(course: &mut CourseRecord, visible: bool, now: OffsetDateTime) {
    course.is_published = visible;
    if visible && course.published_at.is_none() {
        course.published_at = Some(now);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use crate::domain::types::CourseLevel;
    use time::macros::datetime;
    use uuid::Uuid;

    fn course(status: CourseStatus) -> CourseRecord {
        let at = datetime!(2026-01-01 00:00 UTC);
        CourseRecord {
            id: Uuid::new_v4(),
            title: "Rust".into(),
            title_en: None,
            title_fa: None,
            slug: "rust".into(),
            description: "Ownership".into(),
            short_description: None,
            thumbnail: None,
            preview_video: None,
            price: Decimal::ZERO,
            original_price: None,
            level: CourseLevel::Beginner,
            status,
            language: "en".into(),
            duration: None,
            lessons_count: 0,
            students_count: 0,
            rating: Decimal::ZERO,
            reviews_count: 0,
            instructor_id: Uuid::new_v4(),
            category_id: Uuid::new_v4(),
            tags: Vec::new(),
            requirements: Vec::new(),
            what_you_will_learn: Vec::new(),
            is_featured: false,
            is_published: false,
            published_at: None,
            created_at: at,
            updated_at: at,
        }
    }

    #[test]
    fn author_can_submit_and_withdraw() {
        assert!(matches!(
            plan_transition(CourseStatus::Draft, CourseStatus::Pending, Reviewer::Author),
            Ok(Transition::Move { .. })
        ));
        assert!(matches!(
            plan_transition(CourseStatus::Pending, CourseStatus::Draft, Reviewer::Author),
            Ok(Transition::Move { .. })
        ));
    }

    #[test]
    fn only_admin_publishes_or_rejects() {
        let err = plan_transition(
            CourseStatus::Pending,
            CourseStatus::Published,
            Reviewer::Author,
        )
        .expect_err("author cannot publish");
        assert!(matches!(err, DomainError::Forbidden { .. }));

        assert!(
            plan_transition(CourseStatus::Pending, CourseStatus::Rejected, Reviewer::Admin).is_ok()
        );
    }

    #[test]
    fn draft_cannot_jump_to_published() {
        let err = plan_transition(CourseStatus::Draft, CourseStatus::Published, Reviewer::Admin)
            .expect_err("must pass review first");
        assert!(matches!(err, DomainError::Validation { .. }));
    }

    #[test]
    fn same_state_is_a_noop() {
        assert_eq!(
            plan_transition(CourseStatus::Draft, CourseStatus::Draft, Reviewer::Author),
            Ok(Transition::Unchanged)
        );
    }

    #[test]
    fn approval_publishes_and_stamps_once() {
        let now = datetime!(2026-02-01 12:00 UTC);
        let mut record = course(CourseStatus::Pending);
        let transition =
            plan_transition(record.status, CourseStatus::Published, Reviewer::Admin).expect("ok");
        apply_transition(&mut record, transition, None, now);
        assert_eq!(record.status, CourseStatus::Published);
        assert!(record.is_published);
        assert_eq!(record.published_at, Some(now));

        let later = datetime!(2026-03-01 12:00 UTC);
        let back = plan_transition(record.status, CourseStatus::Draft, Reviewer::Author).expect("ok");
        apply_transition(&mut record, back, None, later);
        assert!(!record.is_published);

        let again = plan_transition(record.status, CourseStatus::Pending, Reviewer::Author)
            .expect("resubmit");
        apply_transition(&mut record, again, None, later);
        let republish =
            plan_transition(record.status, CourseStatus::Published, Reviewer::Admin).expect("ok");
        apply_transition(&mut record, republish, None, later);
        assert_eq!(record.published_at, Some(now));
    }

    #[test]
    fn explicit_visibility_overrides_status_default() {
        let now = datetime!(2026-02-01 12:00 UTC);
        let mut record = course(CourseStatus::Pending);
        let transition =
            plan_transition(record.status, CourseStatus::Rejected, Reviewer::Admin).expect("ok");
        apply_transition(&mut record, transition, Some(true), now);
        assert_eq!(record.status, CourseStatus::Rejected);
        assert!(record.is_published);
    }
}
