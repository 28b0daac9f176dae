use rust_decimal::Decimal;
use uuid::Uuid;

use super::MemoryRepositories;
use crate::application::pagination::PageRequest;
use crate::application::repos::{
    BlogPostsRepo, CategoriesRepo, CommentsRepo, CourseQueryFilter, CoursesRepo,
    CreateBlogPostParams, CreateCategoryParams, CreateCommentParams, CreateCourseParams,
    CreateEnrollmentParams, CreateLessonParams, CreatePaymentParams, CreateReviewParams,
    CreateUserParams, CreateWishlistParams, EnrollmentsRepo, LessonsRepo, PaymentsRepo,
    RepoError, ReviewsRepo, UsersRepo, WishlistRepo, constraints,
};
use crate::domain::entities::{CategoryRecord, CourseRecord, UserRecord};
use crate::domain::types::{CourseLevel, CourseStatus, PaymentStatus, UserRole};

async fn user(repo: &MemoryRepositories, name: &str, role: UserRole) -> UserRecord {
    repo.create_user(CreateUserParams {
        username: name.to_string(),
        email: format!("{name}@example.com"),
        password_hash: "hash".to_string(),
        first_name: None,
        last_name: None,
        role,
    })
    .await
    .expect("create user")
}

async fn category(repo: &MemoryRepositories, slug: &str) -> CategoryRecord {
    repo.create_category(CreateCategoryParams {
        name: slug.to_string(),
        name_en: slug.to_string(),
        name_fa: slug.to_string(),
        slug: slug.to_string(),
        description: None,
        icon: None,
        color: None,
        is_active: true,
    })
    .await
    .expect("create category")
}

fn course_params(
    slug: &str,
    instructor: Uuid,
    category: Uuid,
    level: CourseLevel,
    published: bool,
) -> CreateCourseParams {
    CreateCourseParams {
        title: slug.replace('-', " "),
        title_en: None,
        title_fa: None,
        slug: slug.to_string(),
        description: format!("About {slug}"),
        short_description: None,
        thumbnail: None,
        preview_video: None,
        price: Decimal::new(4999, 2),
        original_price: None,
        level,
        status: if published {
            CourseStatus::Published
        } else {
            CourseStatus::Draft
        },
        language: "en".to_string(),
        duration: None,
        instructor_id: instructor,
        category_id: category,
        tags: vec!["rust".to_string()],
        requirements: Vec::new(),
        what_you_will_learn: Vec::new(),
        is_featured: false,
        is_published: published,
        published_at: None,
    }
}

async fn course(repo: &MemoryRepositories, slug: &str) -> CourseRecord {
    let instructor = user(repo, &format!("instructor-{slug}"), UserRole::Instructor).await;
    let cat = category(repo, &format!("cat-{slug}")).await;
    repo.create_course(course_params(
        slug,
        instructor.id,
        cat.id,
        CourseLevel::Beginner,
        true,
    ))
    .await
    .expect("create course")
}

#[tokio::test]
async fn duplicate_usernames_and_emails_are_rejected() {
    let repo = MemoryRepositories::new();
    user(&repo, "ada", UserRole::Student).await;

    let err = repo
        .create_user(CreateUserParams {
            username: "ada".to_string(),
            email: "other@example.com".to_string(),
            password_hash: "hash".to_string(),
            first_name: None,
            last_name: None,
            role: UserRole::Student,
        })
        .await
        .expect_err("duplicate username");
    assert!(matches!(err, RepoError::Duplicate { ref constraint } if constraint == constraints::USERS_USERNAME));

    let err = repo
        .create_user(CreateUserParams {
            username: "grace".to_string(),
            email: "ADA@example.com".to_string(),
            password_hash: "hash".to_string(),
            first_name: None,
            last_name: None,
            role: UserRole::Student,
        })
        .await
        .expect_err("duplicate email");
    assert!(matches!(err, RepoError::Duplicate { ref constraint } if constraint == constraints::USERS_EMAIL));
}

#[tokio::test]
async fn course_filters_combine_as_intersection() {
    let repo = MemoryRepositories::new();
    let instructor = user(&repo, "instructor", UserRole::Instructor).await;
    let web = category(&repo, "web").await;
    let data = category(&repo, "data").await;

    for (slug, cat, level, published) in [
        ("web-basics", web.id, CourseLevel::Beginner, true),
        ("web-advanced", web.id, CourseLevel::Advanced, true),
        ("data-basics", data.id, CourseLevel::Beginner, false),
    ] {
        repo.create_course(course_params(slug, instructor.id, cat, level, published))
            .await
            .expect("create course");
    }

    let filter = CourseQueryFilter {
        category_id: Some(web.id),
        level: Some(CourseLevel::Beginner),
        ..CourseQueryFilter::default()
    };
    let found = repo
        .list_courses(&filter, PageRequest::new(None, None, 50))
        .await
        .expect("list");
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].slug, "web-basics");

    let published = CourseQueryFilter {
        is_published: Some(true),
        ..CourseQueryFilter::default()
    };
    let found = repo
        .list_courses(&published, PageRequest::new(None, None, 50))
        .await
        .expect("list");
    assert_eq!(found.len(), 2);
    assert!(found.iter().all(|course| course.is_published));

    let search = CourseQueryFilter {
        search: Some("ADVANCED".to_string()),
        ..CourseQueryFilter::default()
    };
    let found = repo
        .list_courses(&search, PageRequest::new(None, None, 50))
        .await
        .expect("list");
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].slug, "web-advanced");

    let second_page = repo
        .list_courses(&CourseQueryFilter::default(), PageRequest::new(Some(2), Some(2), 50))
        .await
        .expect("list");
    assert_eq!(second_page.len(), 1);
    assert_eq!(second_page[0].slug, "data-basics");
}

#[tokio::test]
async fn enrollment_and_wishlist_pairs_are_unique() {
    let repo = MemoryRepositories::new();
    let course = course(&repo, "rust-intro").await;
    let student = user(&repo, "student", UserRole::Student).await;
    let pair = CreateEnrollmentParams {
        user_id: student.id,
        course_id: course.id,
    };

    repo.create_enrollment(pair).await.expect("first enrollment");
    let err = repo.create_enrollment(pair).await.expect_err("second");
    assert!(matches!(err, RepoError::Duplicate { .. }));

    let entry = CreateWishlistParams {
        user_id: student.id,
        course_id: course.id,
    };
    repo.add_to_wishlist(entry).await.expect("first wishlist");
    let err = repo.add_to_wishlist(entry).await.expect_err("second");
    assert!(matches!(err, RepoError::Duplicate { .. }));

    assert!(
        repo.remove_from_wishlist(student.id, course.id)
            .await
            .expect("remove")
    );
    assert!(
        !repo
            .remove_from_wishlist(student.id, course.id)
            .await
            .expect("remove again")
    );
}

#[tokio::test]
async fn stats_are_recomputed_from_children() {
    let repo = MemoryRepositories::new();
    let course = course(&repo, "stats").await;
    let alice = user(&repo, "alice", UserRole::Student).await;
    let bob = user(&repo, "bob", UserRole::Student).await;

    for (index, title) in ["one", "two"].into_iter().enumerate() {
        repo.create_lesson(CreateLessonParams {
            course_id: course.id,
            title: title.to_string(),
            description: None,
            video_url: None,
            duration: Some(300),
            order_index: index as i32,
            is_free: false,
        })
        .await
        .expect("lesson");
    }
    for (student, rating) in [(&alice, 5), (&bob, 4)] {
        repo.create_enrollment(CreateEnrollmentParams {
            user_id: student.id,
            course_id: course.id,
        })
        .await
        .expect("enroll");
        repo.create_review(CreateReviewParams {
            user_id: student.id,
            course_id: course.id,
            rating,
            comment: None,
        })
        .await
        .expect("review");
    }

    let refreshed = repo.refresh_course_stats(course.id).await.expect("refresh");
    assert_eq!(refreshed.lessons_count, 2);
    assert_eq!(refreshed.students_count, 2);
    assert_eq!(refreshed.reviews_count, 2);
    assert_eq!(refreshed.rating, Decimal::new(450, 2));

    let mut edited = refreshed.clone();
    edited.title = "Renamed".to_string();
    edited.lessons_count = 0;
    let saved = repo.update_course(&edited).await.expect("update");
    assert_eq!(saved.title, "Renamed");
    assert_eq!(saved.lessons_count, 2);
}

#[tokio::test]
async fn deleting_a_course_cascades_but_keeps_payments() {
    let repo = MemoryRepositories::new();
    let course = course(&repo, "doomed").await;
    let student = user(&repo, "student", UserRole::Student).await;

    let lesson = repo
        .create_lesson(CreateLessonParams {
            course_id: course.id,
            title: "intro".to_string(),
            description: None,
            video_url: None,
            duration: None,
            order_index: 0,
            is_free: true,
        })
        .await
        .expect("lesson");
    let pair = CreateEnrollmentParams {
        user_id: student.id,
        course_id: course.id,
    };
    repo.create_enrollment(pair).await.expect("enroll");
    let review = repo
        .create_review(CreateReviewParams {
            user_id: student.id,
            course_id: course.id,
            rating: 3,
            comment: Some("ok".to_string()),
        })
        .await
        .expect("review");
    repo.add_to_wishlist(CreateWishlistParams {
        user_id: student.id,
        course_id: course.id,
    })
    .await
    .expect("wishlist");
    repo.create_payment(CreatePaymentParams {
        user_id: student.id,
        course_id: course.id,
        amount: course.price,
        currency: "USD".to_string(),
        status: PaymentStatus::Completed,
        payment_method: None,
        transaction_id: None,
    })
    .await
    .expect("payment");

    assert!(repo.delete_course(course.id).await.expect("delete"));
    assert!(!repo.delete_course(course.id).await.expect("delete again"));

    assert!(repo.find_lesson(lesson.id).await.expect("lesson").is_none());
    assert!(repo.find_review(review.id).await.expect("review").is_none());
    assert!(
        repo.find_enrollment_for(student.id, course.id)
            .await
            .expect("enrollment")
            .is_none()
    );
    assert!(
        repo.list_wishlist_for_user(student.id)
            .await
            .expect("wishlist")
            .is_empty()
    );
    assert_eq!(
        repo.list_payments_for_user(student.id)
            .await
            .expect("payments")
            .len(),
        1
    );
    assert_eq!(
        repo.completed_revenue().await.expect("revenue"),
        Decimal::new(4999, 2)
    );
}

#[tokio::test]
async fn deleting_a_comment_removes_its_replies() {
    let repo = MemoryRepositories::new();
    let admin = user(&repo, "admin", UserRole::Admin).await;
    let post = repo
        .create_blog_post(CreateBlogPostParams {
            title: "Hello".to_string(),
            title_en: None,
            title_fa: None,
            slug: "hello".to_string(),
            excerpt: None,
            content: "Body".to_string(),
            thumbnail: None,
            author_id: admin.id,
            category_id: None,
            tags: Vec::new(),
            is_published: true,
            is_featured: false,
            published_at: None,
        })
        .await
        .expect("post");

    let comment = |parent_id| CreateCommentParams {
        content: "text".to_string(),
        user_id: admin.id,
        blog_post_id: post.id,
        parent_id,
    };
    let root = repo.create_comment(comment(None)).await.expect("root");
    let reply = repo
        .create_comment(comment(Some(root.id)))
        .await
        .expect("reply");
    repo.create_comment(comment(Some(reply.id)))
        .await
        .expect("nested reply");
    let other = repo.create_comment(comment(None)).await.expect("other");

    assert!(repo.delete_comment(root.id).await.expect("delete"));
    let remaining = repo
        .list_comments_for_post(post.id)
        .await
        .expect("comments");
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].id, other.id);

    let viewed = repo
        .record_blog_view(post.id)
        .await
        .expect("view")
        .expect("post exists");
    assert_eq!(viewed.views_count, 1);

    assert!(repo.delete_blog_post(post.id).await.expect("delete post"));
    assert!(
        repo.list_comments_for_post(post.id)
            .await
            .expect("comments")
            .is_empty()
    );
}

#[tokio::test]
async fn role_counts_cover_every_user() {
    let repo = MemoryRepositories::new();
    user(&repo, "s1", UserRole::Student).await;
    user(&repo, "s2", UserRole::Student).await;
    user(&repo, "i1", UserRole::Instructor).await;

    let counts = repo.count_users_by_role().await.expect("counts");
    assert_eq!(
        counts,
        vec![(UserRole::Student, 2), (UserRole::Instructor, 1)]
    );

    let instructors = repo
        .list_users(Some(UserRole::Instructor), PageRequest::unbounded())
        .await
        .expect("list");
    assert_eq!(instructors.len(), 1);
}
