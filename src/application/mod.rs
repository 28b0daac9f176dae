//! Application services: authorization, validation and orchestration over
//! the repository traits.

pub mod auth;
pub mod blog;
pub mod categories;
pub mod courses;
pub mod dashboard;
pub mod enrollments;
pub mod error;
pub mod lessons;
pub mod pagination;
pub mod repos;
pub mod reviews;
pub mod sessions;
pub mod users;
pub mod wishlist;
