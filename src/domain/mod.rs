//! Domain layer types and invariants.

pub mod courses;
pub mod entities;
pub mod error;
pub mod money;
pub mod slug;
pub mod types;
