//! coursehub: an e-learning marketplace served over a JSON API.

pub mod application;
pub mod config;
pub mod domain;
pub mod infra;
