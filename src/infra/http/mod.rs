pub mod api;
mod middleware;

pub use api::{ApiState, AuthCookieSettings, build_api_router as build_router};
