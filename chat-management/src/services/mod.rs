//! Application services for the authentication and session core.

pub mod auth_service;
pub mod metrics;

pub use auth_service::{AuthService, AuthServiceDeps};
pub use metrics::Metrics;
