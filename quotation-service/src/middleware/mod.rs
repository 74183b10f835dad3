pub mod auth;
pub mod metrics;

pub use auth::{admin_middleware, auth_middleware, AuthUser, AUTH_COOKIE};
pub use metrics::metrics_middleware;
