//! Services for quotation-service.

pub mod database;
pub mod jwt;
pub mod metrics;
pub mod numbering;

pub use database::Database;
pub use jwt::{JwtService, SessionClaims};
pub use metrics::{get_metrics, init_metrics};
