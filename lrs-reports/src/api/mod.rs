//! HTTP API handlers for lrs-reports

pub mod catalog;
pub mod error;
pub mod extract;
pub mod health;
pub mod principal;
pub mod ratings;
pub mod reports;
pub mod stats;

pub use error::{ApiError, ApiResult};
pub use extract::{ApiJson, ApiPath};
pub use health::health_routes;
pub use principal::{AuthPrincipal, USER_ID_HEADER, USER_ROLE_HEADER};
