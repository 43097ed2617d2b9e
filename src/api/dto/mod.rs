//! Data Transfer Objects for API responses.
//!
//! DTOs are organized by domain:
//! - `health` - Service info, liveness and readiness responses
//! - `notification` - Dispatch responses
//! - `error` - Common error response DTOs

mod error;
mod health;
mod notification;

pub use error::ErrorResponse;
pub use health::{HealthResponse, HealthStatus, ReadinessResponse, ServiceInfo};
pub use notification::{ChatNotificationResponse, EmailNotificationResponse};
