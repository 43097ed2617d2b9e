//! Service layer for business logic operations.
//!
//! Services are built once from settings and shared with handlers through
//! the application state.

pub mod notifications;

pub use notifications::NotificationService;

use crate::config::Settings;
use crate::error::AppResult;
use crate::external::build_http_client;
use notifications::{EmailProvider, TeamsProvider};

/// Aggregates all services for convenient access.
///
/// This struct is designed to be used as Axum application state.
/// Cloning is cheap since providers are behind `Arc`.
#[derive(Clone)]
pub struct Services {
    pub notifications: NotificationService,
}

impl Services {
    /// Creates the services from resolved settings.
    pub fn new(settings: &Settings) -> AppResult<Self> {
        let client = build_http_client(settings.teams.timeout())?;
        let teams = TeamsProvider::new(&settings.teams, client);
        let email = EmailProvider::new(settings.smtp.clone());

        Ok(Self {
            notifications: NotificationService::new(teams, email),
        })
    }
}
