//! Application state for Axum web framework.
//!
//! Contains shared services and the resolved settings that are accessible
//! across all request handlers.

use std::sync::Arc;

use crate::config::Settings;
use crate::error::AppResult;
use crate::services::Services;

/// Application state containing all shared services and resources.
///
/// This struct is designed to be used with Axum's State extractor.
/// Cloning is cheap since services and settings are behind `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// All business logic services
    pub services: Services,
    /// Settings the service was started with
    pub settings: Arc<Settings>,
}

impl AppState {
    /// Creates a new AppState, building every provider from `settings`.
    ///
    /// # Errors
    /// Fails when the shared HTTP client cannot be built.
    pub fn new(settings: Arc<Settings>) -> AppResult<Self> {
        let services = Services::new(&settings)?;
        Ok(Self::with_services(settings, services))
    }

    /// Creates an AppState around already built services.
    pub fn with_services(settings: Arc<Settings>, services: Services) -> Self {
        Self { services, settings }
    }
}
