//! Application state
//!
//! Holds the shared state for the Axum application: the service context,
//! which also carries the configuration.

use std::sync::Arc;

use leave_common::AppConfig;
use leave_service::ServiceContext;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    service_context: Arc<ServiceContext>,
}

impl AppState {
    pub fn new(service_context: ServiceContext) -> Self {
        Self {
            service_context: Arc::new(service_context),
        }
    }

    pub fn service_context(&self) -> &ServiceContext {
        &self.service_context
    }

    pub fn config(&self) -> &AppConfig {
        self.service_context.config()
    }

    /// Name of the browser session cookie.
    pub fn session_cookie_name(&self) -> &str {
        &self.config().session.cookie_name
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("service_context", &self.service_context)
            .finish()
    }
}
