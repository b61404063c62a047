use crate::config::Config;

/// Shared application state injected into all route handlers via Axum extractors.
/// Immutable after startup; the compiler itself keeps no state between calls.
#[derive(Debug, Clone)]
pub struct AppState {
    pub config: Config,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        AppState { config }
    }
}
