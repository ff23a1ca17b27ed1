use crate::{config::Config, upstream::UpstreamClient};
use std::sync::Arc;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<Config>,
    /// Outbound gateway with connection pooling and spoofed identity
    pub upstream: UpstreamClient,
}

impl AppState {
    /// Create a new AppState with the given configuration
    pub fn new(config: Config) -> Self {
        let config = Arc::new(config);
        let upstream = UpstreamClient::new(Arc::clone(&config));

        Self { config, upstream }
    }
}
