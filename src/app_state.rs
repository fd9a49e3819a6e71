// =============================================================================
// Application Context
// =============================================================================
//
// Immutable request-scoped context handed to every handler via
// `State<Arc<AppState>>`. There is deliberately no shared mutable state: the
// service fetches fresh provider data per request and derives everything else
// on the fly.
// =============================================================================

use crate::config::ServiceConfig;
use crate::yahoo::YahooClient;

/// Shared, read-only context for the REST handlers.
pub struct AppState {
    pub config: ServiceConfig,
    pub market: YahooClient,
    /// Instant the service started. Used for uptime reporting.
    pub start_time: std::time::Instant,
}

impl AppState {
    /// Construct the context from the given configuration.
    pub fn new(config: ServiceConfig) -> Self {
        let market = YahooClient::new(config.provider_base_url.clone(), config.request_timeout());
        Self {
            config,
            market,
            start_time: std::time::Instant::now(),
        }
    }

    pub fn uptime_secs(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}
