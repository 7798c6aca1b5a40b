//! HTTP server configuration object and helpers.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use medibook::domain::WindowRateLimiter;
use medibook::outbound::persistence::DbPool;

/// Everything the server needs beyond the route table.
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) db_pool: Option<DbPool>,
    pub(crate) general_limiter: Arc<WindowRateLimiter>,
    pub(crate) partner_limiter: Arc<WindowRateLimiter>,
    pub(crate) partner_api_keys: Vec<String>,
    pub(crate) sweep_interval: Duration,
}

impl ServerConfig {
    /// Construct a configuration backed by the in-memory store.
    #[must_use]
    pub fn new(
        bind_addr: SocketAddr,
        general_limiter: Arc<WindowRateLimiter>,
        partner_limiter: Arc<WindowRateLimiter>,
    ) -> Self {
        Self {
            bind_addr,
            db_pool: None,
            general_limiter,
            partner_limiter,
            partner_api_keys: Vec::new(),
            sweep_interval: Duration::from_secs(60),
        }
    }

    /// Attach a database connection pool; repositories switch to Diesel.
    #[must_use]
    pub fn with_db_pool(mut self, pool: DbPool) -> Self {
        self.db_pool = Some(pool);
        self
    }

    /// Set the partner API keys accepted by the certificate lookup.
    #[must_use]
    pub fn with_partner_api_keys(mut self, keys: Vec<String>) -> Self {
        self.partner_api_keys = keys;
        self
    }

    /// Set how often stale rate-limit windows are swept.
    #[must_use]
    pub fn with_sweep_interval(mut self, every: Duration) -> Self {
        self.sweep_interval = every;
        self
    }
}
