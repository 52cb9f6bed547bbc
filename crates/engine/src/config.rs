//! Engine configuration.

use std::time::Duration;

/// Tunables for the report generator. Defaults suit interactive use; the
/// export ceiling exists because exports fetch the full result set in one
/// pass.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Maximum page size for interactive requests.
    pub interactive_page_ceiling: usize,
    /// Maximum page size when an export format is requested.
    pub export_page_ceiling: usize,
    /// End-to-end bound on the concurrent data+count queries.
    pub query_timeout: Duration,
    /// Time-to-live for cached envelopes.
    pub cache_ttl: Duration,
    /// Trailing sales window for dead-stock detection.
    pub dead_stock_window_days: i64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            interactive_page_ceiling: 100,
            export_page_ceiling: 50_000,
            query_timeout: Duration::from_secs(10),
            cache_ttl: Duration::from_secs(60),
            dead_stock_window_days: 90,
        }
    }
}

impl EngineConfig {
    pub fn with_query_timeout(mut self, timeout: Duration) -> Self {
        self.query_timeout = timeout;
        self
    }

    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    pub fn with_dead_stock_window_days(mut self, days: i64) -> Self {
        self.dead_stock_window_days = days;
        self
    }

    pub fn with_page_ceilings(mut self, interactive: usize, export: usize) -> Self {
        self.interactive_page_ceiling = interactive;
        self.export_page_ceiling = export;
        self
    }
}
