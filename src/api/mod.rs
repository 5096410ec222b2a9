use serde_json::{Map, Value};
use std::cell::Cell;
use std::time::{Duration, Instant};

use crate::error::ProviderError;

pub mod quote_summary_client;
pub use quote_summary_client::QuoteSummaryClient;

/// Provider field names
pub const TRAILING_PE: &str = "trailingPE";
pub const FORWARD_PE: &str = "forwardPE";
pub const HELD_PERCENT_INSIDERS: &str = "heldPercentInsiders";
pub const MARKET_CAP: &str = "marketCap";
pub const ENTERPRISE_TO_EBITDA: &str = "enterpriseToEbitda";

/// Simple rate limiter for API requests
pub struct ApiRateLimiter {
    delay: Duration,
    last_request: Cell<Option<Instant>>,
}

impl ApiRateLimiter {
    pub fn new(requests_per_minute: u32) -> Self {
        let delay_ms = if requests_per_minute > 0 {
            60_000 / requests_per_minute as u64
        } else {
            1000 // Default 1 second delay
        };

        Self {
            delay: Duration::from_millis(delay_ms),
            last_request: Cell::new(None),
        }
    }

    /// Block until at least one delay has passed since the previous request.
    pub fn wait(&self) {
        if let Some(last) = self.last_request.get() {
            let elapsed = last.elapsed();
            if elapsed < self.delay {
                std::thread::sleep(self.delay - elapsed);
            }
        }
        self.last_request.set(Some(Instant::now()));
    }
}

/// Source of point-in-time market metrics
#[cfg_attr(test, mockall::automock)]
pub trait LiveMetricsProvider {
    /// Named numeric fields for one ticker. Absent fields are simply left out.
    fn fetch_info(&self, ticker: &str) -> Result<Map<String, Value>, ProviderError>;
}
