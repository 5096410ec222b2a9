use anyhow::Result;
use reqwest::blocking::Client;
use serde_json::{Map, Value};
use tracing::debug;
use url::Url;

use super::{ApiRateLimiter, LiveMetricsProvider};
use crate::error::ProviderError;
use crate::models::ScreenerConfig;

const MODULES: &str = "summaryDetail,defaultKeyStatistics,financialData";

/// quoteSummary API client
pub struct QuoteSummaryClient {
    client: Client,
    base_url: String,
    rate_limiter: ApiRateLimiter,
}

impl QuoteSummaryClient {
    pub fn new(config: &ScreenerConfig) -> Result<Self> {
        Self::with_base_url(&config.quote_base_url, config.rate_limit_per_minute)
    }

    pub fn with_base_url(base_url: &str, rate_limit_per_minute: u32) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .user_agent("magic-screener/1.0")
            .build()?;

        // fail early on a malformed base URL
        Url::parse(base_url)?;

        Ok(Self {
            client,
            base_url: base_url.to_string(),
            rate_limiter: ApiRateLimiter::new(rate_limit_per_minute),
        })
    }

    fn summary_url(&self, ticker: &str) -> Result<Url, ProviderError> {
        let bad_url = |message: String| ProviderError::Http { ticker: ticker.to_string(), message };

        let mut url = Url::parse(&self.base_url).map_err(|e| bad_url(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| bad_url(format!("cannot-be-a-base URL: {}", self.base_url)))?
            .pop_if_empty()
            .extend(&["v10", "finance", "quoteSummary", ticker]);
        url.query_pairs_mut().append_pair("modules", MODULES);
        Ok(url)
    }
}

impl LiveMetricsProvider for QuoteSummaryClient {
    fn fetch_info(&self, ticker: &str) -> Result<Map<String, Value>, ProviderError> {
        let url = self.summary_url(ticker)?;
        let http_err = |e: reqwest::Error| ProviderError::Http {
            ticker: ticker.to_string(),
            message: e.to_string(),
        };

        self.rate_limiter.wait();
        debug!("Making request to: {}", url);

        let response = self.client.get(url).send().map_err(http_err)?;
        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::Http {
                ticker: ticker.to_string(),
                message: format!("status {}", status),
            });
        }

        let json: Value = response.json().map_err(http_err)?;
        let info = flatten_quote_summary(&json).map_err(|message| ProviderError::Response {
            ticker: ticker.to_string(),
            message,
        })?;

        debug!("Retrieved {} fields for {}", info.len(), ticker);
        Ok(info)
    }
}

/// Collapse `quoteSummary.result[0]` modules into one field map. Fields of the
/// form `{"raw": n, "fmt": "..."}` become `n`; the first module to define a
/// field wins.
pub fn flatten_quote_summary(json: &Value) -> Result<Map<String, Value>, String> {
    let summary = json
        .get("quoteSummary")
        .ok_or_else(|| "missing quoteSummary".to_string())?;

    if let Some(error) = summary.get("error").filter(|e| !e.is_null()) {
        return Err(format!("provider error: {}", error));
    }

    let result = summary
        .get("result")
        .and_then(Value::as_array)
        .and_then(|r| r.first())
        .and_then(Value::as_object)
        .ok_or_else(|| "empty result".to_string())?;

    let mut fields = Map::new();
    for module in result.values().filter_map(Value::as_object) {
        for (name, value) in module {
            if fields.contains_key(name) {
                continue;
            }
            let flat = match value {
                Value::Object(obj) => obj.get("raw").cloned(),
                Value::Null => None,
                other => Some(other.clone()),
            };
            if let Some(flat) = flat {
                fields.insert(name.clone(), flat);
            }
        }
    }
    Ok(fields)
}
