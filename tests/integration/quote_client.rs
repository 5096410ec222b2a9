//! Live metrics over HTTP against a mock quoteSummary server

use magic_screener::api::{LiveMetricsProvider, QuoteSummaryClient};
use magic_screener::enrichment::{LiveMetricsEnricher, PE_FETCH_FAILED, PE_MISSING};
use magic_screener::error::ProviderError;
use magic_screener::models::TICKER;
use polars::df;
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::common::fixtures::cells;
use crate::common::logging;

fn summary(trailing_pe: f64, market_cap: f64) -> serde_json::Value {
    json!({
        "quoteSummary": {
            "result": [{
                "summaryDetail": {
                    "trailingPE": {"raw": trailing_pe, "fmt": format!("{:.2}", trailing_pe)},
                    "marketCap": {"raw": market_cap, "fmt": "n/a"}
                },
                "defaultKeyStatistics": {
                    "heldPercentInsiders": {"raw": 0.0512, "fmt": "5.12%"},
                    "enterpriseToEbitda": {"raw": 11.237, "fmt": "11.24"}
                }
            }],
            "error": null
        }
    })
}

async fn mock_server() -> MockServer {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v10/finance/quoteSummary/GROW"))
        .and(query_param("modules", "summaryDetail,defaultKeyStatistics,financialData"))
        .respond_with(ResponseTemplate::new(200).set_body_json(summary(24.56, 1.23e9)))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v10/finance/quoteSummary/NOPE"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v10/finance/quoteSummary/BARE"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "quoteSummary": {"result": [{"summaryDetail": {}}], "error": null}
        })))
        .mount(&server)
        .await;

    server
}

#[tokio::test(flavor = "multi_thread")]
async fn test_fetch_info_flattens_fields() {
    logging::init_test_logging();
    let server = mock_server().await;
    let base = server.uri();

    let info = tokio::task::spawn_blocking(move || {
        let client = QuoteSummaryClient::with_base_url(&base, 6000).unwrap();
        client.fetch_info("GROW")
    })
    .await
    .unwrap()
    .unwrap();

    assert_eq!(info.get("trailingPE").and_then(|v| v.as_f64()), Some(24.56));
    assert_eq!(info.get("heldPercentInsiders").and_then(|v| v.as_f64()), Some(0.0512));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_http_failure_is_provider_error() {
    let server = mock_server().await;
    let base = server.uri();

    let result = tokio::task::spawn_blocking(move || {
        let client = QuoteSummaryClient::with_base_url(&base, 6000).unwrap();
        client.fetch_info("NOPE")
    })
    .await
    .unwrap();

    assert!(matches!(result, Err(ProviderError::Http { .. })));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_enrich_through_http_client() {
    logging::init_test_logging();
    logging::log_test_step("Enriching GROW, BARE and NOPE over HTTP");
    let server = mock_server().await;
    let base = server.uri();

    let (enriched, progress) = tokio::task::spawn_blocking(move || {
        let table = df!(TICKER => ["GROW", "BARE", "NOPE"]).unwrap();

        let client = QuoteSummaryClient::with_base_url(&base, 6000).unwrap();
        let enricher = LiveMetricsEnricher::new(client);
        let mut progress = Vec::new();
        let mut report = |f: f64| progress.push(f);
        let enriched = enricher.enrich(&table, Some(&mut report)).unwrap();
        (enriched, progress)
    })
    .await
    .unwrap();

    assert_eq!(progress.len(), 3);
    assert_eq!(progress.last().copied(), Some(1.0));

    assert_eq!(cells::float(&enriched, "P_E_ratio", 0), Some(24.6));
    assert_eq!(cells::float(&enriched, "insider_ownership", 0), Some(0.05));
    assert_eq!(cells::text(&enriched, "Market Cap", 0).as_deref(), Some("1.2B"));
    assert_eq!(cells::float(&enriched, "EV/EBITDA", 0), Some(11.24));

    assert_eq!(cells::float(&enriched, "P_E_ratio", 1), Some(PE_MISSING));
    assert_eq!(cells::text(&enriched, "Market Cap", 1).as_deref(), Some("0"));

    assert_eq!(cells::float(&enriched, "P_E_ratio", 2), Some(PE_FETCH_FAILED));
}
