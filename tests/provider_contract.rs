//! Contract tests for the provider adapters, driven through the public API
//! with a scripted transport.

use std::sync::Arc;

use tickscan_core::{
    AlphaVantageAdapter, ApiKey, DirectorySink, Endpoint, ExchangeCode, FinnhubAdapter, FmpAdapter,
    ProviderErrorKind, Symbol, SymbolList, MAX_BATCH_SYMBOLS,
};
use tickscan_tests::{intraday_body, overview_body, ScriptedHttpClient};

fn key() -> ApiKey {
    ApiKey::new("contract-key").expect("valid key")
}

fn symbol(raw: &str) -> Symbol {
    Symbol::parse(raw).expect("valid symbol")
}

fn directory_record(symbol: &str) -> String {
    format!(
        r#"{{"currency":"USD","description":"{symbol} HOLDINGS","displaySymbol":"{symbol}","figi":"BBG00TEST","mic":"XNAS","symbol":"{symbol}","type":"Common Stock"}}"#
    )
}

fn quote_record(symbol: &str, price: f64) -> String {
    format!(
        r#"{{"symbol":"{symbol}","name":"{symbol} Inc","price":{price},"priceAvg50":{price},"priceAvg200":{price},"exchange":"NASDAQ","volume":1000,"timestamp":1700000000}}"#
    )
}

// =============================================================================
// Symbol directory
// =============================================================================

#[tokio::test]
async fn directory_with_k_records_yields_k_symbols_in_order() {
    let names = (0..250).map(|index| format!("T{index:03}")).collect::<Vec<_>>();
    let body = format!(
        "[{}]",
        names
            .iter()
            .map(|name| directory_record(name))
            .collect::<Vec<_>>()
            .join(",")
    );
    let client = ScriptedHttpClient::new()
        .route("/stock/symbol?exchange=US", body)
        .with_chunk_size(3)
        .into_shared();
    let adapter = FinnhubAdapter::new(client.clone());

    let symbols = adapter
        .list_symbols(&ExchangeCode::parse("US").expect("valid"), &key())
        .await
        .expect("directory");

    assert_eq!(symbols.len(), names.len());
    assert!(symbols
        .iter()
        .zip(&names)
        .all(|(symbol, name)| symbol.as_str() == name));
    assert_eq!(client.requests().len(), 1);
}

#[tokio::test]
async fn empty_directory_is_an_empty_list() {
    let client = ScriptedHttpClient::new().route("/stock/symbol", "[]").into_shared();
    let adapter = FinnhubAdapter::new(client);

    let symbols = adapter
        .list_symbols(&ExchangeCode::parse("XETRA").expect("valid"), &key())
        .await
        .expect("empty directory");

    assert!(symbols.is_empty());
}

#[tokio::test]
async fn directory_keeps_symbols_with_spaces() {
    let names = ["AAPL", "BRK A", "MSFT"];
    let body = format!(
        "[{}]",
        names
            .iter()
            .map(|name| directory_record(name))
            .collect::<Vec<_>>()
            .join(",")
    );
    let client = ScriptedHttpClient::new().route("/stock/symbol", body).into_shared();
    let adapter = FinnhubAdapter::new(client);

    let symbols = adapter
        .list_symbols(&ExchangeCode::parse("US").expect("valid"), &key())
        .await
        .expect("directory");

    assert_eq!(symbols.len(), names.len());
    assert_eq!(symbols.as_slice()[1].as_str(), "BRK A");
}

#[tokio::test]
async fn directory_record_without_symbol_fails_the_call() {
    let body = format!("[{},{{\"description\":\"NO SYMBOL\"}}]", directory_record("AAPL"));
    let client = ScriptedHttpClient::new().route("/stock/symbol", body).into_shared();
    let adapter = FinnhubAdapter::new(client);

    let error = adapter
        .list_symbols(&ExchangeCode::parse("US").expect("valid"), &key())
        .await
        .expect_err("malformed record");

    assert_eq!(error.kind(), ProviderErrorKind::Decode);
    assert!(error.message().starts_with("list_symbols: "));
}

#[tokio::test]
async fn directory_error_never_leaks_the_api_key() {
    let client = ScriptedHttpClient::new()
        .route_status("/stock/symbol", 401)
        .into_shared();
    let adapter = FinnhubAdapter::new(client);

    let error = adapter
        .list_symbols(&ExchangeCode::parse("US").expect("valid"), &key())
        .await
        .expect_err("unauthorized");

    assert_eq!(error.kind(), ProviderErrorKind::Request);
    assert!(!error.to_string().contains("contract-key"));
}

// =============================================================================
// Batch quotes
// =============================================================================

#[tokio::test]
async fn more_than_the_cap_requests_only_the_first_thousand() {
    let client = ScriptedHttpClient::new().route("/quote/", "[]").into_shared();
    let adapter = FmpAdapter::new(client.clone());
    let requested = (0..1_500)
        .map(|index| symbol(&format!("Q{index}")))
        .collect::<Vec<_>>();

    adapter
        .fetch_quotes(&requested, &key())
        .await
        .expect("empty batch");

    let requests = client.requests();
    assert_eq!(requests.len(), 1);
    let path = requests[0]
        .url
        .split_once("/quote/")
        .and_then(|(_, rest)| rest.split_once('?'))
        .map(|(joined, _)| joined.to_owned())
        .expect("quote path");
    let sent = path.split(',').collect::<Vec<_>>();
    assert_eq!(sent.len(), MAX_BATCH_SYMBOLS);
    assert_eq!(sent[999], "Q999");
    assert!(!sent.contains(&"Q1000"));
}

#[tokio::test]
async fn one_malformed_record_among_many_is_skipped() {
    let mut records = (0..12)
        .map(|index| quote_record(&format!("M{index}"), f64::from(index) + 0.5))
        .collect::<Vec<_>>();
    records.insert(4, r#"{"symbol":"BROKEN","price":{"nested":true}}"#.to_owned());
    let body = format!("[{}]", records.join(","));
    let client = ScriptedHttpClient::new()
        .route("/quote/", body)
        .with_chunk_size(11)
        .into_shared();
    let adapter = FmpAdapter::new(client);
    let requested = (0..12)
        .map(|index| symbol(&format!("M{index}")))
        .chain(std::iter::once(symbol("BROKEN")))
        .collect::<Vec<_>>();

    let batch = adapter
        .fetch_quotes(&requested, &key())
        .await
        .expect("tolerant batch");

    assert_eq!(batch.quotes.len(), 12);
    assert_eq!(batch.rejected.len(), 1);
    assert_eq!(batch.rejected[0].index, 4);
    assert_eq!(batch.quotes[4].symbol.as_str(), "M4");
    assert_eq!(batch.quotes[11].price, Some(11.5));
}

#[tokio::test]
async fn quotes_accept_the_legacy_long_average_field() {
    let body = r#"[{"symbol":"OLD","price":10.0,"priceAvg100":12.5}]"#;
    let client = ScriptedHttpClient::new().route("/quote/", body).into_shared();
    let adapter = FmpAdapter::new(client);

    let batch = adapter
        .fetch_quotes(&[symbol("OLD")], &key())
        .await
        .expect("batch");

    assert_eq!(batch.quotes[0].price_avg200, Some(12.5));
}

#[tokio::test]
async fn rate_limited_batch_reports_rate_limited() {
    let client = ScriptedHttpClient::new().route_status("/quote/", 429).into_shared();
    let adapter = FmpAdapter::new(client);

    let error = adapter
        .fetch_quotes(&[symbol("AAPL")], &key())
        .await
        .expect_err("throttled");

    assert_eq!(error.kind(), ProviderErrorKind::RateLimited);
    assert!(error.retryable());
}

#[tokio::test]
async fn batched_fetch_covers_the_whole_list() {
    let client = ScriptedHttpClient::new()
        .route("/quote/B0,", format!("[{}]", quote_record("B0", 1.0)))
        .route("/quote/B1000", format!("[{}]", quote_record("B1000", 2.0)))
        .into_shared();
    let adapter = FmpAdapter::new(client.clone());
    let list = (0..1_001)
        .map(|index| symbol(&format!("B{index}")))
        .collect::<SymbolList>();

    let batch = adapter
        .fetch_quotes_in_batches(&list, &key())
        .await
        .expect("two batches");

    assert_eq!(client.requests().len(), 2);
    assert_eq!(batch.quotes.len(), 2);
}

// =============================================================================
// Alpha Vantage
// =============================================================================

#[tokio::test]
async fn last_price_is_the_close_of_the_latest_timestamp() {
    let body = intraday_body(&[
        ("2024-03-01 09:30:00", "10.00"),
        ("2024-03-01 09:31:00", "11.00"),
        ("2024-03-01 09:29:00", "9.00"),
    ]);
    let client = ScriptedHttpClient::new()
        .route("TIME_SERIES_INTRADAY", body)
        .into_shared();
    let adapter = AlphaVantageAdapter::new(client.clone());

    let price = adapter.last_price(&symbol("IBM"), &key()).await.expect("price");

    assert_eq!(price, 11.0);
    let requests = client.requests();
    assert!(requests[0].url.contains("interval=1min"));
}

#[tokio::test]
async fn throttle_notice_is_rate_limited() {
    let client = ScriptedHttpClient::new()
        .route(
            "function=OVERVIEW",
            r#"{"Note":"Thank you for using Alpha Vantage! Our standard API call frequency is 5 calls per minute."}"#,
        )
        .into_shared();
    let adapter = AlphaVantageAdapter::new(client);

    let error = adapter
        .overview(&symbol("IBM"), &key())
        .await
        .expect_err("throttled");

    assert_eq!(error.kind(), ProviderErrorKind::RateLimited);
}

#[tokio::test]
async fn overview_exposes_fundamentals() {
    let client = ScriptedHttpClient::new()
        .route("function=OVERVIEW", overview_body("12.5", "140.1", "135.2", "160"))
        .into_shared();
    let adapter = AlphaVantageAdapter::new(client);

    let overview = adapter.overview(&symbol("IBM"), &key()).await.expect("overview");

    assert_eq!(overview.pe_ratio().expect("pe"), 12.5);
    assert_eq!(overview.analyst_target_price().expect("target"), 160.0);
    assert_eq!(overview.text("Name"), Some("International Business Machines"));
}

#[tokio::test]
async fn captured_bodies_land_in_the_capture_directory() {
    let dir = tempfile::tempdir().expect("temp dir");
    let sink = Arc::new(DirectorySink::new(dir.path()).expect("sink"));
    let body = format!("[{}]", directory_record("AAPL"));
    let client = ScriptedHttpClient::new().route("/stock/symbol", body.clone()).into_shared();
    let adapter = FinnhubAdapter::new(client).with_sink(sink.clone());

    adapter
        .list_symbols(&ExchangeCode::parse("US").expect("valid"), &key())
        .await
        .expect("directory");

    let captured = std::fs::read_to_string(sink.path_for(Endpoint::SymbolDirectory, "US"))
        .expect("capture file");
    assert_eq!(captured, body);
}
