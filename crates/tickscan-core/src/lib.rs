//! # tickscan core
//!
//! Market data aggregation and the valuation screen.
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`adapters`] | Finnhub symbol directory, FMP batch quotes, Alpha Vantage overview and intraday |
//! | [`admission`] | Rate, deadline and concurrency gate for callers screening many symbols |
//! | [`capture`] | Optional raw-response sink |
//! | [`decode`] | Streamed array splitter and checked dynamic documents |
//! | [`domain`] | Symbols, exchange codes, api keys, provider records |
//! | [`endpoint`] | Endpoint table and decode strategy per endpoint |
//! | [`error`] | Validation and provider errors |
//! | [`http_client`] | Transport trait and the reqwest implementation |
//! | [`screening`] | Screening rules and the [`Screener`] |
//!
//! ## Data flow
//!
//! ```text
//! FinnhubAdapter::list_symbols ──▶ SymbolList ──▶ FmpAdapter::fetch_quotes
//!
//! Screener::is_interesting ──▶ AlphaVantageAdapter::overview
//!                          └─▶ AlphaVantageAdapter::last_price
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use tickscan_core::{AlphaVantageAdapter, ApiKey, Screener, Symbol};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let screener = Screener::new(AlphaVantageAdapter::default());
//!     let key = ApiKey::new(std::env::var("TICKSCAN_ALPHAVANTAGE_API_KEY")?)?;
//!
//!     let interesting = screener.is_interesting(&Symbol::parse("IBM")?, &key).await?;
//!     println!("IBM interesting: {interesting}");
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! ```rust
//! use tickscan_core::{ProviderError, ProviderErrorKind};
//!
//! fn describe(error: &ProviderError) -> &'static str {
//!     match error.kind() {
//!         ProviderErrorKind::RateLimited => "wait for the quota window",
//!         ProviderErrorKind::Parse | ProviderErrorKind::Schema => "provider data is incomplete",
//!         _ => "request failed",
//!     }
//! }
//!
//! assert_eq!(describe(&ProviderError::parse("PERatio")), "provider data is incomplete");
//! ```

pub mod adapters;
pub mod admission;
pub mod capture;
pub mod decode;
pub mod domain;
pub mod endpoint;
pub mod error;
pub mod http_client;
pub mod screening;

pub use adapters::{
    AlphaVantageAdapter, FinnhubAdapter, FmpAdapter, FundamentalsOverview, IntradaySeries,
    MAX_BATCH_SYMBOLS,
};

pub use admission::{screen_all, AdmissionGate, AdmissionPolicy, ScreeningOutcome};

pub use capture::{DirectorySink, ResponseSink};

pub use domain::{
    ApiKey, ExchangeCode, QuoteBatch, QuoteOverview, RejectedElement, Symbol, SymbolList,
    SymbolRecord,
};

pub use endpoint::{DecodeStrategy, Endpoint, ProviderId};

pub use error::{CoreError, ProviderError, ProviderErrorKind, ValidationError};

pub use http_client::{
    HttpClient, HttpError, HttpRequest, HttpResponse, ReqwestHttpClient, StreamingResponse,
};

pub use screening::{Screener, Screening, ScreeningInputs, ScreeningRules};
