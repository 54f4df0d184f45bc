use std::sync::Arc;

use tracing::debug;

use super::Transport;
use crate::capture::ResponseSink;
use crate::decode::{parse_number, Document};
use crate::http_client::{HttpClient, ReqwestHttpClient};
use crate::{ApiKey, Endpoint, ProviderError, Symbol};

pub const ALPHAVANTAGE_BASE_URL: &str = "https://www.alphavantage.co";

const INTRADAY_INTERVAL: &str = "1min";
const SERIES_KEY: &str = "Time Series (1min)";
const CLOSE_KEY: &str = "4. close";

pub const PE_RATIO: &str = "PERatio";
pub const MOVING_AVERAGE_200: &str = "200DayMovingAverage";
pub const MOVING_AVERAGE_50: &str = "50DayMovingAverage";
pub const ANALYST_TARGET_PRICE: &str = "AnalystTargetPrice";

/// Alpha Vantage client for company overviews and intraday series.
#[derive(Clone)]
pub struct AlphaVantageAdapter {
    transport: Transport,
    base_url: String,
}

impl Default for AlphaVantageAdapter {
    fn default() -> Self {
        Self::new(Arc::new(ReqwestHttpClient::default()))
    }
}

impl AlphaVantageAdapter {
    pub fn new(http_client: Arc<dyn HttpClient>) -> Self {
        Self {
            transport: Transport::new(http_client),
            base_url: String::from(ALPHAVANTAGE_BASE_URL),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_owned();
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.transport.set_timeout_ms(timeout_ms);
        self
    }

    pub fn with_sink(mut self, sink: Arc<dyn ResponseSink>) -> Self {
        self.transport.set_sink(sink);
        self
    }

    pub fn overview_url(&self, symbol: &Symbol, api_key: &ApiKey) -> String {
        format!(
            "{}/query?function=OVERVIEW&symbol={}&apikey={}",
            self.base_url,
            urlencoding::encode(symbol.as_str()),
            urlencoding::encode(api_key.expose())
        )
    }

    pub fn intraday_url(&self, symbol: &Symbol, api_key: &ApiKey) -> String {
        format!(
            "{}/query?function=TIME_SERIES_INTRADAY&symbol={}&interval={INTRADAY_INTERVAL}&apikey={}",
            self.base_url,
            urlencoding::encode(symbol.as_str()),
            urlencoding::encode(api_key.expose())
        )
    }

    /// Fetches the company overview (fundamentals) for `symbol`.
    pub async fn overview(
        &self,
        symbol: &Symbol,
        api_key: &ApiKey,
    ) -> Result<FundamentalsOverview, ProviderError> {
        let url = self.overview_url(symbol, api_key);
        let document = self
            .query(Endpoint::Overview, symbol, &url)
            .await
            .map_err(|error| error.context("overview"))?;
        Ok(FundamentalsOverview::from_document(document))
    }

    /// Fetches the one-minute intraday series for `symbol`.
    pub async fn intraday(
        &self,
        symbol: &Symbol,
        api_key: &ApiKey,
    ) -> Result<IntradaySeries, ProviderError> {
        let url = self.intraday_url(symbol, api_key);
        let document = self
            .query(Endpoint::Intraday, symbol, &url)
            .await
            .map_err(|error| error.context("intraday"))?;
        Ok(IntradaySeries::from_document(document))
    }

    /// Closing price of the most recent one-minute sample.
    pub async fn last_price(&self, symbol: &Symbol, api_key: &ApiKey) -> Result<f64, ProviderError> {
        let series = self.intraday(symbol, api_key).await?;
        let (timestamp, close) = series
            .latest_close()
            .map_err(|error| error.context("last_price"))?;
        debug!(%symbol, timestamp = %timestamp, close, "last price resolved");
        Ok(close)
    }

    async fn query(
        &self,
        endpoint: Endpoint,
        symbol: &Symbol,
        url: &str,
    ) -> Result<Document, ProviderError> {
        let document = self
            .transport
            .fetch_document(endpoint, symbol.as_str(), url)
            .await?;
        check_notice(&document)?;
        Ok(document)
    }
}

/// Alpha Vantage answers throttled or rejected calls with HTTP 200 and a
/// single explanatory key instead of the requested data.
fn check_notice(document: &Document) -> Result<(), ProviderError> {
    let root = document.root();
    if root.as_object().is_err() {
        return Ok(());
    }

    for key in ["Note", "Information"] {
        if let Some(note) = root.get(key)? {
            let text = note.as_str().unwrap_or("request limit reached");
            return Err(ProviderError::rate_limited(format!("alphavantage notice: {text}")));
        }
    }

    if let Some(message) = root.get("Error Message")? {
        let text = message.as_str().unwrap_or("request rejected");
        return Err(ProviderError::request(format!("alphavantage error: {text}")));
    }

    Ok(())
}

/// Company overview: a flat object whose values are strings.
#[derive(Debug, Clone, PartialEq)]
pub struct FundamentalsOverview {
    document: Document,
}

impl FundamentalsOverview {
    pub fn from_document(document: Document) -> Self {
        Self { document }
    }

    /// Parses `field` as a number. `"None"` and absence are parse errors.
    pub fn number(&self, field: &str) -> Result<f64, ProviderError> {
        self.document.root().number_field(field)
    }

    /// Raw string value of `field`, if present and a string.
    pub fn text(&self, field: &str) -> Option<&str> {
        let root = self.document.root();
        root.get(field).ok().flatten()?.as_str().ok()
    }

    pub fn pe_ratio(&self) -> Result<f64, ProviderError> {
        self.number(PE_RATIO)
    }

    pub fn moving_average_200(&self) -> Result<f64, ProviderError> {
        self.number(MOVING_AVERAGE_200)
    }

    pub fn moving_average_50(&self) -> Result<f64, ProviderError> {
        self.number(MOVING_AVERAGE_50)
    }

    pub fn analyst_target_price(&self) -> Result<f64, ProviderError> {
        self.number(ANALYST_TARGET_PRICE)
    }
}

/// Intraday series keyed by sample timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct IntradaySeries {
    document: Document,
}

impl IntradaySeries {
    pub fn from_document(document: Document) -> Self {
        Self { document }
    }

    /// Timestamp keys sorted ascending as plain strings.
    pub fn timestamps(&self) -> Result<Vec<&str>, ProviderError> {
        let mut timestamps = self.document.root().object(SERIES_KEY)?.keys()?;
        timestamps.sort_unstable();
        Ok(timestamps)
    }

    /// Timestamp and close of the most recent sample.
    ///
    /// "Most recent" is the greatest key in string order. That matches
    /// chronology only while every key shares one zero-padded format; the
    /// rule is kept as is so results stay comparable with earlier runs.
    pub fn latest_close(&self) -> Result<(String, f64), ProviderError> {
        let root = self.document.root();
        let series = root.object(SERIES_KEY)?;

        let timestamps = self.timestamps()?;
        let Some(latest) = timestamps.last().copied() else {
            return Err(ProviderError::schema(format!("{SERIES_KEY:?} has no samples")));
        };

        let sample = series.object(latest)?;
        let close = sample.get(CLOSE_KEY)?.ok_or_else(|| {
            ProviderError::decode(format!("sample {latest:?} has no {CLOSE_KEY:?}"))
        })?;
        let close = parse_number(CLOSE_KEY, close.as_str()?)?;

        Ok((latest.to_owned(), close))
    }
}
