use std::sync::Arc;

use tracing::debug;

use super::Transport;
use crate::capture::ResponseSink;
use crate::http_client::{HttpClient, ReqwestHttpClient};
use crate::{ApiKey, Endpoint, ExchangeCode, ProviderError, SymbolList, SymbolRecord};

pub const FINNHUB_BASE_URL: &str = "https://finnhub.io/api/v1";

/// Finnhub symbol directory client.
#[derive(Clone)]
pub struct FinnhubAdapter {
    transport: Transport,
    base_url: String,
}

impl Default for FinnhubAdapter {
    fn default() -> Self {
        Self::new(Arc::new(ReqwestHttpClient::default()))
    }
}

impl FinnhubAdapter {
    pub fn new(http_client: Arc<dyn HttpClient>) -> Self {
        Self {
            transport: Transport::new(http_client),
            base_url: String::from(FINNHUB_BASE_URL),
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

    pub const fn timeout_ms(&self) -> u64 {
        self.transport.timeout_ms()
    }

    pub fn symbol_directory_url(&self, exchange: &ExchangeCode, api_key: &ApiKey) -> String {
        format!(
            "{}/stock/symbol?exchange={}&token={}",
            self.base_url,
            urlencoding::encode(exchange.as_str()),
            urlencoding::encode(api_key.expose())
        )
    }

    /// Lists every symbol registered on `exchange`, in directory order.
    ///
    /// The directory is decoded record by record while it downloads. Any
    /// malformed record, including one with an empty symbol, fails the whole
    /// call: a silently shortened directory would look complete to callers.
    pub async fn list_symbols(
        &self,
        exchange: &ExchangeCode,
        api_key: &ApiKey,
    ) -> Result<SymbolList, ProviderError> {
        let url = self.symbol_directory_url(exchange, api_key);
        let mut symbols = SymbolList::default();

        self.transport
            .stream_array(
                Endpoint::SymbolDirectory,
                exchange.as_str(),
                &url,
                |index, raw| {
                    let record: SymbolRecord = serde_json::from_slice(raw).map_err(|error| {
                        ProviderError::decode(format!("symbol record {index} is malformed: {error}"))
                    })?;
                    symbols.push(record.symbol);
                    Ok(())
                },
            )
            .await
            .map_err(|error| error.context("list_symbols"))?;

        debug!(%exchange, count = symbols.len(), "symbol directory loaded");
        Ok(symbols)
    }
}
