use std::sync::Arc;

use tracing::{debug, warn};

use super::Transport;
use crate::capture::ResponseSink;
use crate::http_client::{HttpClient, ReqwestHttpClient};
use crate::{
    ApiKey, Endpoint, ProviderError, QuoteBatch, QuoteOverview, RejectedElement, Symbol,
    SymbolList,
};

pub const FMP_BASE_URL: &str = "https://financialmodelingprep.com/api/v3";

/// Largest symbol count sent in one batch quote request.
pub const MAX_BATCH_SYMBOLS: usize = 1000;

/// Financial Modeling Prep batch quote client.
///
/// The free tier allows 250 requests per day and 10 per minute. This client
/// does not throttle; see [`crate::admission`].
#[derive(Clone)]
pub struct FmpAdapter {
    transport: Transport,
    base_url: String,
}

impl Default for FmpAdapter {
    fn default() -> Self {
        Self::new(Arc::new(ReqwestHttpClient::default()))
    }
}

impl FmpAdapter {
    pub fn new(http_client: Arc<dyn HttpClient>) -> Self {
        Self {
            transport: Transport::new(http_client),
            base_url: String::from(FMP_BASE_URL),
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

    /// URL for the first [`MAX_BATCH_SYMBOLS`] of `symbols`.
    pub fn batch_quote_url(&self, symbols: &[Symbol], api_key: &ApiKey) -> String {
        let joined = symbols
            .iter()
            .take(MAX_BATCH_SYMBOLS)
            .map(|symbol| urlencoding::encode(symbol.as_str()))
            .collect::<Vec<_>>()
            .join(",");

        format!(
            "{}/quote/{joined}?apikey={}",
            self.base_url,
            urlencoding::encode(api_key.expose())
        )
    }

    /// Fetches quote overviews for up to [`MAX_BATCH_SYMBOLS`] symbols in one
    /// round trip.
    ///
    /// Symbols past the cap are not requested. A record that fails to decode
    /// is logged, listed in [`QuoteBatch::rejected`] and skipped; the rest of
    /// the batch is still returned. Only transport failures and a malformed
    /// array as a whole are errors.
    pub async fn fetch_quotes(
        &self,
        symbols: &[Symbol],
        api_key: &ApiKey,
    ) -> Result<QuoteBatch, ProviderError> {
        let Some(first) = symbols.first() else {
            return Ok(QuoteBatch::default());
        };

        if symbols.len() > MAX_BATCH_SYMBOLS {
            debug!(
                requested = symbols.len(),
                dropped = symbols.len() - MAX_BATCH_SYMBOLS,
                "batch quote truncated to the per-request cap"
            );
        }

        let url = self.batch_quote_url(symbols, api_key);
        let subject = format!("{first}-{}", symbols.len().min(MAX_BATCH_SYMBOLS));
        let mut batch = QuoteBatch::default();

        self.transport
            .stream_array(Endpoint::BatchQuote, &subject, &url, |index, raw| {
                match serde_json::from_slice::<QuoteOverview>(raw) {
                    Ok(quote) => batch.quotes.push(quote),
                    Err(error) => {
                        warn!(index, %error, "skipping malformed quote record");
                        batch.rejected.push(RejectedElement {
                            index,
                            message: error.to_string(),
                        });
                    }
                }
                Ok(())
            })
            .await
            .map_err(|error| error.context("fetch_quotes"))?;

        Ok(batch)
    }

    /// Covers the whole list by issuing one [`fetch_quotes`](Self::fetch_quotes)
    /// call per batch of [`MAX_BATCH_SYMBOLS`], one after another.
    ///
    /// Rejected element indexes are offset to positions in the merged result
    /// stream. The first failing call aborts the remaining batches.
    pub async fn fetch_quotes_in_batches(
        &self,
        symbols: &SymbolList,
        api_key: &ApiKey,
    ) -> Result<QuoteBatch, ProviderError> {
        let mut merged = QuoteBatch::default();
        let mut offset = 0;

        for chunk in symbols.chunks(MAX_BATCH_SYMBOLS)? {
            let mut batch = self.fetch_quotes(chunk, api_key).await?;
            let received = batch.quotes.len() + batch.rejected.len();
            for rejected in &mut batch.rejected {
                rejected.index += offset;
            }
            offset += received;
            merged.extend(batch);
        }

        Ok(merged)
    }
}
