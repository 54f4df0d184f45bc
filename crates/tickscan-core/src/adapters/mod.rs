pub mod alphavantage;
pub mod finnhub;
pub mod fmp;

pub use alphavantage::{AlphaVantageAdapter, FundamentalsOverview, IntradaySeries};
pub use finnhub::FinnhubAdapter;
pub use fmp::{FmpAdapter, MAX_BATCH_SYMBOLS};

use std::sync::Arc;

use futures::StreamExt;
use tracing::debug;

use crate::capture::{CaptureWriter, ResponseSink};
use crate::decode::{ArrayElements, Document};
use crate::http_client::{HttpClient, HttpError, HttpRequest, DEFAULT_TIMEOUT_MS};
use crate::{DecodeStrategy, Endpoint, ProviderError};

/// Request plumbing shared by the provider adapters.
#[derive(Clone)]
pub(crate) struct Transport {
    http_client: Arc<dyn HttpClient>,
    timeout_ms: u64,
    sink: Option<Arc<dyn ResponseSink>>,
}

impl Transport {
    pub(crate) fn new(http_client: Arc<dyn HttpClient>) -> Self {
        Self {
            http_client,
            timeout_ms: DEFAULT_TIMEOUT_MS,
            sink: None,
        }
    }

    pub(crate) fn set_timeout_ms(&mut self, timeout_ms: u64) {
        self.timeout_ms = timeout_ms;
    }

    pub(crate) fn set_sink(&mut self, sink: Arc<dyn ResponseSink>) {
        self.sink = Some(sink);
    }

    pub(crate) const fn timeout_ms(&self) -> u64 {
        self.timeout_ms
    }

    /// Streams a top-level JSON array, handing each element's raw bytes to
    /// `on_element` as soon as it is complete. Returns the element count.
    pub(crate) async fn stream_array<F>(
        &self,
        endpoint: Endpoint,
        subject: &str,
        url: &str,
        mut on_element: F,
    ) -> Result<usize, ProviderError>
    where
        F: FnMut(usize, &[u8]) -> Result<(), ProviderError>,
    {
        debug_assert_eq!(endpoint.decode_strategy(), DecodeStrategy::Streamed);
        debug!(provider = %endpoint.provider(), %endpoint, subject, "streaming request");

        let request = HttpRequest::get(url).with_timeout_ms(self.timeout_ms);
        let mut response = self
            .http_client
            .execute_streaming(request)
            .await
            .map_err(|error| transport_error(endpoint, &error))?;

        if !response.is_success() {
            return Err(status_error(endpoint, response.status));
        }

        let mut capture = CaptureWriter::start(self.sink.as_ref(), endpoint, subject);
        let mut splitter = ArrayElements::new();
        let mut count = 0;

        while let Some(chunk) = response.chunks.next().await {
            let chunk = chunk.map_err(|error| transport_error(endpoint, &error))?;
            capture.write(&chunk);
            for element in splitter.feed(&chunk)? {
                on_element(count, &element)?;
                count += 1;
            }
        }

        capture.finish().await;
        splitter.finish()?;
        debug!(%endpoint, subject, elements = count, "array decoded");
        Ok(count)
    }

    /// Reads the whole body and parses it into a [`Document`].
    pub(crate) async fn fetch_document(
        &self,
        endpoint: Endpoint,
        subject: &str,
        url: &str,
    ) -> Result<Document, ProviderError> {
        debug_assert_eq!(endpoint.decode_strategy(), DecodeStrategy::Buffered);
        debug!(provider = %endpoint.provider(), %endpoint, subject, "buffered request");

        let request = HttpRequest::get(url).with_timeout_ms(self.timeout_ms);
        let response = self
            .http_client
            .execute(request)
            .await
            .map_err(|error| transport_error(endpoint, &error))?;

        if !response.is_success() {
            return Err(status_error(endpoint, response.status));
        }

        let mut capture = CaptureWriter::start(self.sink.as_ref(), endpoint, subject);
        capture.write(response.body.as_bytes());
        capture.finish().await;

        Document::parse(&response.body)
    }
}

fn transport_error(endpoint: Endpoint, error: &HttpError) -> ProviderError {
    let message = format!("{} transport error: {}", endpoint.provider(), error.message());
    if error.is_timeout() {
        ProviderError::timeout(message)
    } else {
        ProviderError::request(message)
    }
}

fn status_error(endpoint: Endpoint, status: u16) -> ProviderError {
    let message = format!("{} returned status {status}", endpoint.provider());
    if status == 429 {
        ProviderError::rate_limited(message)
    } else {
        ProviderError::request(message)
    }
}
