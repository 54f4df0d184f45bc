use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use futures::stream::{self, Stream, StreamExt};

/// Default per-request deadline. Provider latency for large directories is
/// on the order of tens of seconds.
pub const DEFAULT_TIMEOUT_MS: u64 = 60_000;

/// HTTP request envelope used by adapter transport calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub url: String,
    pub timeout_ms: u64,
}

impl HttpRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }
}

/// Fully buffered HTTP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn ok_json(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            body: body.into(),
        }
    }

    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }
}

/// Body chunks in arrival order.
pub type ChunkStream<'a> = Pin<Box<dyn Stream<Item = Result<Vec<u8>, HttpError>> + Send + 'a>>;

/// HTTP response whose body is consumed chunk by chunk.
pub struct StreamingResponse<'a> {
    pub status: u16,
    pub chunks: ChunkStream<'a>,
}

impl StreamingResponse<'_> {
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }
}

/// Transport-level HTTP error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpError {
    message: String,
    timed_out: bool,
}

impl HttpError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            timed_out: false,
        }
    }

    pub fn timed_out(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            timed_out: true,
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn is_timeout(&self) -> bool {
        self.timed_out
    }
}

impl Display for HttpError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for HttpError {}

/// Adapter transport contract.
///
/// `execute` buffers the whole body; `execute_streaming` hands the body over
/// as it arrives. The default `execute_streaming` buffers and yields a single
/// chunk, which is enough for transports that cannot stream.
pub trait HttpClient: Send + Sync {
    fn execute<'a>(
        &'a self,
        request: HttpRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>>;

    fn execute_streaming<'a>(
        &'a self,
        request: HttpRequest,
    ) -> Pin<Box<dyn Future<Output = Result<StreamingResponse<'a>, HttpError>> + Send + 'a>> {
        Box::pin(async move {
            let response = self.execute(request).await?;
            let body = response.body.into_bytes();
            Ok(StreamingResponse {
                status: response.status,
                chunks: Box::pin(stream::once(async move { Ok(body) })),
            })
        })
    }
}

/// Production HTTP client using reqwest.
#[derive(Debug, Clone)]
pub struct ReqwestHttpClient {
    client: Arc<reqwest::Client>,
}

impl ReqwestHttpClient {
    pub fn new() -> Self {
        Self {
            client: Arc::new(
                reqwest::Client::builder()
                    .user_agent(concat!("tickscan/", env!("CARGO_PKG_VERSION")))
                    .build()
                    .unwrap_or_else(|_| reqwest::Client::new()),
            ),
        }
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self {
            client: Arc::new(client),
        }
    }

    async fn send(&self, request: &HttpRequest) -> Result<reqwest::Response, HttpError> {
        self.client
            .get(&request.url)
            .timeout(Duration::from_millis(request.timeout_ms))
            .send()
            .await
            .map_err(transport_error)
    }
}

impl Default for ReqwestHttpClient {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpClient for ReqwestHttpClient {
    fn execute<'a>(
        &'a self,
        request: HttpRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>> {
        Box::pin(async move {
            let response = self.send(&request).await?;
            let status = response.status().as_u16();
            let body = response.text().await.map_err(body_error)?;

            Ok(HttpResponse { status, body })
        })
    }

    fn execute_streaming<'a>(
        &'a self,
        request: HttpRequest,
    ) -> Pin<Box<dyn Future<Output = Result<StreamingResponse<'a>, HttpError>> + Send + 'a>> {
        Box::pin(async move {
            let response = self.send(&request).await?;
            let status = response.status().as_u16();
            let chunks = response
                .bytes_stream()
                .map(|chunk| chunk.map(|bytes| bytes.to_vec()).map_err(body_error));

            Ok(StreamingResponse {
                status,
                chunks: Box::pin(chunks),
            })
        })
    }
}

fn transport_error(error: reqwest::Error) -> HttpError {
    // reqwest errors embed the URL, which carries the api key.
    let error = error.without_url();
    if error.is_timeout() {
        HttpError::timed_out(format!("request timeout: {error}"))
    } else if error.is_connect() {
        HttpError::new(format!("connection failed: {error}"))
    } else {
        HttpError::new(format!("request failed: {error}"))
    }
}

fn body_error(error: reqwest::Error) -> HttpError {
    let error = error.without_url();
    if error.is_timeout() {
        HttpError::timed_out(format!("response body timeout: {error}"))
    } else {
        HttpError::new(format!("failed to read response body: {error}"))
    }
}
