use std::fmt::{Display, Formatter};

use thiserror::Error;

/// Validation errors for caller-supplied identifiers.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("symbol cannot be empty")]
    EmptySymbol,
    #[error("symbol length {len} exceeds max {max}")]
    SymbolTooLong { len: usize, max: usize },
    #[error("symbol contains invalid character {ch:?} at index {index}")]
    SymbolInvalidChar { ch: char, index: usize },

    #[error("exchange code cannot be empty")]
    EmptyExchange,
    #[error("exchange code contains invalid character {ch:?}")]
    ExchangeInvalidChar { ch: char },

    #[error("api key cannot be empty")]
    EmptyApiKey,

    #[error("batch size must be greater than zero")]
    ZeroBatchSize,
}

/// Provider-level error classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderErrorKind {
    /// The request could not be built or sent, or the provider refused it.
    Request,
    /// The payload is not well-formed JSON of the expected shape.
    Decode,
    /// Well-formed JSON is missing an expected key or has the wrong type.
    Schema,
    /// A string field could not be converted to a number.
    Parse,
    /// The provider reported that a quota was exhausted.
    RateLimited,
    /// The call did not finish within its deadline.
    Timeout,
    /// The caller asked for something the provider cannot answer.
    InvalidRequest,
}

/// Structured error returned by every provider operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderError {
    kind: ProviderErrorKind,
    message: String,
    retryable: bool,
}

impl ProviderError {
    pub fn request(message: impl Into<String>) -> Self {
        Self {
            kind: ProviderErrorKind::Request,
            message: message.into(),
            retryable: true,
        }
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self {
            kind: ProviderErrorKind::Decode,
            message: message.into(),
            retryable: false,
        }
    }

    pub fn schema(message: impl Into<String>) -> Self {
        Self {
            kind: ProviderErrorKind::Schema,
            message: message.into(),
            retryable: false,
        }
    }

    pub fn parse(message: impl Into<String>) -> Self {
        Self {
            kind: ProviderErrorKind::Parse,
            message: message.into(),
            retryable: false,
        }
    }

    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self {
            kind: ProviderErrorKind::RateLimited,
            message: message.into(),
            retryable: true,
        }
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self {
            kind: ProviderErrorKind::Timeout,
            message: message.into(),
            retryable: true,
        }
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self {
            kind: ProviderErrorKind::InvalidRequest,
            message: message.into(),
            retryable: false,
        }
    }

    pub const fn kind(&self) -> ProviderErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn retryable(&self) -> bool {
        self.retryable
    }

    pub const fn code(&self) -> &'static str {
        match self.kind {
            ProviderErrorKind::Request => "provider.request",
            ProviderErrorKind::Decode => "provider.decode",
            ProviderErrorKind::Schema => "provider.schema",
            ProviderErrorKind::Parse => "provider.parse",
            ProviderErrorKind::RateLimited => "provider.rate_limited",
            ProviderErrorKind::Timeout => "provider.timeout",
            ProviderErrorKind::InvalidRequest => "provider.invalid_request",
        }
    }

    /// Prefixes the message with the operation that produced the error.
    pub(crate) fn context(mut self, operation: &str) -> Self {
        self.message = format!("{operation}: {}", self.message);
        self
    }
}

impl Display for ProviderError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.code())
    }
}

impl std::error::Error for ProviderError {}

impl From<ValidationError> for ProviderError {
    fn from(error: ValidationError) -> Self {
        Self::invalid_request(error.to_string())
    }
}

/// Top-level error type for core operations.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
