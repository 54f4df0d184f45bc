//! Provider endpoints and how each payload is read off the wire.
//!
//! | Endpoint | Provider | Payload | Strategy |
//! |----------|----------|---------|----------|
//! | [`Endpoint::SymbolDirectory`] | Finnhub | array of symbol records, thousands of entries | [`DecodeStrategy::Streamed`] |
//! | [`Endpoint::BatchQuote`] | Financial Modeling Prep | array of quotes, up to 1000 | [`DecodeStrategy::Streamed`] |
//! | [`Endpoint::Overview`] | Alpha Vantage | flat object of strings | [`DecodeStrategy::Buffered`] |
//! | [`Endpoint::Intraday`] | Alpha Vantage | object keyed by timestamp, a few hundred entries | [`DecodeStrategy::Buffered`] |

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

/// Upstream data provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderId {
    Finnhub,
    Fmp,
    Alphavantage,
}

impl ProviderId {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Finnhub => "finnhub",
            Self::Fmp => "fmp",
            Self::Alphavantage => "alphavantage",
        }
    }
}

impl Display for ProviderId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a response body is decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeStrategy {
    /// Elements of a top-level array are decoded as their bytes arrive.
    Streamed,
    /// The body is read completely and parsed into a [`crate::decode::Document`].
    Buffered,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Endpoint {
    SymbolDirectory,
    BatchQuote,
    Overview,
    Intraday,
}

impl Endpoint {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SymbolDirectory => "symbol_directory",
            Self::BatchQuote => "batch_quote",
            Self::Overview => "overview",
            Self::Intraday => "intraday",
        }
    }

    pub const fn provider(self) -> ProviderId {
        match self {
            Self::SymbolDirectory => ProviderId::Finnhub,
            Self::BatchQuote => ProviderId::Fmp,
            Self::Overview | Self::Intraday => ProviderId::Alphavantage,
        }
    }

    pub const fn decode_strategy(self) -> DecodeStrategy {
        match self {
            Self::SymbolDirectory | Self::BatchQuote => DecodeStrategy::Streamed,
            Self::Overview | Self::Intraday => DecodeStrategy::Buffered,
        }
    }
}

impl Display for Endpoint {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn array_endpoints_stream_and_object_endpoints_buffer() {
        assert_eq!(
            Endpoint::SymbolDirectory.decode_strategy(),
            DecodeStrategy::Streamed
        );
        assert_eq!(Endpoint::BatchQuote.decode_strategy(), DecodeStrategy::Streamed);
        assert_eq!(Endpoint::Overview.decode_strategy(), DecodeStrategy::Buffered);
        assert_eq!(Endpoint::Intraday.decode_strategy(), DecodeStrategy::Buffered);
    }

    #[test]
    fn alphavantage_serves_both_per_symbol_endpoints() {
        assert_eq!(Endpoint::Overview.provider(), ProviderId::Alphavantage);
        assert_eq!(Endpoint::Intraday.provider(), ProviderId::Alphavantage);
        assert_eq!(Endpoint::BatchQuote.provider().to_string(), "fmp");
    }
}
