use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{Symbol, ValidationError};

/// One entry of an exchange's symbol directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SymbolRecord {
    #[serde(default)]
    pub currency: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub display_symbol: String,
    #[serde(default)]
    pub figi: String,
    #[serde(default)]
    pub mic: String,
    pub symbol: Symbol,
    #[serde(rename = "type", default)]
    pub security_type: String,
}

impl SymbolRecord {
    pub fn symbol(&self) -> &Symbol {
        &self.symbol
    }
}

/// Symbols in provider order. Duplicates are kept.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SymbolList(Vec<Symbol>);

impl SymbolList {
    pub fn new(symbols: Vec<Symbol>) -> Self {
        Self(symbols)
    }

    pub fn push(&mut self, symbol: Symbol) {
        self.0.push(symbol);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[Symbol] {
        &self.0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Symbol> {
        self.0.iter()
    }

    /// Splits the list into consecutive batches of at most `size` symbols.
    pub fn chunks(&self, size: usize) -> Result<std::slice::Chunks<'_, Symbol>, ValidationError> {
        if size == 0 {
            return Err(ValidationError::ZeroBatchSize);
        }
        Ok(self.0.chunks(size))
    }

    pub fn into_inner(self) -> Vec<Symbol> {
        self.0
    }
}

impl FromIterator<Symbol> for SymbolList {
    fn from_iter<I: IntoIterator<Item = Symbol>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for SymbolList {
    type Item = Symbol;
    type IntoIter = std::vec::IntoIter<Symbol>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a SymbolList {
    type Item = &'a Symbol;
    type IntoIter = std::slice::Iter<'a, Symbol>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Point-in-time quote summary from the batch quote endpoint.
///
/// Everything except `symbol` may be `null` at the provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteOverview {
    pub symbol: Symbol,
    pub name: Option<String>,
    pub exchange: Option<String>,
    pub price: Option<f64>,
    pub changes_percentage: Option<f64>,
    pub change: Option<f64>,
    pub day_low: Option<f64>,
    pub day_high: Option<f64>,
    pub year_high: Option<f64>,
    pub year_low: Option<f64>,
    pub market_cap: Option<f64>,
    pub price_avg50: Option<f64>,
    #[serde(alias = "priceAvg100")]
    pub price_avg200: Option<f64>,
    pub open: Option<f64>,
    pub previous_close: Option<f64>,
    pub eps: Option<f64>,
    pub pe: Option<f64>,
    pub volume: Option<i64>,
    pub avg_volume: Option<i64>,
    pub shares_outstanding: Option<i64>,
    pub timestamp: Option<i64>,
}

impl QuoteOverview {
    /// Provider timestamp as a UTC date-time, when present and in range.
    pub fn quoted_at(&self) -> Option<OffsetDateTime> {
        self.timestamp
            .and_then(|seconds| OffsetDateTime::from_unix_timestamp(seconds).ok())
    }
}

/// An array element the batch decoder could not turn into a [`QuoteOverview`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RejectedElement {
    pub index: usize,
    pub message: String,
}

/// Result of one batch quote round trip.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuoteBatch {
    pub quotes: Vec<QuoteOverview>,
    pub rejected: Vec<RejectedElement>,
}

impl QuoteBatch {
    pub fn extend(&mut self, other: QuoteBatch) {
        self.quotes.extend(other.quotes);
        self.rejected.extend(other.rejected);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record_json() -> &'static str {
        r#"{"currency":"USD","description":"APPLE INC","displaySymbol":"AAPL",
            "figi":"BBG000B9XRY4","mic":"XNAS","symbol":"AAPL","type":"Common Stock",
            "isin":null}"#
    }

    #[test]
    fn symbol_extraction_is_idempotent() {
        let record: SymbolRecord = serde_json::from_str(record_json()).expect("valid record");

        let first = record.symbol().clone();
        let second = record.symbol().clone();

        assert_eq!(first, second);
        assert_eq!(first.as_str(), "AAPL");
        assert_eq!(record.security_type, "Common Stock");
    }

    #[test]
    fn record_with_empty_symbol_is_rejected() {
        let result = serde_json::from_str::<SymbolRecord>(r#"{"symbol":"","currency":"USD"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn record_without_symbol_is_rejected() {
        let result = serde_json::from_str::<SymbolRecord>(r#"{"description":"NO SYMBOL"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn chunks_cover_the_whole_list_in_order() {
        let list = ["A", "B", "C", "D", "E"]
            .into_iter()
            .map(|raw| Symbol::parse(raw).expect("valid symbol"))
            .collect::<SymbolList>();

        let batches = list
            .chunks(2)
            .expect("non-zero size")
            .map(|chunk| chunk.iter().map(Symbol::as_str).collect::<Vec<_>>())
            .collect::<Vec<_>>();

        assert_eq!(batches, vec![vec!["A", "B"], vec!["C", "D"], vec!["E"]]);
        assert!(matches!(list.chunks(0), Err(ValidationError::ZeroBatchSize)));
    }

    #[test]
    fn quote_overview_tolerates_nulls_and_reads_timestamp() {
        let quote: QuoteOverview = serde_json::from_str(
            r#"{"symbol":"AAPL","name":"Apple Inc.","price":187.5,"pe":null,
                "priceAvg50":180.1,"priceAvg200":170.2,"volume":1000,"timestamp":1700000000}"#,
        )
        .expect("valid quote");

        assert_eq!(quote.price, Some(187.5));
        assert_eq!(quote.pe, None);
        assert_eq!(quote.price_avg200, Some(170.2));
        assert_eq!(
            quote.quoted_at().map(|at| at.unix_timestamp()),
            Some(1_700_000_000)
        );
    }

    #[test]
    fn quote_overview_with_wrong_field_type_fails() {
        let result =
            serde_json::from_str::<QuoteOverview>(r#"{"symbol":"AAPL","price":"not-a-number"}"#);
        assert!(result.is_err());
    }
}
