use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::ValidationError;

const MAX_SYMBOL_LEN: usize = 32;

/// Ticker symbol.
///
/// Symbols typed by a user go through [`Symbol::parse`]. Symbols decoded from
/// provider payloads go through [`Symbol::from_provider`], which only
/// rejects blanks and otherwise keeps the value byte for byte, so a symbol
/// extracted from a directory record round-trips unchanged into later
/// requests.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Symbol(String);

impl Symbol {
    /// Validates a symbol given on the command line or by a caller.
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::EmptySymbol);
        }

        let len = trimmed.chars().count();
        if len > MAX_SYMBOL_LEN {
            return Err(ValidationError::SymbolTooLong {
                len,
                max: MAX_SYMBOL_LEN,
            });
        }

        // ',' is the batch separator.
        for (index, ch) in trimmed.chars().enumerate() {
            if ch.is_whitespace() || ch.is_control() || ch == ',' {
                return Err(ValidationError::SymbolInvalidChar { ch, index });
            }
        }

        Ok(Self(trimmed.to_owned()))
    }

    /// Accepts a symbol exactly as a provider listed it.
    pub fn from_provider(value: String) -> Result<Self, ValidationError> {
        if value.trim().is_empty() {
            return Err(ValidationError::EmptySymbol);
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for Symbol {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Deserialization path; see [`Symbol::from_provider`].
impl TryFrom<String> for Symbol {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_provider(value)
    }
}

impl From<Symbol> for String {
    fn from(value: Symbol) -> Self {
        value.0
    }
}

/// Exchange code understood by the symbol directory (`US`, `TO`, `L`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ExchangeCode(String);

impl ExchangeCode {
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::EmptyExchange);
        }

        if let Some(ch) = trimmed.chars().find(|ch| !ch.is_ascii_alphanumeric()) {
            return Err(ValidationError::ExchangeInvalidChar { ch });
        }

        Ok(Self(trimmed.to_ascii_uppercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for ExchangeCode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for ExchangeCode {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ExchangeCode> for String {
    fn from(value: ExchangeCode) -> Self {
        value.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_trims_symbol_without_changing_case() {
        let parsed = Symbol::parse(" brk.A ").expect("symbol should parse");
        assert_eq!(parsed.as_str(), "brk.A");
    }

    #[test]
    fn accepts_exchange_suffixed_symbols_starting_with_digits() {
        let parsed = Symbol::parse("0700.HK").expect("symbol should parse");
        assert_eq!(parsed.as_str(), "0700.HK");
    }

    #[test]
    fn rejects_batch_separator() {
        let err = Symbol::parse("AAPL,MSFT").expect_err("must fail");
        assert_eq!(err, ValidationError::SymbolInvalidChar { ch: ',', index: 4 });
    }

    #[test]
    fn rejects_blank_symbol() {
        assert_eq!(Symbol::parse("   "), Err(ValidationError::EmptySymbol));
    }

    #[test]
    fn provider_symbols_are_kept_verbatim() {
        let long = "X".repeat(40);
        for raw in ["BRK A", " AAPL ", "A,B", long.as_str()] {
            let symbol = Symbol::from_provider(raw.to_owned()).expect("non-blank provider symbol");
            assert_eq!(symbol.as_str(), raw);
        }
        assert_eq!(
            Symbol::from_provider(String::from("  ")),
            Err(ValidationError::EmptySymbol)
        );
    }

    #[test]
    fn deserialized_symbols_follow_provider_rules() {
        let symbol: Symbol = serde_json::from_str("\"BRK A\"").expect("provider symbol");
        assert_eq!(symbol.as_str(), "BRK A");
        assert!(serde_json::from_str::<Symbol>("\"\"").is_err());
    }

    #[test]
    fn exchange_is_normalized_to_uppercase() {
        let exchange = ExchangeCode::parse("us").expect("exchange should parse");
        assert_eq!(exchange.as_str(), "US");
    }

    #[test]
    fn exchange_rejects_punctuation() {
        let err = ExchangeCode::parse("U-S").expect_err("must fail");
        assert_eq!(err, ValidationError::ExchangeInvalidChar { ch: '-' });
    }
}
