//! # Domain Models
//!
//! Validated identifiers and provider records used by the adapters.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Symbol`] | Ticker symbol, case preserved |
//! | [`ExchangeCode`] | Exchange code for the symbol directory |
//! | [`ApiKey`] | Provider key, redacted in logs |
//! | [`SymbolRecord`] | One symbol directory entry |
//! | [`SymbolList`] | Ordered symbols of an exchange |
//! | [`QuoteOverview`] | Batch quote record |
//! | [`QuoteBatch`] | Quotes plus rejected elements of one batch call |

mod api_key;
mod models;
mod symbol;

pub use api_key::ApiKey;
pub use models::{QuoteBatch, QuoteOverview, RejectedElement, SymbolList, SymbolRecord};
pub use symbol::{ExchangeCode, Symbol};
