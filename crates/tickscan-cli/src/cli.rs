//! CLI argument definitions for tickscan.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `symbols` | List every symbol on an exchange (Finnhub) |
//! | `quotes` | Batch quote overviews (Financial Modeling Prep) |
//! | `price` | Last traded price from the 1-minute series (Alpha Vantage) |
//! | `screen` | Run the valuation screen over symbols (Alpha Vantage) |
//!
//! # Global Options
//!
//! | Option | Default | Description |
//! |--------|---------|-------------|
//! | `--pretty` | `false` | Pretty-print JSON output |
//! | `--timeout-ms` | `TICKSCAN_TIMEOUT_MS` or `60000` | Per-request timeout |
//! | `--capture-dir` | none | Write raw provider responses here |
//! | `--log-level` | `warn` | Log filter when `RUST_LOG` is unset |

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Market data aggregation and valuation screening.
#[derive(Debug, Parser)]
#[command(name = "tickscan", author, version, about)]
pub struct Cli {
    /// Pretty-print JSON output with indentation.
    #[arg(long, global = true, default_value_t = false)]
    pub pretty: bool,

    /// Per-request timeout in milliseconds. Overrides TICKSCAN_TIMEOUT_MS.
    #[arg(long, global = true)]
    pub timeout_ms: Option<u64>,

    /// Directory receiving a copy of every raw provider response.
    #[arg(long, global = true)]
    pub capture_dir: Option<PathBuf>,

    /// Log level for tickscan crates (trace, debug, info, warn, error).
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List every symbol registered on an exchange.
    ///
    ///   tickscan symbols US
    Symbols(SymbolsArgs),

    /// Fetch quote overviews in one batch request.
    ///
    /// Only the first 1000 symbols are requested unless --all-batches is set.
    ///
    ///   tickscan quotes AAPL MSFT GOOGL --pretty
    Quotes(QuotesArgs),

    /// Fetch the last traded price of a symbol.
    ///
    ///   tickscan price IBM
    Price(PriceArgs),

    /// Decide whether symbols pass the valuation screen.
    ///
    ///   tickscan screen IBM KO --concurrency 2
    Screen(ScreenArgs),
}

#[derive(Debug, Args)]
pub struct SymbolsArgs {
    /// Exchange code (e.g. US, L, TO).
    pub exchange: String,
}

#[derive(Debug, Args)]
pub struct QuotesArgs {
    #[arg(required = true, num_args = 1..)]
    pub symbols: Vec<String>,

    /// Split lists longer than 1000 symbols into several requests.
    #[arg(long, default_value_t = false)]
    pub all_batches: bool,
}

#[derive(Debug, Args)]
pub struct PriceArgs {
    pub symbol: String,
}

#[derive(Debug, Args)]
pub struct ScreenArgs {
    #[arg(required = true, num_args = 1..)]
    pub symbols: Vec<String>,

    /// Symbols screened at the same time.
    #[arg(long, default_value_t = 1)]
    pub concurrency: usize,
}
