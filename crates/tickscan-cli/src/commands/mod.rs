mod price;
mod quotes;
mod screen;
mod symbols;

use std::path::Path;
use std::sync::Arc;

use serde_json::Value;
use tickscan_core::http_client::DEFAULT_TIMEOUT_MS;
use tickscan_core::{
    AlphaVantageAdapter, DirectorySink, FinnhubAdapter, FmpAdapter, ResponseSink, Symbol,
};
use tracing::debug;

use crate::cli::{Cli, Command};
use crate::config::Config;
use crate::error::CliError;

/// JSON printed on stdout plus the number of symbols that failed.
pub struct CommandOutcome {
    pub data: Value,
    pub failures: usize,
}

impl CommandOutcome {
    pub fn ok(data: Value) -> Self {
        Self { data, failures: 0 }
    }

    pub fn with_failures(mut self, failures: usize) -> Self {
        self.failures = failures;
        self
    }
}

/// Adapter settings shared by every command.
pub struct Context {
    timeout_ms: u64,
    sink: Option<Arc<dyn ResponseSink>>,
}

impl Context {
    pub fn new(
        timeout_ms: Option<u64>,
        config: &Config,
        capture_dir: Option<&Path>,
    ) -> Result<Self, CliError> {
        let sink = match capture_dir {
            Some(dir) => {
                let sink: Arc<dyn ResponseSink> = Arc::new(DirectorySink::new(dir)?);
                debug!(dir = %dir.display(), "capturing raw responses");
                Some(sink)
            }
            None => None,
        };

        Ok(Self {
            timeout_ms: timeout_ms.or(config.timeout_ms).unwrap_or(DEFAULT_TIMEOUT_MS),
            sink,
        })
    }

    pub fn finnhub(&self) -> FinnhubAdapter {
        let adapter = FinnhubAdapter::default().with_timeout_ms(self.timeout_ms);
        match &self.sink {
            Some(sink) => adapter.with_sink(Arc::clone(sink)),
            None => adapter,
        }
    }

    pub fn fmp(&self) -> FmpAdapter {
        let adapter = FmpAdapter::default().with_timeout_ms(self.timeout_ms);
        match &self.sink {
            Some(sink) => adapter.with_sink(Arc::clone(sink)),
            None => adapter,
        }
    }

    pub fn alphavantage(&self) -> AlphaVantageAdapter {
        let adapter = AlphaVantageAdapter::default().with_timeout_ms(self.timeout_ms);
        match &self.sink {
            Some(sink) => adapter.with_sink(Arc::clone(sink)),
            None => adapter,
        }
    }
}

pub async fn run(cli: &Cli, config: &Config) -> Result<CommandOutcome, CliError> {
    let context = Context::new(cli.timeout_ms, config, cli.capture_dir.as_deref())?;

    match &cli.command {
        Command::Symbols(args) => symbols::run(args, config, &context).await,
        Command::Quotes(args) => quotes::run(args, config, &context).await,
        Command::Price(args) => price::run(args, config, &context).await,
        Command::Screen(args) => screen::run(args, config, &context).await,
    }
}

fn parse_symbols(raw: &[String]) -> Result<Vec<Symbol>, CliError> {
    raw.iter()
        .map(|value| Symbol::parse(value).map_err(CliError::from))
        .collect()
}
