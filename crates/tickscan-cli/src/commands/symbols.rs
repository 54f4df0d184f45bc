use serde::Serialize;
use tickscan_core::{ExchangeCode, Symbol};

use crate::cli::SymbolsArgs;
use crate::config::Config;
use crate::error::CliError;

use super::{CommandOutcome, Context};

#[derive(Debug, Serialize)]
struct SymbolsResponseData {
    exchange: ExchangeCode,
    count: usize,
    symbols: Vec<Symbol>,
}

pub async fn run(
    args: &SymbolsArgs,
    config: &Config,
    context: &Context,
) -> Result<CommandOutcome, CliError> {
    let exchange = ExchangeCode::parse(&args.exchange)?;
    let api_key = config.finnhub_api_key()?;

    let symbols = context.finnhub().list_symbols(&exchange, &api_key).await?;
    let data = serde_json::to_value(SymbolsResponseData {
        exchange,
        count: symbols.len(),
        symbols: symbols.into_inner(),
    })?;

    Ok(CommandOutcome::ok(data))
}
