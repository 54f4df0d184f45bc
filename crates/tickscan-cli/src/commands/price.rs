use serde::Serialize;
use tickscan_core::Symbol;

use crate::cli::PriceArgs;
use crate::config::Config;
use crate::error::CliError;

use super::{CommandOutcome, Context};

#[derive(Debug, Serialize)]
struct PriceResponseData {
    symbol: Symbol,
    price: f64,
}

pub async fn run(
    args: &PriceArgs,
    config: &Config,
    context: &Context,
) -> Result<CommandOutcome, CliError> {
    let symbol = Symbol::parse(&args.symbol)?;
    let api_key = config.alphavantage_api_key()?;

    let price = context.alphavantage().last_price(&symbol, &api_key).await?;
    let data = serde_json::to_value(PriceResponseData { symbol, price })?;

    Ok(CommandOutcome::ok(data))
}
