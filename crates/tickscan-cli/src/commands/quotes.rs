use tickscan_core::{SymbolList, MAX_BATCH_SYMBOLS};
use tracing::warn;

use crate::cli::QuotesArgs;
use crate::config::Config;
use crate::error::CliError;

use super::{parse_symbols, CommandOutcome, Context};

pub async fn run(
    args: &QuotesArgs,
    config: &Config,
    context: &Context,
) -> Result<CommandOutcome, CliError> {
    let symbols = parse_symbols(&args.symbols)?;
    let api_key = config.fmp_api_key()?;
    let adapter = context.fmp();

    let batch = if args.all_batches {
        adapter
            .fetch_quotes_in_batches(&SymbolList::new(symbols), &api_key)
            .await?
    } else {
        if symbols.len() > MAX_BATCH_SYMBOLS {
            warn!(
                requested = symbols.len(),
                quoted = MAX_BATCH_SYMBOLS,
                "symbols past the batch cap are not quoted; pass --all-batches for the rest"
            );
        }
        adapter.fetch_quotes(&symbols, &api_key).await?
    };

    let failures = batch.rejected.len();
    Ok(CommandOutcome::ok(serde_json::to_value(batch)?).with_failures(failures))
}
