use serde::Serialize;
use tickscan_core::{
    screen_all, AdmissionGate, AdmissionPolicy, Screener, ScreeningInputs, ScreeningOutcome,
    Symbol,
};

use crate::cli::ScreenArgs;
use crate::config::Config;
use crate::error::CliError;

use super::{parse_symbols, CommandOutcome, Context};

#[derive(Debug, Serialize)]
struct ScreenResponseData {
    results: Vec<ScreenResult>,
}

#[derive(Debug, Serialize)]
struct ScreenResult {
    symbol: Symbol,
    #[serde(skip_serializing_if = "Option::is_none")]
    interesting: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    inputs: Option<ScreeningInputs>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<ScreenError>,
}

#[derive(Debug, Serialize)]
struct ScreenError {
    code: &'static str,
    message: String,
    retryable: bool,
}

impl From<ScreeningOutcome> for ScreenResult {
    fn from(outcome: ScreeningOutcome) -> Self {
        match outcome.result {
            Ok(screening) => Self {
                symbol: outcome.symbol,
                interesting: Some(screening.interesting),
                inputs: Some(screening.inputs),
                error: None,
            },
            Err(error) => Self {
                symbol: outcome.symbol,
                interesting: None,
                inputs: None,
                error: Some(ScreenError {
                    code: error.code(),
                    message: error.message().to_owned(),
                    retryable: error.retryable(),
                }),
            },
        }
    }
}

pub async fn run(
    args: &ScreenArgs,
    config: &Config,
    context: &Context,
) -> Result<CommandOutcome, CliError> {
    let symbols = parse_symbols(&args.symbols)?;
    let api_key = config.alphavantage_api_key()?;

    let screener = Screener::new(context.alphavantage());
    let gate = AdmissionGate::new(
        AdmissionPolicy::alphavantage_free_tier().with_max_concurrency(args.concurrency),
    );

    let mut outcomes = screen_all(&screener, &gate, symbols.iter().cloned(), &api_key).await;
    // Completion order is nondeterministic; report in request order.
    outcomes.sort_by_key(|outcome| symbols.iter().position(|symbol| *symbol == outcome.symbol));

    let results = outcomes.into_iter().map(ScreenResult::from).collect::<Vec<_>>();
    let failures = results.iter().filter(|result| result.error.is_some()).count();
    let data = serde_json::to_value(ScreenResponseData { results })?;

    Ok(CommandOutcome::ok(data).with_failures(failures))
}
