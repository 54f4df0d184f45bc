//! Valuation/momentum screen.
//!
//! A symbol is interesting when its price-to-earnings ratio is at most 15
//! and its last traded price sits at least 15% under the 200-day moving
//! average, 10% under the 50-day moving average and 10% under the analyst
//! target price.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::adapters::{AlphaVantageAdapter, FundamentalsOverview};
use crate::{ApiKey, ProviderError, Symbol};

/// Thresholds of the screen.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScreeningRules {
    /// A P/E ratio above this fails the screen outright.
    pub max_pe_ratio: f64,
    pub max_ratio_to_200_day: f64,
    pub max_ratio_to_50_day: f64,
    pub max_ratio_to_target: f64,
}

impl Default for ScreeningRules {
    fn default() -> Self {
        Self {
            max_pe_ratio: 15.0,
            max_ratio_to_200_day: 0.85,
            max_ratio_to_50_day: 0.90,
            max_ratio_to_target: 0.90,
        }
    }
}

impl ScreeningRules {
    pub fn evaluate(&self, inputs: &ScreeningInputs) -> bool {
        if inputs.pe_ratio > self.max_pe_ratio {
            return false;
        }

        inputs.last_price <= self.max_ratio_to_200_day * inputs.moving_average_200
            && inputs.last_price <= self.max_ratio_to_50_day * inputs.moving_average_50
            && inputs.last_price <= self.max_ratio_to_target * inputs.analyst_target_price
    }
}

/// Numbers the screen is decided on.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScreeningInputs {
    pub pe_ratio: f64,
    pub moving_average_200: f64,
    pub moving_average_50: f64,
    pub analyst_target_price: f64,
    pub last_price: f64,
}

impl ScreeningInputs {
    /// Parses all four overview fields before any rule is applied, so an
    /// unparsable field is an error even when the P/E ratio alone would
    /// already fail the screen.
    pub fn from_overview(
        overview: &FundamentalsOverview,
        last_price: f64,
    ) -> Result<Self, ProviderError> {
        Ok(Self {
            pe_ratio: overview.pe_ratio()?,
            moving_average_200: overview.moving_average_200()?,
            moving_average_50: overview.moving_average_50()?,
            analyst_target_price: overview.analyst_target_price()?,
            last_price,
        })
    }
}

/// Verdict for one symbol together with the numbers behind it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Screening {
    pub symbol: Symbol,
    pub inputs: ScreeningInputs,
    pub interesting: bool,
}

/// Runs the screen against live Alpha Vantage data.
///
/// Every call fetches a fresh overview and intraday series; nothing is
/// memoized.
#[derive(Clone, Default)]
pub struct Screener {
    alphavantage: AlphaVantageAdapter,
    rules: ScreeningRules,
}

impl Screener {
    pub fn new(alphavantage: AlphaVantageAdapter) -> Self {
        Self {
            alphavantage,
            rules: ScreeningRules::default(),
        }
    }

    pub fn with_rules(mut self, rules: ScreeningRules) -> Self {
        self.rules = rules;
        self
    }

    pub const fn rules(&self) -> &ScreeningRules {
        &self.rules
    }

    /// Fetches overview then last price, parses the inputs, applies the rules.
    pub async fn evaluate(
        &self,
        symbol: &Symbol,
        api_key: &ApiKey,
    ) -> Result<Screening, ProviderError> {
        let overview = self.alphavantage.overview(symbol, api_key).await?;
        let last_price = self.alphavantage.last_price(symbol, api_key).await?;
        let inputs = ScreeningInputs::from_overview(&overview, last_price)
            .map_err(|error| error.context("is_interesting"))?;

        let interesting = self.rules.evaluate(&inputs);
        debug!(%symbol, ?inputs, interesting, "screened");

        Ok(Screening {
            symbol: symbol.clone(),
            inputs,
            interesting,
        })
    }

    pub async fn is_interesting(
        &self,
        symbol: &Symbol,
        api_key: &ApiKey,
    ) -> Result<bool, ProviderError> {
        Ok(self.evaluate(symbol, api_key).await?.interesting)
    }
}
