//! Environment configuration.
//!
//! | Variable | Used by |
//! |----------|---------|
//! | `TICKSCAN_FINNHUB_API_KEY` | `symbols` |
//! | `TICKSCAN_FMP_API_KEY` | `quotes` |
//! | `TICKSCAN_ALPHAVANTAGE_API_KEY` | `price`, `screen` |
//! | `TICKSCAN_TIMEOUT_MS` | all commands, unless `--timeout-ms` is given |

use tickscan_core::ApiKey;

use crate::error::CliError;

pub const FINNHUB_API_KEY_VAR: &str = "TICKSCAN_FINNHUB_API_KEY";
pub const FMP_API_KEY_VAR: &str = "TICKSCAN_FMP_API_KEY";
pub const ALPHAVANTAGE_API_KEY_VAR: &str = "TICKSCAN_ALPHAVANTAGE_API_KEY";
pub const TIMEOUT_MS_VAR: &str = "TICKSCAN_TIMEOUT_MS";

#[derive(Debug, Clone, Default)]
pub struct Config {
    finnhub_api_key: Option<String>,
    fmp_api_key: Option<String>,
    alphavantage_api_key: Option<String>,
    pub timeout_ms: Option<u64>,
}

impl Config {
    pub fn from_env() -> Result<Self, CliError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Keys are only checked when a command needs them; a malformed timeout
    /// is rejected up front.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, CliError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let timeout_ms = match lookup(TIMEOUT_MS_VAR) {
            Some(raw) => Some(raw.trim().parse::<u64>().map_err(|_| {
                CliError::Configuration(format!(
                    "{TIMEOUT_MS_VAR} must be a whole number of milliseconds, got {raw:?}"
                ))
            })?),
            None => None,
        };

        Ok(Self {
            finnhub_api_key: lookup(FINNHUB_API_KEY_VAR),
            fmp_api_key: lookup(FMP_API_KEY_VAR),
            alphavantage_api_key: lookup(ALPHAVANTAGE_API_KEY_VAR),
            timeout_ms,
        })
    }

    pub fn finnhub_api_key(&self) -> Result<ApiKey, CliError> {
        require(FINNHUB_API_KEY_VAR, self.finnhub_api_key.as_deref())
    }

    pub fn fmp_api_key(&self) -> Result<ApiKey, CliError> {
        require(FMP_API_KEY_VAR, self.fmp_api_key.as_deref())
    }

    pub fn alphavantage_api_key(&self) -> Result<ApiKey, CliError> {
        require(ALPHAVANTAGE_API_KEY_VAR, self.alphavantage_api_key.as_deref())
    }
}

fn require(var: &str, value: Option<&str>) -> Result<ApiKey, CliError> {
    let value = value.ok_or_else(|| CliError::Configuration(format!("{var} is not set")))?;
    ApiKey::new(value).map_err(|error| CliError::Configuration(format!("{var}: {error}")))
}
