//! Caller-side admission control for provider calls.
//!
//! Adapters issue exactly the requests they are asked for. When many symbols
//! are screened at once, an [`AdmissionGate`] decides when each call may
//! start: it bounds concurrency, spaces calls to the per-minute quota, fails
//! fast once the daily quota is spent, and puts a deadline on every call.

use std::future::Future;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use futures::stream::{self, StreamExt};
use governor::clock::DefaultClock;
use governor::state::direct::NotKeyed;
use governor::state::InMemoryState;
use governor::{Quota, RateLimiter};
use tokio::sync::Semaphore;
use tracing::warn;

use crate::screening::{Screener, Screening};
use crate::{ApiKey, ProviderError, ProviderId, Symbol};

type DirectRateLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

const MINUTE: Duration = Duration::from_secs(60);
const DAY: Duration = Duration::from_secs(24 * 60 * 60);

/// Requests one screening issues: overview plus intraday series.
pub const SCREENING_COST: u32 = 2;

#[derive(Debug, Clone, PartialEq)]
pub struct AdmissionPolicy {
    pub provider_id: ProviderId,
    pub per_minute: u32,
    pub per_day: u32,
    pub max_concurrency: usize,
    pub call_timeout: Duration,
}

impl AdmissionPolicy {
    /// Alpha Vantage free tier: 5 requests per minute, 25 per day.
    pub fn alphavantage_free_tier() -> Self {
        Self {
            provider_id: ProviderId::Alphavantage,
            per_minute: 5,
            per_day: 25,
            max_concurrency: 1,
            call_timeout: Duration::from_secs(120),
        }
    }

    /// Financial Modeling Prep free tier: 10 requests per minute, 250 per day.
    pub fn fmp_free_tier() -> Self {
        Self {
            provider_id: ProviderId::Fmp,
            per_minute: 10,
            per_day: 250,
            max_concurrency: 1,
            call_timeout: Duration::from_secs(60),
        }
    }

    pub fn with_max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = max_concurrency.max(1);
        self
    }

    pub fn with_call_timeout(mut self, call_timeout: Duration) -> Self {
        self.call_timeout = call_timeout;
        self
    }
}

/// Shared gate enforcing an [`AdmissionPolicy`]. Clones share budgets.
#[derive(Clone)]
pub struct AdmissionGate {
    policy: AdmissionPolicy,
    per_minute: Arc<DirectRateLimiter>,
    per_day: Arc<DirectRateLimiter>,
    slots: Arc<Semaphore>,
}

impl AdmissionGate {
    pub fn new(policy: AdmissionPolicy) -> Self {
        let slots = policy.max_concurrency.max(1);
        Self {
            per_minute: Arc::new(RateLimiter::direct(quota_from_window(
                MINUTE,
                policy.per_minute,
            ))),
            per_day: Arc::new(RateLimiter::direct(quota_from_window(DAY, policy.per_day))),
            slots: Arc::new(Semaphore::new(slots)),
            policy,
        }
    }

    pub fn policy(&self) -> &AdmissionPolicy {
        &self.policy
    }

    /// Runs `call` once `cost` requests fit the budgets.
    ///
    /// Waits for a concurrency slot and for per-minute budget. Returns
    /// `RateLimited` without running `call` when the daily budget cannot
    /// cover `cost`, and `Timeout` when `call` outlives the policy deadline.
    /// The call future is dropped on timeout.
    pub async fn admit<F, T>(&self, cost: u32, call: F) -> Result<T, ProviderError>
    where
        F: Future<Output = Result<T, ProviderError>>,
    {
        let cells = NonZeroU32::new(cost).unwrap_or(NonZeroU32::MIN);
        let _slot = self
            .slots
            .acquire()
            .await
            .map_err(|_| ProviderError::request("admission gate is closed"))?;

        match self.per_day.check_n(cells) {
            Ok(Ok(())) => {}
            Ok(Err(_)) | Err(_) => {
                return Err(ProviderError::rate_limited(format!(
                    "{} daily budget of {} requests is exhausted",
                    self.policy.provider_id, self.policy.per_day
                )));
            }
        }

        self.per_minute.until_n_ready(cells).await.map_err(|_| {
            ProviderError::invalid_request(format!(
                "call cost {cost} exceeds the {} per-minute budget of {}",
                self.policy.provider_id, self.policy.per_minute
            ))
        })?;

        tokio::time::timeout(self.policy.call_timeout, call)
            .await
            .map_err(|_| {
                ProviderError::timeout(format!(
                    "{} call exceeded {} ms",
                    self.policy.provider_id,
                    self.policy.call_timeout.as_millis()
                ))
            })?
    }
}

fn quota_from_window(window: Duration, limit: u32) -> Quota {
    let burst = NonZeroU32::new(limit).unwrap_or(NonZeroU32::MIN);
    let seconds_per_cell = (window.as_secs_f64() / f64::from(burst.get())).max(0.001);

    Quota::with_period(Duration::from_secs_f64(seconds_per_cell))
        .unwrap_or_else(|| Quota::per_second(burst))
        .allow_burst(burst)
}

/// Screening result for one symbol.
#[derive(Debug, Clone, PartialEq)]
pub struct ScreeningOutcome {
    pub symbol: Symbol,
    pub result: Result<Screening, ProviderError>,
}

/// Screens `symbols` concurrently through `gate`.
///
/// Each symbol succeeds or fails on its own. Outcomes arrive in completion
/// order and carry their symbol.
pub async fn screen_all<I>(
    screener: &Screener,
    gate: &AdmissionGate,
    symbols: I,
    api_key: &ApiKey,
) -> Vec<ScreeningOutcome>
where
    I: IntoIterator<Item = Symbol>,
{
    let concurrency = gate.policy().max_concurrency.max(1);

    stream::iter(symbols)
        .map(|symbol| async move {
            let result = gate
                .admit(SCREENING_COST, screener.evaluate(&symbol, api_key))
                .await;
            if let Err(error) = &result {
                warn!(%symbol, %error, "screening failed");
            }
            ScreeningOutcome { symbol, result }
        })
        .buffer_unordered(concurrency)
        .collect()
        .await
}
