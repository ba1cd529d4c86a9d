//! The resilient invocation layer: every external inference call runs
//! through [`ResilientClient::invoke`], which owns credential rotation
//! and backoff.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use secrecy::SecretString;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::InferenceError;
use crate::pool::CredentialPool;
use crate::{InferenceRequest, StructuredInference};

#[derive(Clone, Debug)]
pub struct RetryPolicy {
    /// Attempts per credential; total budget = this × pool size.
    pub max_retries_per_credential: u32,
    /// Pause between attempts within one rotation cycle.
    pub intra_cycle_delay: Duration,
    /// Base for the exponential backoff applied after a full cycle of
    /// rotations fails.
    pub base_delay: Duration,
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries_per_credential: 3,
            intra_cycle_delay: Duration::from_secs(1),
            base_delay: Duration::from_secs(5),
            max_backoff: Duration::from_secs(60),
        }
    }
}

impl RetryPolicy {
    /// Policy with no sleeping, for tests.
    pub fn immediate(max_retries_per_credential: u32) -> Self {
        Self {
            max_retries_per_credential,
            intra_cycle_delay: Duration::ZERO,
            base_delay: Duration::ZERO,
            max_backoff: Duration::ZERO,
        }
    }

    fn cycle_backoff(&self, cycle_index: u32) -> Duration {
        let exponent = cycle_index.min(16);
        let multiplier = 1_u64 << exponent;
        let base_ms = u64::try_from(self.base_delay.as_millis()).unwrap_or(u64::MAX);
        let max_ms = u64::try_from(self.max_backoff.as_millis()).unwrap_or(u64::MAX);
        Duration::from_millis(base_ms.saturating_mul(multiplier).min(max_ms))
    }
}

/// Wraps a provider with the shared credential pool and retry policy.
pub struct ResilientClient<P> {
    provider: P,
    pool: Arc<CredentialPool>,
    policy: RetryPolicy,
}

impl<P> ResilientClient<P> {
    pub fn new(provider: P, pool: Arc<CredentialPool>, policy: RetryPolicy) -> Self {
        Self { provider, pool, policy }
    }

    pub fn pool(&self) -> &Arc<CredentialPool> {
        &self.pool
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Drive one operation through the retry loop. The operation is
    /// re-invoked with the pool's current credential on every attempt.
    ///
    /// Transient failures rotate the pool; a full unsuccessful rotation
    /// cycle triggers capped exponential backoff. Fatal failures and
    /// budget exhaustion propagate.
    pub async fn invoke<T, F, Fut>(&self, op: F) -> Result<T, InferenceError>
    where
        F: Fn(SecretString) -> Fut,
        Fut: Future<Output = Result<T, InferenceError>>,
    {
        let pool_size = self.pool.len();
        let budget = self.policy.max_retries_per_credential as usize * pool_size;
        let mut rotations_in_cycle = 0_usize;
        let mut cycle_index = 0_u32;
        let mut last_error = None;

        for attempt in 0..budget {
            let credential = self.pool.current();
            match op(credential).await {
                Ok(value) => return Ok(value),
                Err(error) if error.is_transient() => {
                    warn!(
                        event_name = "inference.rate_limited",
                        attempt,
                        cursor = self.pool.cursor_index(),
                        "transient failure; rotating credential"
                    );
                    self.pool.advance();
                    rotations_in_cycle += 1;
                    last_error = Some(error);

                    if attempt + 1 == budget {
                        break;
                    }
                    if rotations_in_cycle >= pool_size {
                        let delay = self.policy.cycle_backoff(cycle_index);
                        debug!(
                            event_name = "inference.cycle_backoff",
                            cycle = cycle_index,
                            delay_ms = delay.as_millis() as u64,
                            "all credentials exhausted this cycle"
                        );
                        cycle_index += 1;
                        rotations_in_cycle = 0;
                        if !delay.is_zero() {
                            tokio::time::sleep(delay).await;
                        }
                    } else if !self.policy.intra_cycle_delay.is_zero() {
                        tokio::time::sleep(self.policy.intra_cycle_delay).await;
                    }
                }
                Err(error) => return Err(error),
            }
        }

        Err(last_error
            .unwrap_or_else(|| InferenceError::Fatal("invocation budget is zero".to_string())))
    }
}

impl<P: StructuredInference> ResilientClient<P> {
    /// Invoke the provider and decode the JSON value into `T`. A null or
    /// empty value is fatal: absence signals a decoding problem, not a
    /// rate limit.
    pub async fn invoke_structured<T: DeserializeOwned>(
        &self,
        request: &InferenceRequest,
    ) -> Result<T, InferenceError> {
        let value = self
            .invoke(|credential| self.provider.generate(request, credential))
            .await?;
        if is_empty_value(&value) {
            return Err(InferenceError::EmptyResponse);
        }
        serde_json::from_value(value).map_err(InferenceError::Schema)
    }
}

fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}
