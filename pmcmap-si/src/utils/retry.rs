//! Bounded retry with exponential backoff
//!
//! Drives a fallible async operation through an explicit
//! Attempting → BackingOff → Succeeded/Exhausted state machine with a
//! bounded attempt counter. Non-retryable failures exit immediately without
//! consuming the budget.

use std::time::Duration;

/// Retry schedule: total attempt budget and backoff curve.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Total attempts, first try included. Must be at least 1.
    pub max_attempts: u32,
    /// Backoff before the second attempt.
    pub base_delay: Duration,
    /// Growth factor applied per further attempt.
    pub backoff_factor: f64,
}

impl RetryPolicy {
    /// Backoff after failed attempt `attempt` (attempts count from 1):
    /// `base_delay * backoff_factor^(attempt - 1)`.
    pub fn delay_after(&self, attempt: u32) -> Duration {
        self.base_delay
            .mul_f64(self.backoff_factor.powi(attempt.saturating_sub(1) as i32))
    }
}

/// Transition states of one retried operation.
enum RetryState<T, E> {
    Attempting(u32),
    BackingOff(u32, Duration),
    Succeeded(T, u32),
    Exhausted(E, u32),
}

/// Run `operation` until it succeeds, fails non-retryably, or the attempt
/// budget is spent.
///
/// `retryable` classifies errors; a non-retryable error is returned
/// unchanged after its single attempt. Returns the final result together
/// with the number of attempts consumed.
pub async fn run_with_backoff<T, E, F, Fut>(
    operation_name: &str,
    policy: RetryPolicy,
    retryable: impl Fn(&E) -> bool,
    mut operation: F,
) -> (Result<T, E>, u32)
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T, E>>,
{
    let mut state = RetryState::Attempting(1);
    loop {
        state = match state {
            RetryState::Attempting(attempt) => match operation().await {
                Ok(value) => RetryState::Succeeded(value, attempt),
                Err(err) if retryable(&err) && attempt < policy.max_attempts => {
                    let delay = policy.delay_after(attempt);
                    tracing::warn!(
                        operation = operation_name,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        "Retryable failure, backing off"
                    );
                    RetryState::BackingOff(attempt, delay)
                }
                Err(err) if retryable(&err) => RetryState::Exhausted(err, attempt),
                Err(err) => return (Err(err), attempt),
            },
            RetryState::BackingOff(attempt, delay) => {
                tokio::time::sleep(delay).await;
                RetryState::Attempting(attempt + 1)
            }
            RetryState::Succeeded(value, attempts) => return (Ok(value), attempts),
            RetryState::Exhausted(err, attempts) => {
                tracing::warn!(
                    operation = operation_name,
                    attempts,
                    "Attempt budget exhausted"
                );
                return (Err(err), attempts);
            }
        };
    }
}
