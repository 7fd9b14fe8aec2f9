//! Exponential-backoff retry for idempotent reads.

use backoff::{future::retry, ExponentialBackoff, ExponentialBackoffBuilder};
use std::future::Future;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

/// Number of retries after the first attempt.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Backoff schedule of 1s, 2s, 4s, ... without jitter.
pub fn default_backoff() -> ExponentialBackoff {
	ExponentialBackoffBuilder::new()
		.with_initial_interval(Duration::from_secs(1))
		.with_multiplier(2.0)
		.with_randomization_factor(0.0)
		.with_max_interval(Duration::from_secs(30))
		.with_max_elapsed_time(None)
		.build()
}

/// Runs `operation` until it succeeds or `max_retries` retries have failed,
/// sleeping 1s, 2s, 4s, ... between attempts. The last error is returned.
pub async fn retry_with_backoff<T, E, F, Fut>(
	label: &str,
	max_retries: u32,
	mut operation: F,
) -> Result<T, E>
where
	F: FnMut() -> Fut,
	Fut: Future<Output = Result<T, E>>,
	E: std::fmt::Display,
{
	let attempts = AtomicU32::new(0);

	retry(default_backoff(), || {
		let attempt = attempts.fetch_add(1, Ordering::Relaxed);
		let fut = operation();
		async move {
			fut.await.map_err(|e| {
				if attempt >= max_retries {
					backoff::Error::permanent(e)
				} else {
					tracing::debug!(
						operation = %label,
						attempt = attempt + 1,
						error = %e,
						"Retrying after failure"
					);
					backoff::Error::transient(e)
				}
			})
		}
	})
	.await
}
