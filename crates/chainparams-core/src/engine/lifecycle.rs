//! Start-up and shutdown of the engine's background work.

use super::ChainParamsEngine;
use std::time::Duration;

impl ChainParamsEngine {
	/// Starts the periodic sweep of expired cache entries and of pending
	/// transactions past the expiry window, including those on chains that
	/// are never polled.
	///
	/// Calling it again while the sweep is running has no effect.
	pub async fn initialize(&self) {
		let mut maintenance = self.maintenance.lock().await;
		if maintenance.is_some() {
			return;
		}

		let period = Duration::from_secs(self.config.cache.cleanup_interval_seconds);
		let cache = self.cache.clone();
		let tracker = self.tracker.clone();
		tracing::info!(
			engine_id = %self.config.engine.id,
			cleanup_interval_secs = period.as_secs(),
			"Initializing chain-parameter engine"
		);

		*maintenance = Some(tokio::spawn(async move {
			let mut ticker =
				tokio::time::interval_at(tokio::time::Instant::now() + period, period);
			loop {
				ticker.tick().await;
				let removed = cache.cleanup_expired();
				if removed > 0 {
					tracing::debug!(removed, remaining = cache.len(), "Swept expired cache entries");
				}
				let expired = tracker.cleanup_expired();
				if expired > 0 {
					tracing::debug!(
						expired,
						remaining = tracker.pending_count(),
						"Swept expired pending transactions"
					);
				}
			}
		}));
	}

	/// Stops the cache sweep and every poll loop. Pending entries and cached
	/// parameters are left in place.
	pub async fn shutdown(&self) {
		tracing::info!("Shutting down chain-parameter engine");
		if let Some(handle) = self.maintenance.lock().await.take() {
			handle.abort();
		}
		self.tracker.shutdown();
	}
}
