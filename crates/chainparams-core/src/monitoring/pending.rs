//! Pending transaction tracker.
//!
//! Every chain with at least one pending transaction has exactly one poll
//! loop. A loop wakes every poll interval, drops entries past the expiry
//! window, then asks the chain's sequence source for the current sequence of
//! each remaining sender. An entry is confirmed once the observed sequence is
//! strictly greater than the one used at broadcast. A loop removes itself from
//! the loop table as soon as its chain has nothing left to watch; the check
//! and the removal happen under the table's entry lock, so a concurrent
//! `add_pending` either sees the loop still registered or starts a new one.
//! Loops carry an id so a cancelled loop never unregisters its replacement.
//! Entries on chains without a loop are dropped by [`PendingTracker::cleanup_expired`].

use crate::engine::event_bus::EventBus;
use crate::registry::AdapterRegistry;
use chainparams_cache::ParameterCache;
use chainparams_types::{
	truncate_id, CacheEvent, Chain, ChainParamsEvent, PendingEvent, PendingTransaction,
};
use dashmap::DashMap;
use futures::future::join_all;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::instrument;

struct PollLoop {
	id: u64,
	handle: JoinHandle<()>,
}

struct TrackerState {
	/// Pending transactions keyed by hash.
	pending: DashMap<String, PendingTransaction>,
	loops: DashMap<Chain, PollLoop>,
	next_loop_id: AtomicU64,
	registry: Arc<AdapterRegistry>,
	cache: Arc<ParameterCache>,
	event_bus: EventBus,
	poll_interval: Duration,
	expiry: Duration,
	/// Bound on one sequence fetch.
	request_timeout: Duration,
}

/// Tracks broadcast transactions until their sender's sequence advances.
///
/// Cloning is cheap; clones share the same pending set and loops.
#[derive(Clone)]
pub struct PendingTracker {
	state: Arc<TrackerState>,
}

impl PendingTracker {
	pub fn new(
		registry: Arc<AdapterRegistry>,
		cache: Arc<ParameterCache>,
		event_bus: EventBus,
		poll_interval: Duration,
		expiry: Duration,
		request_timeout: Duration,
	) -> Self {
		Self {
			state: Arc::new(TrackerState {
				pending: DashMap::new(),
				loops: DashMap::new(),
				next_loop_id: AtomicU64::new(0),
				registry,
				cache,
				event_bus,
				poll_interval,
				expiry,
				request_timeout,
			}),
		}
	}

	/// Starts tracking a broadcast transaction.
	///
	/// A poll loop is started for `chain` if none is running and the chain's
	/// family reports sequences. Re-adding a known hash replaces the entry.
	pub fn add_pending(
		&self,
		tx_hash: impl Into<String>,
		address: impl Into<String>,
		chain: Chain,
		sequence_at_broadcast: u64,
	) {
		let tx = PendingTransaction::new(tx_hash, address, chain, sequence_at_broadcast);
		tracing::info!(
			tx_hash = %truncate_id(&tx.tx_hash),
			address = %truncate_id(&tx.address),
			chain = %chain,
			sequence = sequence_at_broadcast,
			"Tracking pending transaction"
		);
		self.state
			.event_bus
			.publish(ChainParamsEvent::Pending(PendingEvent::Added {
				tx_hash: tx.tx_hash.clone(),
				address: tx.address.clone(),
				chain,
			}))
			.ok();
		self.state.pending.insert(tx.tx_hash.clone(), tx);

		if chain.supports_pending_transactions() {
			self.state
				.loops
				.entry(chain)
				.or_insert_with(|| {
					let id = self.state.next_loop_id.fetch_add(1, Ordering::Relaxed);
					PollLoop {
						id,
						handle: spawn_poll_loop(self.state.clone(), chain, id),
					}
				});
		} else {
			tracing::debug!(chain = %chain, "Chain does not report sequences, not polling");
		}
	}

	/// Whether `address` has a live pending transaction on `chain`.
	pub fn has_pending(&self, address: &str, chain: Chain) -> bool {
		self.state.pending.iter().any(|entry| {
			entry.belongs_to(address, chain) && !self.state.is_expired(entry.value())
		})
	}

	/// Oldest live pending transaction of `address` on `chain`.
	pub fn oldest_pending(&self, address: &str, chain: Chain) -> Option<PendingTransaction> {
		self.state
			.pending
			.iter()
			.filter(|entry| {
				entry.belongs_to(address, chain) && !self.state.is_expired(entry.value())
			})
			.min_by_key(|entry| entry.added_at)
			.map(|entry| entry.value().clone())
	}

	/// Seconds since `tx_hash` was added, if it is still tracked.
	pub fn elapsed_seconds(&self, tx_hash: &str) -> Option<u64> {
		self.state
			.pending
			.get(tx_hash)
			.map(|tx| tx.elapsed_seconds())
	}

	pub fn pending_count(&self) -> usize {
		self.state.pending.len()
	}

	pub fn is_polling(&self, chain: Chain) -> bool {
		self.state.loops.contains_key(&chain)
	}

	/// Runs one confirmation check over every pending transaction, whatever
	/// the state of its chain's loop. Loops left without work are stopped.
	#[instrument(skip_all)]
	pub async fn force_check_all(&self) {
		self.state.collect_expired(None);

		let snapshot: Vec<PendingTransaction> = self
			.state
			.pending
			.iter()
			.map(|entry| entry.value().clone())
			.collect();
		join_all(snapshot.iter().map(|tx| self.state.check(tx))).await;

		let chains: Vec<Chain> = self.state.loops.iter().map(|entry| *entry.key()).collect();
		for chain in chains {
			if let Some((_, poll_loop)) = self.state.remove_idle_loop(chain, None) {
				poll_loop.handle.abort();
			}
		}
	}

	/// Drops entries past the expiry window on every chain, polled or not,
	/// and returns how many were dropped.
	pub fn cleanup_expired(&self) -> usize {
		self.state.collect_expired(None)
	}

	/// Cancels the poll loop of `chain`. Its pending entries are kept and are
	/// picked up again by the next `add_pending` on that chain.
	pub fn stop_polling(&self, chain: Chain) {
		if let Some((_, poll_loop)) = self.state.loops.remove(&chain) {
			poll_loop.handle.abort();
			tracing::info!(chain = %chain, "Stopped poll loop");
		}
	}

	/// Cancels every poll loop.
	pub fn shutdown(&self) {
		let chains: Vec<Chain> = self.state.loops.iter().map(|entry| *entry.key()).collect();
		for chain in chains {
			self.stop_polling(chain);
		}
	}
}

impl TrackerState {
	fn is_expired(&self, tx: &PendingTransaction) -> bool {
		tx.added_at.elapsed() > self.expiry
	}

	fn has_pending_on(&self, chain: Chain) -> bool {
		self.pending.iter().any(|entry| entry.chain == chain)
	}

	/// Unregisters the loop of `chain` if the chain has nothing pending.
	/// With `Some(id)` only the loop with that id is removed.
	fn remove_idle_loop(&self, chain: Chain, id: Option<u64>) -> Option<(Chain, PollLoop)> {
		self.loops.remove_if(&chain, |_, poll_loop| {
			id.map_or(true, |id| poll_loop.id == id) && !self.has_pending_on(chain)
		})
	}

	fn is_registered(&self, chain: Chain, id: u64) -> bool {
		self.loops
			.get(&chain)
			.is_some_and(|poll_loop| poll_loop.id == id)
	}

	/// Drops expired entries, of one chain or of all chains.
	fn collect_expired(&self, chain: Option<Chain>) -> usize {
		let mut expired = Vec::new();
		self.pending.retain(|_, tx| {
			let in_scope = chain.map_or(true, |c| tx.chain == c);
			if in_scope && self.is_expired(tx) {
				expired.push(tx.clone());
				false
			} else {
				true
			}
		});

		let count = expired.len();
		for tx in expired {
			tracing::warn!(
				tx_hash = %truncate_id(&tx.tx_hash),
				chain = %tx.chain,
				elapsed_secs = tx.elapsed_seconds(),
				"Pending transaction expired without confirmation"
			);
			self.event_bus
				.publish(ChainParamsEvent::Pending(PendingEvent::Expired {
					tx_hash: tx.tx_hash,
					address: tx.address,
					chain: tx.chain,
				}))
				.ok();
		}
		count
	}

	/// One poll tick for `chain`.
	async fn poll_chain(&self, chain: Chain) {
		self.collect_expired(Some(chain));

		let snapshot: Vec<PendingTransaction> = self
			.pending
			.iter()
			.filter(|entry| entry.chain == chain)
			.map(|entry| entry.value().clone())
			.collect();
		for tx in &snapshot {
			self.check(tx).await;
		}
	}

	/// Checks one transaction; failures are logged and left for the next tick.
	#[instrument(skip_all, fields(tx_hash = %truncate_id(&tx.tx_hash), chain = %tx.chain))]
	async fn check(&self, tx: &PendingTransaction) {
		let Some(source) = self.registry.sequence_source_for(tx.chain) else {
			tracing::warn!("No sequence source registered, skipping check");
			return;
		};

		let current = match tokio::time::timeout(
			self.request_timeout,
			source.fetch_sequence(tx.chain, &tx.address),
		)
		.await
		{
			Ok(Ok(current)) => current,
			Ok(Err(e)) => {
				tracing::warn!(error = %e, "Failed to fetch sequence");
				return;
			},
			Err(_) => {
				tracing::warn!(
					timeout_secs = self.request_timeout.as_secs(),
					"Sequence fetch timed out"
				);
				return;
			},
		};

		if !tx.is_confirmed_by(current) {
			tracing::debug!(
				current,
				at_broadcast = tx.sequence_at_broadcast,
				"Still pending"
			);
			return;
		}

		// Another check may have confirmed it meanwhile
		if self.pending.remove(&tx.tx_hash).is_none() {
			return;
		}

		let removed = self.cache.invalidate_address(&tx.address);
		tracing::info!(
			sequence = current,
			invalidated = removed,
			"Transaction confirmed"
		);
		self.event_bus
			.publish(ChainParamsEvent::Pending(PendingEvent::Confirmed {
				tx_hash: tx.tx_hash.clone(),
				address: tx.address.clone(),
				chain: tx.chain,
				sequence: current,
			}))
			.ok();
		self.event_bus
			.publish(ChainParamsEvent::Cache(CacheEvent::Invalidated {
				address: tx.address.clone(),
				removed,
			}))
			.ok();
	}
}

fn spawn_poll_loop(state: Arc<TrackerState>, chain: Chain, id: u64) -> JoinHandle<()> {
	tokio::spawn(async move {
		tracing::info!(chain = %chain, "Started poll loop");
		let mut ticker = interval_at(Instant::now() + state.poll_interval, state.poll_interval);
		ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

		loop {
			ticker.tick().await;
			state.poll_chain(chain).await;

			if state.remove_idle_loop(chain, Some(id)).is_some() {
				tracing::info!(chain = %chain, "Stopped poll loop, nothing pending");
				break;
			}
			if !state.is_registered(chain, id) {
				break;
			}
		}
	})
}
