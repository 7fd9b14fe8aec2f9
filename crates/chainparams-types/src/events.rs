//! Event types published on the engine's event bus.

use crate::Chain;

/// Top-level event enum.
#[derive(Debug, Clone)]
pub enum ChainParamsEvent {
	/// Pending-transaction lifecycle events.
	Pending(PendingEvent),
	/// Parameter cache events.
	Cache(CacheEvent),
}

/// Lifecycle of a tracked transaction.
#[derive(Debug, Clone)]
pub enum PendingEvent {
	Added {
		tx_hash: String,
		address: String,
		chain: Chain,
	},
	Confirmed {
		tx_hash: String,
		address: String,
		chain: Chain,
		sequence: u64,
	},
	Expired {
		tx_hash: String,
		address: String,
		chain: Chain,
	},
}

#[derive(Debug, Clone)]
pub enum CacheEvent {
	/// Entries for an address were dropped after a confirmation.
	Invalidated { address: String, removed: usize },
}
