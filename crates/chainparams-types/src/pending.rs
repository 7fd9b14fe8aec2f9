//! Broadcast transactions awaiting confirmation.

use crate::Chain;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::time::Instant;

/// A broadcast transaction tracked until its sender's sequence advances.
///
/// Entries are created right after a successful broadcast and are only ever
/// mutated by the tracker: they are removed once confirmed, or once they
/// outlive the tracker's safety window.
#[derive(Debug, Clone, Serialize)]
pub struct PendingTransaction {
	pub tx_hash: String,
	pub address: String,
	pub chain: Chain,
	/// Account sequence used by the broadcast transaction.
	pub sequence_at_broadcast: u64,
	/// Wall-clock time the transaction was added.
	pub created_at: DateTime<Utc>,
	/// Monotonic time the transaction was added; drives expiry.
	#[serde(skip)]
	pub added_at: Instant,
	pub confirmed: bool,
}

impl PendingTransaction {
	pub fn new(
		tx_hash: impl Into<String>,
		address: impl Into<String>,
		chain: Chain,
		sequence_at_broadcast: u64,
	) -> Self {
		Self {
			tx_hash: tx_hash.into(),
			address: address.into(),
			chain,
			sequence_at_broadcast,
			created_at: Utc::now(),
			added_at: Instant::now(),
			confirmed: false,
		}
	}

	/// Seconds elapsed since the transaction was added.
	pub fn elapsed_seconds(&self) -> u64 {
		self.added_at.elapsed().as_secs()
	}

	/// Whether this entry belongs to the given address on the given chain.
	/// Addresses compare case-insensitively.
	pub fn belongs_to(&self, address: &str, chain: Chain) -> bool {
		self.chain == chain && self.address.eq_ignore_ascii_case(address)
	}

	/// A sequence observed on-chain confirms the transaction only once it has
	/// moved strictly past the sequence used at broadcast.
	pub fn is_confirmed_by(&self, current_sequence: u64) -> bool {
		current_sequence > self.sequence_at_broadcast
	}
}
