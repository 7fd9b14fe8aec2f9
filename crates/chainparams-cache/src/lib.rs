//! Parameter cache for resolved chain parameters.
//!
//! Entries are keyed by the intent fingerprint and hold immutable snapshots.
//! Freshness is checked at read time against a per-chain TTL table, so an
//! expired entry is never returned even if the background sweep has not
//! removed it yet. The tracker drops every entry of an address once one of
//! its transactions confirms, so a stale nonce or sequence is never reused.
//! Each invalidation also bumps the address epoch; a fetch that started
//! under an older epoch is not stored.

use chainparams_types::{CacheKey, Chain, ChainSpecificParams};
use dashmap::DashMap;
use std::collections::HashSet;
use std::time::Duration;
use tokio::time::Instant;

/// Per-chain time-to-live table.
#[derive(Debug, Clone)]
pub struct CacheTtl {
	default_ttl: Duration,
	fast_ttl: Duration,
	fast_chains: HashSet<Chain>,
}

impl CacheTtl {
	pub fn new(
		default_ttl: Duration,
		fast_ttl: Duration,
		fast_chains: impl IntoIterator<Item = Chain>,
	) -> Self {
		Self {
			default_ttl,
			fast_ttl,
			fast_chains: fast_chains.into_iter().collect(),
		}
	}

	/// TTL applied to entries of the given chain.
	pub fn ttl_for(&self, chain: Chain) -> Duration {
		if self.fast_chains.contains(&chain) {
			self.fast_ttl
		} else {
			self.default_ttl
		}
	}
}

impl Default for CacheTtl {
	/// Fast-finality chains (Solana) keep entries for 10s, every other chain
	/// for 60s.
	fn default() -> Self {
		Self::new(
			Duration::from_secs(60),
			Duration::from_secs(10),
			[Chain::Solana],
		)
	}
}

#[derive(Debug, Clone)]
struct CacheEntry {
	params: ChainSpecificParams,
	chain: Chain,
	address: String,
	stored_at: Instant,
}

/// Concurrent cache of resolved parameters.
///
/// Locking is per shard of the underlying map, so resolutions for unrelated
/// keys never wait on each other. The last writer for a key wins.
#[derive(Debug, Default)]
pub struct ParameterCache {
	entries: DashMap<CacheKey, CacheEntry>,
	/// Invalidation count per lowercased address.
	epochs: DashMap<String, u64>,
	ttl: CacheTtl,
}

impl ParameterCache {
	pub fn new(ttl: CacheTtl) -> Self {
		Self {
			entries: DashMap::new(),
			epochs: DashMap::new(),
			ttl,
		}
	}

	/// Returns the cached value if it is still within its chain's TTL.
	///
	/// An expired entry is removed on the way out.
	pub fn get(&self, key: &CacheKey) -> Option<ChainSpecificParams> {
		let stale_since = {
			let entry = self.entries.get(key)?;
			if entry.stored_at.elapsed() < self.ttl.ttl_for(entry.chain) {
				return Some(entry.params.clone());
			}
			entry.stored_at
		};

		// Only drop the entry we judged stale; a concurrent writer may have
		// replaced it in the meantime.
		self.entries
			.remove_if(key, |_, entry| entry.stored_at == stale_since);
		tracing::trace!(key = %key, "Cache entry expired");
		None
	}

	/// Stores a value for `key`, replacing any previous entry.
	pub fn insert(
		&self,
		key: CacheKey,
		chain: Chain,
		address: impl Into<String>,
		params: ChainSpecificParams,
	) {
		self.entries.insert(
			key,
			CacheEntry {
				params,
				chain,
				address: address.into(),
				stored_at: Instant::now(),
			},
		);
	}

	/// Current invalidation epoch of `address`. Read it before fetching and
	/// pass it to [`ParameterCache::insert_if_current`].
	pub fn address_epoch(&self, address: &str) -> u64 {
		self.epochs
			.get(&address.to_ascii_lowercase())
			.map_or(0, |epoch| *epoch)
	}

	/// Stores a value fetched under `epoch` unless `address` was invalidated
	/// since. Returns whether the value was stored.
	pub fn insert_if_current(
		&self,
		key: CacheKey,
		chain: Chain,
		address: impl Into<String>,
		params: ChainSpecificParams,
		epoch: u64,
	) -> bool {
		let address = address.into();
		// The epoch entry stays locked until the value is stored, so a
		// concurrent invalidation either runs first and is seen here, or
		// runs after and removes what was stored.
		let current = self
			.epochs
			.entry(address.to_ascii_lowercase())
			.or_insert(0);
		if *current != epoch {
			return false;
		}
		self.insert(key, chain, address, params);
		true
	}

	/// Drops every entry resolved for `address` (case-insensitive), bumps the
	/// address epoch and returns how many entries were removed.
	pub fn invalidate_address(&self, address: &str) -> usize {
		*self
			.epochs
			.entry(address.to_ascii_lowercase())
			.or_insert(0) += 1;

		let mut removed = 0;
		self.entries.retain(|_, entry| {
			let keep = !entry.address.eq_ignore_ascii_case(address);
			if !keep {
				removed += 1;
			}
			keep
		});
		if removed > 0 {
			tracing::debug!(address = %address, removed, "Invalidated cached parameters");
		}
		removed
	}

	/// Removes all expired entries and returns how many were removed.
	pub fn cleanup_expired(&self) -> usize {
		let mut removed = 0;
		self.entries.retain(|_, entry| {
			let keep = entry.stored_at.elapsed() < self.ttl.ttl_for(entry.chain);
			if !keep {
				removed += 1;
			}
			keep
		});
		removed
	}

	/// Drops every entry.
	pub fn clear(&self) {
		self.entries.clear();
	}

	/// Number of stored entries, including expired ones not yet swept.
	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}
}
