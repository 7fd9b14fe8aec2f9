//! Transaction parameter resolver.
//!
//! Answers from the parameter cache while an entry is within its chain's TTL
//! and otherwise dispatches to the family adapter. Only successful results
//! are cached, and only if the sender's address was not invalidated while the
//! fetch was in flight; adapter errors reach the caller unchanged. Concurrent misses
//! for the same key are not de-duplicated: both calls hit the network and the
//! last write wins.

use crate::registry::AdapterRegistry;
use chainparams_adapters::AdapterError;
use chainparams_cache::ParameterCache;
use chainparams_types::{truncate_id, ChainSpecificParams, Coin, TransactionIntent};
use std::sync::Arc;
use std::time::Duration;
use tracing::instrument;

pub struct ParamsResolver {
	registry: Arc<AdapterRegistry>,
	cache: Arc<ParameterCache>,
	/// Bound on one adapter call.
	timeout: Duration,
}

impl ParamsResolver {
	pub fn new(registry: Arc<AdapterRegistry>, cache: Arc<ParameterCache>, timeout: Duration) -> Self {
		Self {
			registry,
			cache,
			timeout,
		}
	}

	pub fn registry(&self) -> &AdapterRegistry {
		&self.registry
	}

	/// Resolves the chain-specific parameters for `intent`.
	#[instrument(skip_all, fields(chain = %intent.chain(), action = intent.action.as_str()))]
	pub async fn resolve(
		&self,
		intent: &TransactionIntent,
	) -> Result<ChainSpecificParams, AdapterError> {
		let key = intent.cache_key();
		if let Some(params) = self.cache.get(&key) {
			tracing::debug!(address = %truncate_id(&intent.from_address), "Cache hit");
			return Ok(params);
		}
		tracing::debug!(address = %truncate_id(&intent.from_address), "Cache miss");

		let chain = intent.chain();
		let adapter = self.registry.adapter_for(chain)?;
		let epoch = self.cache.address_epoch(&intent.from_address);
		let params = tokio::time::timeout(self.timeout, adapter.fetch_params(intent))
			.await
			.map_err(|_| AdapterError::Timeout(self.timeout.as_secs()))??;

		let expected = adapter.family();
		if params.family() != expected {
			return Err(AdapterError::ParamsMismatch {
				expected,
				actual: params.family(),
			});
		}

		let stored = self.cache.insert_if_current(
			key,
			chain,
			intent.from_address.clone(),
			params.clone(),
			epoch,
		);
		if !stored {
			tracing::debug!(
				address = %truncate_id(&intent.from_address),
				"Address invalidated during fetch, result not cached"
			);
		}
		Ok(params)
	}

	/// Resolves a swap from `coin`'s address with the fastest fee mode.
	pub async fn resolve_swap(
		&self,
		coin: Coin,
		is_deposit: bool,
	) -> Result<ChainSpecificParams, AdapterError> {
		self.resolve(&TransactionIntent::swap(coin, is_deposit))
			.await
	}

	/// Replaces the block hash of a Solana bundle with a freshly fetched one.
	/// Other bundles are returned unchanged.
	#[instrument(skip_all)]
	pub async fn refresh_solana_blockhash(
		&self,
		params: ChainSpecificParams,
	) -> Result<ChainSpecificParams, AdapterError> {
		match params {
			ChainSpecificParams::Solana {
				priority_fee,
				priority_limit,
				from_token_account,
				to_token_account,
				has_program_id,
				..
			} => {
				let source = self.registry.block_hash_source().ok_or_else(|| {
					AdapterError::UnsupportedAction("no Solana block hash source registered".into())
				})?;
				let recent_block_hash =
					tokio::time::timeout(self.timeout, source.fetch_recent_block_hash())
						.await
						.map_err(|_| AdapterError::Timeout(self.timeout.as_secs()))??;
				Ok(ChainSpecificParams::Solana {
					recent_block_hash,
					priority_fee,
					priority_limit,
					from_token_account,
					to_token_account,
					has_program_id,
				})
			},
			other => Ok(other),
		}
	}

	/// Drops every cached bundle.
	pub fn clear_cache(&self) {
		self.cache.clear();
		tracing::info!("Cleared parameter cache");
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::test_support::{coin, FakeAdapter};
	use async_trait::async_trait;
	use chainparams_adapters::BlockHashSource;
	use chainparams_cache::CacheTtl;
	use chainparams_types::{Chain, ChainFamily, FeeMode, U256};

	fn resolver_with(adapter: Arc<FakeAdapter>) -> (ParamsResolver, Arc<ParameterCache>) {
		let mut registry = AdapterRegistry::new();
		registry.register(adapter);
		let cache = Arc::new(ParameterCache::new(CacheTtl::default()));
		let resolver = ParamsResolver::new(
			Arc::new(registry),
			cache.clone(),
			Duration::from_secs(15),
		);
		(resolver, cache)
	}

	fn btc_intent() -> TransactionIntent {
		TransactionIntent::transfer(coin(Chain::Bitcoin, "bc1sender"), "bc1recipient")
	}

	#[tokio::test(start_paused = true)]
	async fn test_second_resolve_is_served_from_cache() {
		let adapter = Arc::new(FakeAdapter::utxo(25));
		let (resolver, _) = resolver_with(adapter.clone());

		let first = resolver.resolve(&btc_intent()).await.unwrap();
		tokio::time::advance(Duration::from_secs(59)).await;
		let second = resolver.resolve(&btc_intent()).await.unwrap();

		assert_eq!(first, second);
		assert_eq!(adapter.call_count(), 1);

		tokio::time::advance(Duration::from_secs(2)).await;
		resolver.resolve(&btc_intent()).await.unwrap();
		assert_eq!(adapter.call_count(), 2);
	}

	#[tokio::test]
	async fn test_different_fee_mode_misses_cache() {
		let adapter = Arc::new(FakeAdapter::utxo(25));
		let (resolver, cache) = resolver_with(adapter.clone());

		resolver.resolve(&btc_intent()).await.unwrap();
		resolver
			.resolve(&btc_intent().with_fee_mode(FeeMode::Fastest))
			.await
			.unwrap();

		assert_eq!(adapter.call_count(), 2);
		assert_eq!(cache.len(), 2);
	}

	#[tokio::test]
	async fn test_errors_propagate_and_are_not_cached() {
		let adapter = Arc::new(FakeAdapter::new(
			ChainFamily::Utxo,
			Err(AdapterError::FailToGetAccountNumber),
		));
		let (resolver, cache) = resolver_with(adapter.clone());

		for _ in 0..2 {
			assert!(matches!(
				resolver.resolve(&btc_intent()).await,
				Err(AdapterError::FailToGetAccountNumber)
			));
		}
		assert_eq!(adapter.call_count(), 2);
		assert!(cache.is_empty());
	}

	#[tokio::test]
	async fn test_unregistered_family() {
		let (resolver, _) = resolver_with(Arc::new(FakeAdapter::utxo(25)));
		let intent = TransactionIntent::transfer(coin(Chain::Ethereum, "0xsender"), "0xrecipient");
		assert!(matches!(
			resolver.resolve(&intent).await,
			Err(AdapterError::UnsupportedChain(Chain::Ethereum))
		));
	}

	#[tokio::test]
	async fn test_mismatched_bundle_rejected() {
		let adapter = Arc::new(FakeAdapter::new(
			ChainFamily::Utxo,
			Ok(ChainSpecificParams::Ripple {
				sequence: 1,
				gas: 180_000,
				last_ledger_sequence: 61,
			}),
		));
		let (resolver, cache) = resolver_with(adapter);

		assert!(matches!(
			resolver.resolve(&btc_intent()).await,
			Err(AdapterError::ParamsMismatch {
				expected: ChainFamily::Utxo,
				actual: ChainFamily::Ripple,
			})
		));
		assert!(cache.is_empty());
	}

	#[tokio::test(start_paused = true)]
	async fn test_slow_adapter_times_out() {
		let adapter = Arc::new(FakeAdapter::utxo(25).with_delay(Duration::from_secs(30)));
		let (resolver, cache) = resolver_with(adapter);

		assert!(matches!(
			resolver.resolve(&btc_intent()).await,
			Err(AdapterError::Timeout(15))
		));
		assert!(cache.is_empty());
	}

	#[tokio::test(start_paused = true)]
	async fn test_invalidation_during_fetch_is_not_overwritten() {
		let adapter = Arc::new(FakeAdapter::utxo(25).with_delay(Duration::from_secs(2)));
		let (resolver, cache) = resolver_with(adapter.clone());
		let resolver = Arc::new(resolver);

		let in_flight = tokio::spawn({
			let resolver = resolver.clone();
			async move { resolver.resolve(&btc_intent()).await }
		});
		tokio::time::sleep(Duration::from_secs(1)).await;
		cache.invalidate_address("bc1sender");

		assert!(in_flight.await.unwrap().is_ok());
		assert!(cache.is_empty());

		resolver.resolve(&btc_intent()).await.unwrap();
		assert_eq!(adapter.call_count(), 2);
		assert_eq!(cache.len(), 1);
	}

	#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
	async fn test_concurrent_misses_leave_one_entry() {
		let adapter = Arc::new(FakeAdapter::utxo(25).with_delay(Duration::from_millis(20)));
		let (resolver, cache) = resolver_with(adapter.clone());
		let intent = btc_intent();

		let (first, second) = tokio::join!(resolver.resolve(&intent), resolver.resolve(&intent));

		assert_eq!(first.unwrap(), second.unwrap());
		assert_eq!(adapter.call_count(), 2);
		assert_eq!(cache.len(), 1);
	}

	#[tokio::test]
	async fn test_swap_uses_fastest_mode_and_shared_cache() {
		let adapter = Arc::new(FakeAdapter::utxo(25));
		let (resolver, cache) = resolver_with(adapter.clone());
		let btc = coin(Chain::Bitcoin, "bc1sender");

		resolver.resolve_swap(btc.clone(), false).await.unwrap();
		assert!(cache
			.get(&TransactionIntent::swap(btc.clone(), false).cache_key())
			.is_some());

		resolver.resolve_swap(btc, false).await.unwrap();
		assert_eq!(adapter.call_count(), 1);
	}

	#[tokio::test]
	async fn test_clear_cache_forces_refetch() {
		let adapter = Arc::new(FakeAdapter::utxo(25));
		let (resolver, cache) = resolver_with(adapter.clone());

		resolver.resolve(&btc_intent()).await.unwrap();
		resolver.clear_cache();
		assert!(cache.is_empty());

		resolver.resolve(&btc_intent()).await.unwrap();
		assert_eq!(adapter.call_count(), 2);
	}

	struct FixedBlockHash(&'static str);

	#[async_trait]
	impl BlockHashSource for FixedBlockHash {
		async fn fetch_recent_block_hash(&self) -> Result<String, AdapterError> {
			Ok(self.0.to_string())
		}
	}

	#[tokio::test]
	async fn test_refresh_solana_blockhash() {
		let mut registry = AdapterRegistry::new();
		registry.set_block_hash_source(Arc::new(FixedBlockHash("fresh")));
		let resolver = ParamsResolver::new(
			Arc::new(registry),
			Arc::new(ParameterCache::default()),
			Duration::from_secs(15),
		);

		let stale = ChainSpecificParams::Solana {
			recent_block_hash: "stale".into(),
			priority_fee: 1_000_000,
			priority_limit: 100_000,
			from_token_account: Some("ata".into()),
			to_token_account: None,
			has_program_id: true,
		};
		let refreshed = resolver.refresh_solana_blockhash(stale).await.unwrap();
		assert_eq!(
			refreshed,
			ChainSpecificParams::Solana {
				recent_block_hash: "fresh".into(),
				priority_fee: 1_000_000,
				priority_limit: 100_000,
				from_token_account: Some("ata".into()),
				to_token_account: None,
				has_program_id: true,
			}
		);

		let utxo = ChainSpecificParams::Utxo {
			byte_fee: U256::from(25),
			send_max_amount: false,
		};
		assert_eq!(
			resolver.refresh_solana_blockhash(utxo.clone()).await.unwrap(),
			utxo
		);
	}

	#[tokio::test]
	async fn test_refresh_without_source() {
		let (resolver, _) = resolver_with(Arc::new(FakeAdapter::utxo(25)));
		let params = ChainSpecificParams::Solana {
			recent_block_hash: "stale".into(),
			priority_fee: 1,
			priority_limit: 1,
			from_token_account: None,
			to_token_account: None,
			has_program_id: false,
		};
		assert!(matches!(
			resolver.refresh_solana_blockhash(params).await,
			Err(AdapterError::UnsupportedAction(_))
		));
	}
}
