//! Builder for [`ChainParamsEngine`].
//!
//! Adapters supplied by the embedding application take precedence. For the
//! EVM and Cosmos families, which ship HTTP clients, the builder creates an
//! adapter from the configured networks when none was supplied. Configured
//! networks of any other family need an adapter from the embedder.

use crate::engine::{event_bus::EventBus, ChainParamsEngine};
use crate::monitoring::PendingTracker;
use crate::registry::AdapterRegistry;
use crate::resolver::ParamsResolver;
use chainparams_adapters::clients::CosmosClient;
use chainparams_adapters::{
	AlloyEvmClient, BlockHashSource, ChainAdapter, CosmosAdapter, CosmosLcdClient, EvmAdapter,
	EvmNetwork, SequenceSource,
};
use chainparams_cache::{CacheTtl, ParameterCache};
use chainparams_config::Config;
use chainparams_types::{Chain, ChainFamily, U256};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur during engine construction.
#[derive(Debug, Error)]
pub enum BuilderError {
	#[error("Configuration error: {0}")]
	Config(String),
	#[error("Missing required component: {0}")]
	MissingComponent(String),
}

/// Builder for constructing a ChainParamsEngine.
pub struct EngineBuilder {
	config: Config,
	registry: AdapterRegistry,
	event_capacity: usize,
}

impl EngineBuilder {
	pub fn new(config: Config) -> Self {
		Self {
			config,
			registry: AdapterRegistry::new(),
			event_capacity: 1000,
		}
	}

	pub fn with_adapter(mut self, adapter: Arc<dyn ChainAdapter>) -> Self {
		self.registry.register(adapter);
		self
	}

	/// Adds an adapter whose family can also be polled for sequences.
	pub fn with_tracked_adapter<A>(mut self, adapter: Arc<A>) -> Self
	where
		A: ChainAdapter + SequenceSource + 'static,
	{
		self.registry.register_tracked(adapter);
		self
	}

	pub fn with_block_hash_source(mut self, source: Arc<dyn BlockHashSource>) -> Self {
		self.registry.set_block_hash_source(source);
		self
	}

	pub fn with_event_capacity(mut self, capacity: usize) -> Self {
		self.event_capacity = capacity;
		self
	}

	pub fn build(mut self) -> Result<ChainParamsEngine, BuilderError> {
		let timeout = self.config.engine.request_timeout();

		if !self.registry.contains(ChainFamily::Evm) {
			if let Some(adapter) = evm_adapter(&self.config, timeout)? {
				self.registry.register(Arc::new(adapter));
				tracing::info!(component = "adapter", family = "evm", "Loaded");
			}
		}
		if !self.registry.contains(ChainFamily::Cosmos) {
			if let Some(adapter) = cosmos_adapter(&self.config, timeout)? {
				self.registry.register_tracked(Arc::new(adapter));
				tracing::info!(component = "adapter", family = "cosmos", "Loaded");
			}
		}

		for chain in self.config.networks.keys() {
			if !self.registry.contains(chain.family()) {
				tracing::warn!(
					chain = %chain,
					family = %chain.family(),
					"Network configured but no adapter registered for its family"
				);
			}
		}

		if self.registry.is_empty() {
			tracing::error!("No chain adapters available");
			return Err(BuilderError::MissingComponent("chain adapters".into()));
		}

		let cache_config = &self.config.cache;
		let cache = Arc::new(ParameterCache::new(CacheTtl::new(
			Duration::from_secs(cache_config.default_ttl_seconds),
			Duration::from_secs(cache_config.fast_ttl_seconds),
			cache_config.fast_finality_chains.iter().copied(),
		)));

		let registry = Arc::new(self.registry);
		let event_bus = EventBus::new(self.event_capacity);
		let resolver = Arc::new(ParamsResolver::new(
			registry.clone(),
			cache.clone(),
			timeout,
		));
		let tracker = PendingTracker::new(
			registry.clone(),
			cache.clone(),
			event_bus.clone(),
			self.config.tracker.poll_interval(),
			self.config.tracker.expiry(),
			timeout,
		);

		tracing::info!(
			engine_id = %self.config.engine.id,
			families = registry.families().len(),
			networks = self.config.networks.len(),
			"Engine built"
		);

		Ok(ChainParamsEngine::new(
			self.config,
			resolver,
			cache,
			tracker,
			event_bus,
		))
	}
}

fn configured(config: &Config, family: ChainFamily) -> impl Iterator<Item = (Chain, &str, u64)> {
	config
		.networks
		.iter()
		.filter(move |(chain, _)| chain.family() == family)
		.map(|(chain, network)| (*chain, network.rpc_url.as_str(), network.min_priority_fee_wei))
}

fn evm_adapter(config: &Config, timeout: Duration) -> Result<Option<EvmAdapter>, BuilderError> {
	let mut networks = HashMap::new();
	for (chain, rpc_url, min_priority_fee_wei) in configured(config, ChainFamily::Evm) {
		let client = AlloyEvmClient::new(rpc_url, timeout).map_err(|e| {
			tracing::error!(chain = %chain, error = %e, "Failed to create EVM client");
			BuilderError::Config(format!("Failed to create EVM client for {}: {}", chain, e))
		})?;
		networks.insert(
			chain,
			EvmNetwork {
				client: Arc::new(client),
				default_priority_fee: U256::from(min_priority_fee_wei),
			},
		);
	}
	Ok((!networks.is_empty()).then(|| EvmAdapter::new(networks)))
}

fn cosmos_adapter(
	config: &Config,
	timeout: Duration,
) -> Result<Option<CosmosAdapter>, BuilderError> {
	let mut clients: HashMap<Chain, Arc<dyn CosmosClient>> = HashMap::new();
	for (chain, rpc_url, _) in configured(config, ChainFamily::Cosmos) {
		let client = CosmosLcdClient::new(rpc_url, timeout).map_err(|e| {
			tracing::error!(chain = %chain, error = %e, "Failed to create Cosmos LCD client");
			BuilderError::Config(format!("Failed to create Cosmos client for {}: {}", chain, e))
		})?;
		clients.insert(chain, Arc::new(client));
	}
	Ok((!clients.is_empty()).then(|| CosmosAdapter::new(clients)))
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::test_support::{coin, FakeAdapter, FakeSequences};
	use chainparams_types::{CacheEvent, ChainParamsEvent, PendingEvent, TransactionIntent};
	use std::str::FromStr;

	fn config(networks: &str) -> Config {
		Config::from_str(&format!(
			r#"
[engine]
id = "test-engine"

[tracker]
poll_interval_seconds = 10
expiry_seconds = 600

{}
"#,
			networks
		))
		.unwrap()
	}

	#[test]
	fn test_builds_http_adapters_from_networks() {
		let engine = EngineBuilder::new(config(
			r#"
[networks.ethereum]
rpc_url = "http://127.0.0.1:8545"
min_priority_fee_wei = 1000000000

[networks.gaia]
rpc_url = "http://127.0.0.1:1317"
"#,
		))
		.build()
		.unwrap();

		let registry = engine.resolver.registry();
		assert!(registry.contains(ChainFamily::Evm));
		assert!(registry.contains(ChainFamily::Cosmos));
		assert!(registry.sequence_source_for(Chain::Gaia).is_some());
		assert!(registry.sequence_source_for(Chain::Ethereum).is_none());
	}

	#[test]
	fn test_family_without_adapter_fails_when_nothing_else_registered() {
		let result = EngineBuilder::new(config(
			r#"
[networks.bitcoin]
rpc_url = "https://btc.example.com"
"#,
		))
		.build();
		assert!(matches!(result, Err(BuilderError::MissingComponent(_))));

		let engine = EngineBuilder::new(config(
			r#"
[networks.bitcoin]
rpc_url = "https://btc.example.com"
"#,
		))
		.with_adapter(Arc::new(FakeAdapter::utxo(25)))
		.build();
		assert!(engine.is_ok());
	}

	#[tokio::test(start_paused = true)]
	async fn test_confirmation_invalidates_cached_sequence() {
		let sequences = Arc::new(FakeSequences::new(ChainFamily::Cosmos));
		sequences.set("addr1", 5);

		let engine = EngineBuilder::new(config(
			r#"
[networks.gaia]
rpc_url = "http://127.0.0.1:1317"
"#,
		))
		.with_tracked_adapter(sequences.clone())
		.build()
		.unwrap();
		let mut events = engine.event_bus().subscribe();

		let intent = TransactionIntent::transfer(coin(Chain::Gaia, "addr1"), "addr2");
		let before = engine.resolve(&intent).await.unwrap();
		assert_eq!(before.sequence(), Some(5));
		assert_eq!(engine.cache().len(), 1);

		engine.add_pending_transaction("0xabc", "addr1", Chain::Gaia, 5);
		assert!(engine.has_pending_transactions("addr1", Chain::Gaia));

		// Sequence unchanged: still pending and still cached
		tokio::time::sleep(Duration::from_secs(10)).await;
		tokio::task::yield_now().await;
		assert!(engine.has_pending_transactions("addr1", Chain::Gaia));
		assert_eq!(engine.cache().len(), 1);

		sequences.set("addr1", 6);
		tokio::time::sleep(Duration::from_secs(10)).await;
		tokio::task::yield_now().await;
		assert!(!engine.has_pending_transactions("addr1", Chain::Gaia));
		assert!(engine.cache().is_empty());
		assert!(!engine.tracker().is_polling(Chain::Gaia));

		let after = engine.resolve(&intent).await.unwrap();
		assert_eq!(after.sequence(), Some(6));

		let mut seen = Vec::new();
		while let Ok(event) = events.try_recv() {
			seen.push(event);
		}
		assert!(matches!(
			seen.as_slice(),
			[
				ChainParamsEvent::Pending(PendingEvent::Added { .. }),
				ChainParamsEvent::Pending(PendingEvent::Confirmed { sequence: 6, .. }),
				ChainParamsEvent::Cache(CacheEvent::Invalidated { removed: 1, .. }),
			]
		));
	}

	#[tokio::test(start_paused = true)]
	async fn test_lifecycle() {
		let engine = EngineBuilder::new(config(
			r#"
[cache]
default_ttl_seconds = 60
fast_ttl_seconds = 10
cleanup_interval_seconds = 30

[networks.bitcoin]
rpc_url = "https://btc.example.com"
"#,
		))
		.with_adapter(Arc::new(FakeAdapter::utxo(25)))
		.build()
		.unwrap();

		engine.initialize().await;
		engine.initialize().await;

		let intent = TransactionIntent::transfer(coin(Chain::Bitcoin, "bc1a"), "bc1b");
		engine.resolve(&intent).await.unwrap();
		assert_eq!(engine.cache().len(), 1);

		// Expired at 60s, swept at the 90s pass
		tokio::time::sleep(Duration::from_secs(91)).await;
		tokio::task::yield_now().await;
		assert!(engine.cache().is_empty());

		engine.shutdown().await;
		assert!(engine.maintenance.lock().await.is_none());
	}
	#[tokio::test(start_paused = true)]
	async fn test_sweep_drops_expired_pending_on_unpolled_chains() {
		let engine = EngineBuilder::new(config(
			r#"
[cache]
cleanup_interval_seconds = 60

[networks.bitcoin]
rpc_url = "https://btc.example.com"
"#,
		))
		.with_adapter(Arc::new(FakeAdapter::utxo(25)))
		.build()
		.unwrap();
		engine.initialize().await;

		for i in 0..50u64 {
			engine.add_pending_transaction(format!("0x{i}"), "bc1a", Chain::Bitcoin, i);
		}
		assert!(!engine.tracker().is_polling(Chain::Bitcoin));

		tokio::time::sleep(Duration::from_secs(590)).await;
		tokio::task::yield_now().await;
		assert_eq!(engine.tracker().pending_count(), 50);

		// Past the 600s window, dropped by the 660s pass
		tokio::time::sleep(Duration::from_secs(80)).await;
		tokio::task::yield_now().await;
		assert_eq!(engine.tracker().pending_count(), 0);
		assert!(!engine.has_pending_transactions("bc1a", Chain::Bitcoin));

		engine.shutdown().await;
	}
}
