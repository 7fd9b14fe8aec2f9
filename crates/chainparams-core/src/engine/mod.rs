//! Engine facade exposed to transaction-building flows.
//!
//! [`ChainParamsEngine`] owns the resolver, the parameter cache, the pending
//! tracker and the event bus, and forwards the public operations to them.

pub mod event_bus;
pub mod lifecycle;

use crate::monitoring::PendingTracker;
use crate::resolver::ParamsResolver;
use chainparams_adapters::AdapterError;
use chainparams_cache::ParameterCache;
use chainparams_config::Config;
use chainparams_types::{Chain, ChainSpecificParams, Coin, PendingTransaction, TransactionIntent};
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

/// Chain-parameter engine.
#[derive(Clone)]
pub struct ChainParamsEngine {
	pub(crate) config: Config,
	pub(crate) resolver: Arc<ParamsResolver>,
	pub(crate) cache: Arc<ParameterCache>,
	pub(crate) tracker: PendingTracker,
	pub(crate) event_bus: event_bus::EventBus,
	/// Background cache sweep, set while the engine is running.
	pub(crate) maintenance: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl ChainParamsEngine {
	pub fn new(
		config: Config,
		resolver: Arc<ParamsResolver>,
		cache: Arc<ParameterCache>,
		tracker: PendingTracker,
		event_bus: event_bus::EventBus,
	) -> Self {
		Self {
			config,
			resolver,
			cache,
			tracker,
			event_bus,
			maintenance: Arc::new(Mutex::new(None)),
		}
	}

	/// Resolves the parameters needed to build the transaction of `intent`.
	pub async fn resolve(
		&self,
		intent: &TransactionIntent,
	) -> Result<ChainSpecificParams, AdapterError> {
		self.resolver.resolve(intent).await
	}

	pub async fn resolve_swap(
		&self,
		coin: Coin,
		is_deposit: bool,
	) -> Result<ChainSpecificParams, AdapterError> {
		self.resolver.resolve_swap(coin, is_deposit).await
	}

	pub async fn refresh_solana_blockhash(
		&self,
		params: ChainSpecificParams,
	) -> Result<ChainSpecificParams, AdapterError> {
		self.resolver.refresh_solana_blockhash(params).await
	}

	pub fn clear_cache(&self) {
		self.resolver.clear_cache();
	}

	/// Records a just-broadcast transaction.
	pub fn add_pending_transaction(
		&self,
		tx_hash: impl Into<String>,
		address: impl Into<String>,
		chain: Chain,
		sequence: u64,
	) {
		self.tracker.add_pending(tx_hash, address, chain, sequence);
	}

	pub fn has_pending_transactions(&self, address: &str, chain: Chain) -> bool {
		self.tracker.has_pending(address, chain)
	}

	pub fn oldest_pending_transaction(
		&self,
		address: &str,
		chain: Chain,
	) -> Option<PendingTransaction> {
		self.tracker.oldest_pending(address, chain)
	}

	pub async fn force_check_pending_transactions(&self) {
		self.tracker.force_check_all().await;
	}

	pub fn stop_polling(&self, chain: Chain) {
		self.tracker.stop_polling(chain);
	}

	pub fn config(&self) -> &Config {
		&self.config
	}

	pub fn cache(&self) -> &Arc<ParameterCache> {
		&self.cache
	}

	pub fn tracker(&self) -> &PendingTracker {
		&self.tracker
	}

	pub fn event_bus(&self) -> &event_bus::EventBus {
		&self.event_bus
	}
}
