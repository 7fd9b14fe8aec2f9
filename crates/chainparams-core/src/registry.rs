//! Family-keyed registry of chain adapters.
//!
//! Populated once at startup by the builder and shared read-only afterwards.
//! Dispatch goes chain → family → adapter, so one adapter serves every chain
//! of its family.

use chainparams_adapters::{AdapterError, BlockHashSource, ChainAdapter, SequenceSource};
use chainparams_types::{Chain, ChainFamily};
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Default)]
pub struct AdapterRegistry {
	adapters: HashMap<ChainFamily, Arc<dyn ChainAdapter>>,
	sequence_sources: HashMap<ChainFamily, Arc<dyn SequenceSource>>,
	block_hash_source: Option<Arc<dyn BlockHashSource>>,
}

impl AdapterRegistry {
	pub fn new() -> Self {
		Self::default()
	}

	/// Registers `adapter` for its family, replacing any previous one.
	pub fn register(&mut self, adapter: Arc<dyn ChainAdapter>) {
		let family = adapter.family();
		if self.adapters.insert(family, adapter).is_some() {
			tracing::warn!(family = %family, "Replaced chain adapter");
		}
	}

	/// Registers an adapter that also reports account sequences.
	pub fn register_tracked<A>(&mut self, adapter: Arc<A>)
	where
		A: ChainAdapter + SequenceSource + 'static,
	{
		let family = adapter.family();
		self.sequence_sources.insert(family, adapter.clone());
		self.register(adapter);
	}

	pub fn set_block_hash_source(&mut self, source: Arc<dyn BlockHashSource>) {
		self.block_hash_source = Some(source);
	}

	pub fn contains(&self, family: ChainFamily) -> bool {
		self.adapters.contains_key(&family)
	}

	pub fn is_empty(&self) -> bool {
		self.adapters.is_empty()
	}

	/// Registered families, in no particular order.
	pub fn families(&self) -> Vec<ChainFamily> {
		self.adapters.keys().copied().collect()
	}

	/// Adapter serving `chain`.
	///
	/// # Errors
	///
	/// Returns [`AdapterError::UnsupportedChain`] when no adapter is
	/// registered for the chain's family.
	pub fn adapter_for(&self, chain: Chain) -> Result<Arc<dyn ChainAdapter>, AdapterError> {
		self.adapters
			.get(&chain.family())
			.cloned()
			.ok_or(AdapterError::UnsupportedChain(chain))
	}

	pub fn sequence_source_for(&self, chain: Chain) -> Option<Arc<dyn SequenceSource>> {
		self.sequence_sources.get(&chain.family()).cloned()
	}

	pub fn block_hash_source(&self) -> Option<Arc<dyn BlockHashSource>> {
		self.block_hash_source.clone()
	}
}
