//! Hand-written fake adapters shared by the resolver, tracker and engine tests.

use async_trait::async_trait;
use chainparams_adapters::{AdapterError, ChainAdapter, SequenceSource};
use chainparams_types::{
	Chain, ChainFamily, ChainSpecificParams, Coin, TransactionIntent, TransactionType, U256,
};
use dashmap::DashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Adapter returning a fixed bundle and counting its calls.
pub struct FakeAdapter {
	family: ChainFamily,
	result: Result<ChainSpecificParams, AdapterError>,
	delay: Duration,
	pub calls: Arc<AtomicUsize>,
}

impl FakeAdapter {
	pub fn new(family: ChainFamily, result: Result<ChainSpecificParams, AdapterError>) -> Self {
		Self {
			family,
			result,
			delay: Duration::ZERO,
			calls: Arc::new(AtomicUsize::new(0)),
		}
	}

	pub fn utxo(byte_fee: u64) -> Self {
		Self::new(
			ChainFamily::Utxo,
			Ok(ChainSpecificParams::Utxo {
				byte_fee: U256::from(byte_fee),
				send_max_amount: false,
			}),
		)
	}

	pub fn with_delay(mut self, delay: Duration) -> Self {
		self.delay = delay;
		self
	}

	pub fn call_count(&self) -> usize {
		self.calls.load(Ordering::SeqCst)
	}
}

#[async_trait]
impl ChainAdapter for FakeAdapter {
	fn family(&self) -> ChainFamily {
		self.family
	}

	async fn fetch_params(
		&self,
		_intent: &TransactionIntent,
	) -> Result<ChainSpecificParams, AdapterError> {
		self.calls.fetch_add(1, Ordering::SeqCst);
		if !self.delay.is_zero() {
			tokio::time::sleep(self.delay).await;
		}
		self.result.clone()
	}
}

/// Sequence-tracked adapter whose on-chain sequences are set by the test.
pub struct FakeSequences {
	family: ChainFamily,
	sequences: DashMap<String, u64>,
	failing: AtomicBool,
	pub polls: AtomicUsize,
}

impl FakeSequences {
	pub fn new(family: ChainFamily) -> Self {
		Self {
			family,
			sequences: DashMap::new(),
			failing: AtomicBool::new(false),
			polls: AtomicUsize::new(0),
		}
	}

	pub fn set(&self, address: &str, sequence: u64) {
		self.sequences.insert(address.to_string(), sequence);
	}

	pub fn set_failing(&self, failing: bool) {
		self.failing.store(failing, Ordering::SeqCst);
	}

	pub fn poll_count(&self) -> usize {
		self.polls.load(Ordering::SeqCst)
	}
}

#[async_trait]
impl ChainAdapter for FakeSequences {
	fn family(&self) -> ChainFamily {
		self.family
	}

	async fn fetch_params(
		&self,
		intent: &TransactionIntent,
	) -> Result<ChainSpecificParams, AdapterError> {
		let sequence = self.fetch_sequence(intent.chain(), &intent.from_address).await?;
		Ok(ChainSpecificParams::Cosmos {
			account_number: 1,
			sequence,
			gas: 7_500,
			transaction_type: TransactionType::Unspecified,
			ibc_denom_trace: None,
		})
	}
}

#[async_trait]
impl SequenceSource for FakeSequences {
	async fn fetch_sequence(&self, _chain: Chain, address: &str) -> Result<u64, AdapterError> {
		self.polls.fetch_add(1, Ordering::SeqCst);
		if self.failing.load(Ordering::SeqCst) {
			return Err(AdapterError::FailToGetSequenceNumber);
		}
		self.sequences
			.get(address)
			.map(|sequence| *sequence)
			.ok_or(AdapterError::FailToGetSequenceNumber)
	}
}

pub fn coin(chain: Chain, address: &str) -> Coin {
	Coin {
		chain,
		ticker: "TEST".into(),
		address: address.into(),
		decimals: 8,
		contract_address: String::new(),
		is_native_token: true,
		fee_default: String::new(),
	}
}
