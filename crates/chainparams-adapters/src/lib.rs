//! Chain adapters for the chain-parameter engine.
//!
//! A chain adapter turns a [`TransactionIntent`] into the
//! [`ChainSpecificParams`] bundle of its chain family. Adapters sit on top of
//! narrow per-family network clients (see [`clients`]) and never touch HTTP
//! directly, which keeps the resolution rules testable against mocks.
//!
//! Families whose confirmations can be observed through the sender's account
//! sequence additionally implement [`SequenceSource`], which the pending
//! transaction tracker polls.

use async_trait::async_trait;
use chainparams_types::{Chain, ChainFamily, ChainSpecificParams, TransactionIntent};
use thiserror::Error;

/// Network-client traits and the data they return.
pub mod clients;
/// Retry helper for flaky list endpoints.
pub mod retry;

/// Re-export implementations
pub mod implementations {
	pub mod cardano;
	pub mod cosmos;
	pub mod evm;
	pub mod polkadot;
	pub mod ripple;
	pub mod solana;
	pub mod sui;
	pub mod thorchain;
	pub mod ton;
	pub mod tron;
	pub mod utxo;

	/// Concrete network clients.
	pub mod rpc {
		pub mod cosmos_lcd;
		pub mod evm_alloy;
	}
}

/// Errors raised by network clients.
#[derive(Debug, Clone, Error)]
pub enum ClientError {
	/// Connection or transport failure.
	#[error("Network error: {0}")]
	Network(String),
	/// The node answered with an RPC-level error.
	#[error("RPC error {code}: {message}")]
	Rpc { code: i64, message: String },
	/// The response could not be decoded.
	#[error("Decode error: {0}")]
	Decode(String),
	/// The request did not complete within its bound.
	#[error("Request timed out")]
	Timeout,
}

/// Errors raised while resolving chain parameters.
#[derive(Debug, Clone, Error)]
pub enum AdapterError {
	#[error("Failed to get account number")]
	FailToGetAccountNumber,
	#[error("Failed to get sequence number")]
	FailToGetSequenceNumber,
	#[error("Failed to get recent block hash")]
	FailToGetRecentBlockHash,
	#[error("Failed to get associated token address")]
	FailToGetAssociatedTokenAddress,
	/// A required field of a network response was missing or malformed.
	#[error("Invalid response: {0}")]
	InvalidResponse(String),
	/// No adapter or client is registered for the chain.
	#[error("Unsupported chain: {0}")]
	UnsupportedChain(Chain),
	/// The family does not support the requested operation.
	#[error("Unsupported action: {0}")]
	UnsupportedAction(String),
	/// An adapter returned a bundle of another family.
	#[error("Adapter for {expected} returned {actual} parameters")]
	ParamsMismatch {
		expected: ChainFamily,
		actual: ChainFamily,
	},
	/// The resolution did not complete within the request timeout.
	#[error("Resolution timed out after {0}s")]
	Timeout(u64),
	#[error(transparent)]
	Client(#[from] ClientError),
}

/// Trait defining the interface for chain adapters.
///
/// One implementation serves every chain of its family.
#[async_trait]
pub trait ChainAdapter: Send + Sync {
	/// Family this adapter resolves parameters for.
	fn family(&self) -> ChainFamily;

	/// Fetches everything needed to build a transaction for `intent`.
	///
	/// Independent network reads are issued concurrently. The returned bundle
	/// is always of this adapter's family.
	async fn fetch_params(
		&self,
		intent: &TransactionIntent,
	) -> Result<ChainSpecificParams, AdapterError>;
}

/// Source of the current account sequence for sequence-tracked families.
#[async_trait]
pub trait SequenceSource: Send + Sync {
	/// Returns the current on-chain sequence of `address` on `chain`.
	async fn fetch_sequence(&self, chain: Chain, address: &str) -> Result<u64, AdapterError>;
}

/// Source of a fresh recent block hash, re-fetched right before signing.
#[async_trait]
pub trait BlockHashSource: Send + Sync {
	async fn fetch_recent_block_hash(&self) -> Result<String, AdapterError>;
}

/// Parses a string-encoded account number. Never defaults to zero.
pub(crate) fn parse_account_number(raw: &str) -> Result<u64, AdapterError> {
	raw.trim()
		.parse()
		.map_err(|_| AdapterError::FailToGetAccountNumber)
}

/// Parses a string-encoded sequence. Never defaults to zero.
pub(crate) fn parse_sequence(raw: &str) -> Result<u64, AdapterError> {
	raw.trim()
		.parse()
		.map_err(|_| AdapterError::FailToGetSequenceNumber)
}

pub use implementations::cardano::CardanoAdapter;
pub use implementations::cosmos::CosmosAdapter;
pub use implementations::evm::{EvmAdapter, EvmNetwork};
pub use implementations::polkadot::PolkadotAdapter;
pub use implementations::ripple::RippleAdapter;
pub use implementations::solana::SolanaAdapter;
pub use implementations::sui::SuiAdapter;
pub use implementations::thorchain::ThorchainAdapter;
pub use implementations::ton::TonAdapter;
pub use implementations::tron::TronAdapter;
pub use implementations::rpc::cosmos_lcd::CosmosLcdClient;
pub use implementations::rpc::evm_alloy::AlloyEvmClient;
pub use implementations::utxo::UtxoAdapter;
