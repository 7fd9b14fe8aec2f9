//! Narrow per-family network interfaces.
//!
//! Each trait exposes exactly the reads its adapter needs. Transport, JSON
//! decoding and retries live behind these traits; adapters only apply the
//! resolution rules. HTTP implementations for EVM JSON-RPC and Cosmos LCD
//! ship in [`crate::implementations::rpc`]; other families are wired by the
//! embedding application.

use crate::ClientError;
use async_trait::async_trait;
use chainparams_types::{Chain, Coin, SuiCoin, TronBlockInfo, U256};
use serde::{Deserialize, Serialize};

/// Account number and sequence as string-encoded by Cosmos-SDK nodes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CosmosAccount {
	pub account_number: String,
	pub sequence: String,
}

/// IBC denom trace as reported by the transfer module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DenomTrace {
	pub path: String,
	pub base_denom: String,
}

/// Combined zk-rollup fee estimate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZkFeeEstimate {
	pub gas_limit: U256,
	pub gas_per_pubdata_limit: U256,
	pub max_fee_per_gas: U256,
	pub max_priority_fee_per_gas: U256,
}

/// Result of looking up an associated token account by owner and mint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenAccountLookup {
	/// The account exists.
	Found {
		address: String,
		is_token_2022: bool,
	},
	/// The node confirmed that no such account exists.
	Absent,
	/// The lookup returned nothing conclusive; the account may still exist.
	Unknown,
}

/// Existence check of a single Solana account.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccountProbe {
	pub exists: bool,
	pub is_token_2022: bool,
}

/// Cost reported by a Sui dry run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SuiGasCost {
	pub computation: u64,
	pub storage: u64,
}

/// Transfer to simulate for a Sui gas estimate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuiTransferSimulation {
	pub coin: Coin,
	pub to_address: String,
	pub amount: U256,
	pub reference_gas_price: u64,
	pub coins: Vec<SuiCoin>,
	pub memo: Option<String>,
}

/// Substrate runtime and block references.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolkadotGasInfo {
	pub recent_block_hash: String,
	pub nonce: u64,
	pub current_block_number: u64,
	pub spec_version: u32,
	pub transaction_version: u32,
	pub genesis_hash: String,
}

/// Sender wallet seqno and message expiry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TonWalletInfo {
	pub sequence_number: u64,
	pub expire_at: u64,
}

/// Ripple `account_info` essentials. Either field may be missing when the
/// account is not activated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RippleAccountInfo {
	pub sequence: Option<u64>,
	pub ledger_current_index: Option<u64>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UtxoClient: Send + Sync {
	/// Current fee-rate quote in satoshis per byte.
	async fn sats_per_byte(&self, chain: Chain) -> Result<U256, ClientError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CardanoClient: Send + Sync {
	async fn current_slot(&self) -> Result<u64, ClientError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EvmClient: Send + Sync {
	/// Base fee of the latest block.
	async fn base_fee(&self) -> Result<U256, ClientError>;
	/// Priority-fee samples over the last 10 blocks at the 5th reward
	/// percentile. May be empty.
	async fn priority_fee_history(&self) -> Result<Vec<U256>, ClientError>;
	/// Single `eth_maxPriorityFeePerGas` quote.
	async fn max_priority_fee(&self) -> Result<U256, ClientError>;
	async fn nonce(&self, address: &str) -> Result<u64, ClientError>;
	/// Simulates a native transfer and returns its gas.
	async fn estimate_transfer_gas(
		&self,
		from: &str,
		to: &str,
		value: U256,
		memo: Option<String>,
	) -> Result<U256, ClientError>;
	/// Simulates an ERC20 `transfer` and returns its gas.
	async fn estimate_erc20_transfer_gas(
		&self,
		from: &str,
		contract: &str,
		to: &str,
		amount: U256,
	) -> Result<U256, ClientError>;
	/// `zks_estimateFee` for a call carrying `data`.
	async fn zk_estimate_fee(
		&self,
		from: &str,
		to: &str,
		data: String,
	) -> Result<ZkFeeEstimate, ClientError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CosmosClient: Send + Sync {
	/// Account record, or `None` when the node does not know the address.
	async fn account(&self, address: &str) -> Result<Option<CosmosAccount>, ClientError>;
	async fn latest_block_height(&self) -> Result<u64, ClientError>;
	/// Denom trace for the hash part of an `ibc/<hash>` denom.
	async fn denom_trace(&self, hash: &str) -> Result<DenomTrace, ClientError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ThorchainClient: Send + Sync {
	/// Network identifier expected in signed transactions.
	async fn network_chain_id(&self) -> Result<String, ClientError>;
	async fn account(&self, address: &str) -> Result<Option<CosmosAccount>, ClientError>;
	/// Native transaction fee.
	async fn native_fee(&self) -> Result<u64, ClientError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SolanaClient: Send + Sync {
	/// Latest block hash, `None` if the node returned none.
	async fn recent_block_hash(&self) -> Result<Option<String>, ClientError>;
	/// Priority-fee estimate in micro-lamports per compute unit.
	async fn priority_fee_estimate(&self) -> Result<u64, ClientError>;
	async fn token_account(
		&self,
		owner: &str,
		mint: &str,
	) -> Result<TokenAccountLookup, ClientError>;
	async fn account_exists(&self, address: &str) -> Result<AccountProbe, ClientError>;
}

/// Derives associated token account addresses.
#[cfg_attr(test, mockall::automock)]
pub trait TokenAccountDeriver: Send + Sync {
	/// Associated token address of `owner` for `mint` under the standard or
	/// token-2022 program. `None` if `owner` is not a valid address.
	fn derive(&self, owner: &str, mint: &str, token_2022: bool) -> Option<String>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SuiClient: Send + Sync {
	async fn reference_gas_price(&self) -> Result<u64, ClientError>;
	/// Every coin object owned by `owner`.
	async fn all_coins(&self, owner: &str) -> Result<Vec<SuiCoin>, ClientError>;
	async fn dry_run_transfer(
		&self,
		simulation: SuiTransferSimulation,
	) -> Result<SuiGasCost, ClientError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PolkadotClient: Send + Sync {
	async fn gas_info(&self, address: &str) -> Result<PolkadotGasInfo, ClientError>;
	async fn dynamic_fee(
		&self,
		from: &str,
		to: &str,
		amount: U256,
		memo: Option<String>,
	) -> Result<u64, ClientError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TonClient: Send + Sync {
	async fn wallet_info(&self, address: &str) -> Result<TonWalletInfo, ClientError>;
	/// Raw wallet state, e.g. `"active"` or `"uninit"`.
	async fn wallet_state(&self, address: &str) -> Result<String, ClientError>;
	async fn jetton_wallet_address(
		&self,
		owner: &str,
		master: &str,
	) -> Result<Option<String>, ClientError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RippleClient: Send + Sync {
	async fn account_info(&self, address: &str) -> Result<Option<RippleAccountInfo>, ClientError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TronClient: Send + Sync {
	async fn block_info(
		&self,
		coin: &Coin,
		to: Option<String>,
		memo: Option<String>,
	) -> Result<TronBlockInfo, ClientError>;
}
