//! Chain-specific parameter bundles.
//!
//! A [`ChainSpecificParams`] value carries exactly the fields one chain
//! family needs to build a signable transaction. Resolution always yields a
//! single variant, and that variant always matches the family of the coin the
//! intent was resolved for.

use crate::{ChainFamily, TransactionType, U256};
use serde::{Deserialize, Serialize};

/// IBC denom trace plus the timeout marker for IBC transfers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IbcDenomTrace {
	pub path: String,
	pub base_denom: String,
	/// Timeout in the form `"{latestBlockHeight}_{unixNanoTimeout}"`.
	pub height: String,
}

/// A Sui coin object that can be selected as a transaction input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuiCoin {
	pub coin_type: String,
	pub coin_object_id: String,
	pub version: String,
	pub digest: String,
	pub balance: String,
}

/// Block reference bundle required to build a Tron transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TronBlockInfo {
	pub timestamp: u64,
	pub expiration: u64,
	pub block_header_timestamp: u64,
	pub block_header_number: u64,
	pub block_header_version: u64,
	pub block_header_tx_trie_root: String,
	pub block_header_parent_hash: String,
	pub block_header_witness_address: String,
	pub gas_estimation: u64,
}

/// Chain-specific parameters produced by one resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChainSpecificParams {
	Utxo {
		byte_fee: U256,
		send_max_amount: bool,
	},
	Cardano {
		byte_fee: u64,
		send_max_amount: bool,
		ttl: u64,
	},
	Ethereum {
		max_fee_per_gas_wei: U256,
		priority_fee_wei: U256,
		nonce: u64,
		gas_limit: U256,
	},
	Cosmos {
		account_number: u64,
		sequence: u64,
		gas: u64,
		transaction_type: TransactionType,
		ibc_denom_trace: Option<IbcDenomTrace>,
	},
	Thorchain {
		account_number: u64,
		sequence: u64,
		fee: u64,
		is_deposit: bool,
		transaction_type: TransactionType,
	},
	Solana {
		recent_block_hash: String,
		priority_fee: u64,
		priority_limit: u64,
		from_token_account: Option<String>,
		/// `None` means the recipient token account does not exist yet and
		/// the transaction must create it.
		to_token_account: Option<String>,
		has_program_id: bool,
	},
	Sui {
		reference_gas_price: u64,
		coins: Vec<SuiCoin>,
		gas_budget: u64,
	},
	Polkadot {
		recent_block_hash: String,
		nonce: u64,
		current_block_number: u64,
		spec_version: u32,
		transaction_version: u32,
		genesis_hash: String,
		gas: u64,
	},
	Ton {
		sequence_number: u64,
		expire_at: u64,
		bounceable: bool,
		send_max_amount: bool,
		jetton_address: String,
		is_active_destination: bool,
	},
	Ripple {
		sequence: u64,
		gas: u64,
		last_ledger_sequence: u64,
	},
	Tron(TronBlockInfo),
}

impl ChainSpecificParams {
	/// Returns the chain family this bundle belongs to.
	pub fn family(&self) -> ChainFamily {
		match self {
			ChainSpecificParams::Utxo { .. } => ChainFamily::Utxo,
			ChainSpecificParams::Cardano { .. } => ChainFamily::Cardano,
			ChainSpecificParams::Ethereum { .. } => ChainFamily::Evm,
			ChainSpecificParams::Cosmos { .. } => ChainFamily::Cosmos,
			ChainSpecificParams::Thorchain { .. } => ChainFamily::ThorchainLike,
			ChainSpecificParams::Solana { .. } => ChainFamily::Solana,
			ChainSpecificParams::Sui { .. } => ChainFamily::Sui,
			ChainSpecificParams::Polkadot { .. } => ChainFamily::Polkadot,
			ChainSpecificParams::Ton { .. } => ChainFamily::Ton,
			ChainSpecificParams::Ripple { .. } => ChainFamily::Ripple,
			ChainSpecificParams::Tron(_) => ChainFamily::Tron,
		}
	}

	/// Returns the account sequence or nonce carried by the bundle, if the
	/// family has one.
	pub fn sequence(&self) -> Option<u64> {
		match self {
			ChainSpecificParams::Ethereum { nonce, .. }
			| ChainSpecificParams::Polkadot { nonce, .. } => Some(*nonce),
			ChainSpecificParams::Cosmos { sequence, .. }
			| ChainSpecificParams::Thorchain { sequence, .. }
			| ChainSpecificParams::Ripple { sequence, .. } => Some(*sequence),
			ChainSpecificParams::Ton {
				sequence_number, ..
			} => Some(*sequence_number),
			_ => None,
		}
	}
}
