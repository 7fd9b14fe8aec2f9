//! Read-only coin model.
//!
//! The wallet owns coins; the engine only reads the handful of fields that
//! parameter resolution depends on.

use crate::{Chain, ChainFamily};
use serde::{Deserialize, Serialize};

/// A coin held by the wallet on a specific chain.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coin {
	/// Chain the coin lives on.
	pub chain: Chain,
	/// Ticker symbol, e.g. "ETH" or "USDC".
	pub ticker: String,
	/// Wallet address holding the coin.
	pub address: String,
	/// Number of decimal places.
	pub decimals: u8,
	/// Token contract, mint, denom or jetton master. Empty for native coins.
	#[serde(default)]
	pub contract_address: String,
	/// Whether this is the chain's native coin.
	pub is_native_token: bool,
	/// User-configured default fee as a raw decimal string.
	#[serde(default)]
	pub fee_default: String,
}

impl Coin {
	/// Returns the family of the coin's chain.
	pub fn chain_family(&self) -> ChainFamily {
		self.chain.family()
	}

	/// Whether the coin's on-chain denom identifies it as an IBC voucher.
	pub fn is_ibc_denom(&self) -> bool {
		self.contract_address.contains("ibc/")
	}
}
