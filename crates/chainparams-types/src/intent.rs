//! Transfer and swap intents.
//!
//! An intent is everything the caller knows about the transaction it wants
//! to build. It is immutable for the duration of one resolution, and its
//! fingerprint fields form the [`CacheKey`] used by the parameter cache.

use crate::{Chain, Coin, U256};
use serde::{Deserialize, Serialize};
use std::fmt;

/// What the transaction is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
	Transfer,
	Swap,
}

impl Action {
	pub fn as_str(&self) -> &'static str {
		match self {
			Action::Transfer => "transfer",
			Action::Swap => "swap",
		}
	}
}

/// User-selected speed/cost trade-off.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeeMode {
	Lowest,
	#[default]
	Normal,
	Fastest,
}

impl FeeMode {
	pub fn as_str(&self) -> &'static str {
		match self {
			FeeMode::Lowest => "lowest",
			FeeMode::Normal => "normal",
			FeeMode::Fastest => "fastest",
		}
	}
}

/// Chain-level transaction kind, mostly relevant to Cosmos-SDK chains.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
	#[default]
	Unspecified,
	Vote,
	Proposal,
	IbcTransfer,
	ThorMerge,
	ThorUnmerge,
	GenericContract,
}

impl TransactionType {
	pub fn as_str(&self) -> &'static str {
		match self {
			TransactionType::Unspecified => "unspecified",
			TransactionType::Vote => "vote",
			TransactionType::Proposal => "proposal",
			TransactionType::IbcTransfer => "ibc_transfer",
			TransactionType::ThorMerge => "thor_merge",
			TransactionType::ThorUnmerge => "thor_unmerge",
			TransactionType::GenericContract => "generic_contract",
		}
	}
}

/// An intended transfer or swap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionIntent {
	pub coin: Coin,
	pub action: Action,
	#[serde(default)]
	pub send_max_amount: bool,
	#[serde(default)]
	pub is_deposit: bool,
	#[serde(default)]
	pub transaction_type: TransactionType,
	pub from_address: String,
	#[serde(default)]
	pub to_address: Option<String>,
	/// Gas limit supplied by the caller; acts as a floor for EVM estimates.
	#[serde(default)]
	pub gas_limit: Option<U256>,
	/// Byte fee supplied by the caller; overrides the UTXO network quote.
	#[serde(default)]
	pub byte_fee: Option<U256>,
	#[serde(default)]
	pub fee_mode: FeeMode,
	#[serde(default)]
	pub memo: Option<String>,
	/// Raw amount, used only for gas and fee simulation.
	#[serde(default)]
	pub amount: Option<U256>,
}

impl TransactionIntent {
	/// Creates a transfer intent from the coin's own address.
	pub fn transfer(coin: Coin, to_address: impl Into<String>) -> Self {
		let from_address = coin.address.clone();
		Self {
			coin,
			action: Action::Transfer,
			send_max_amount: false,
			is_deposit: false,
			transaction_type: TransactionType::Unspecified,
			from_address,
			to_address: Some(to_address.into()),
			gas_limit: None,
			byte_fee: None,
			fee_mode: FeeMode::Normal,
			memo: None,
			amount: None,
		}
	}

	/// Creates a swap intent. Swaps have no recipient and always resolve
	/// with the fastest fee mode.
	pub fn swap(coin: Coin, is_deposit: bool) -> Self {
		let from_address = coin.address.clone();
		Self {
			coin,
			action: Action::Swap,
			send_max_amount: false,
			is_deposit,
			transaction_type: TransactionType::Unspecified,
			from_address,
			to_address: None,
			gas_limit: None,
			byte_fee: None,
			fee_mode: FeeMode::Fastest,
			memo: None,
			amount: None,
		}
	}

	pub fn with_fee_mode(mut self, fee_mode: FeeMode) -> Self {
		self.fee_mode = fee_mode;
		self
	}

	pub fn with_send_max_amount(mut self, send_max_amount: bool) -> Self {
		self.send_max_amount = send_max_amount;
		self
	}

	pub fn with_transaction_type(mut self, transaction_type: TransactionType) -> Self {
		self.transaction_type = transaction_type;
		self
	}

	pub fn with_memo(mut self, memo: impl Into<String>) -> Self {
		self.memo = Some(memo.into());
		self
	}

	pub fn with_amount(mut self, amount: U256) -> Self {
		self.amount = Some(amount);
		self
	}

	pub fn with_gas_limit(mut self, gas_limit: U256) -> Self {
		self.gas_limit = Some(gas_limit);
		self
	}

	/// Chain the intent resolves on.
	pub fn chain(&self) -> Chain {
		self.coin.chain
	}

	/// Builds the cache fingerprint of this intent.
	///
	/// Free-form strings are length-prefixed so that no choice of address,
	/// ticker or memo can make two different intents render the same key.
	pub fn cache_key(&self) -> CacheKey {
		fn field(value: &str) -> String {
			format!("{}:{}", value.len(), value)
		}
		fn optional(value: Option<&str>) -> String {
			value.map(field).unwrap_or_else(|| "-".to_string())
		}

		CacheKey(format!(
			"{}|{}|{}|{}|{}|{}|{}|{}|{}|{}|{}",
			self.coin.chain.as_str(),
			field(&self.coin.ticker),
			field(&self.coin.contract_address),
			self.action.as_str(),
			self.send_max_amount,
			self.is_deposit,
			self.transaction_type.as_str(),
			field(&self.from_address),
			optional(self.to_address.as_deref()),
			optional(self.memo.as_deref()),
			self.fee_mode.as_str(),
		))
	}
}

/// Deterministic fingerprint of an intent.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CacheKey(pub String);

impl CacheKey {
	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl fmt::Display for CacheKey {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn eth() -> Coin {
		Coin {
			chain: Chain::Ethereum,
			ticker: "ETH".into(),
			address: "0xsender".into(),
			decimals: 18,
			contract_address: String::new(),
			is_native_token: true,
			fee_default: "23000".into(),
		}
	}

	fn base_intent() -> TransactionIntent {
		TransactionIntent::transfer(eth(), "0xrecipient")
	}

	#[test]
	fn test_identical_intents_share_key() {
		assert_eq!(base_intent().cache_key(), base_intent().cache_key());
	}

	#[test]
	fn test_single_field_changes_change_key() {
		let base = base_intent().cache_key();

		let mut on_other_chain = base_intent();
		on_other_chain.coin.chain = Chain::Arbitrum;

		let mut as_swap = base_intent();
		as_swap.action = Action::Swap;

		let variants = vec![
			on_other_chain,
			as_swap,
			base_intent().with_send_max_amount(true),
			TransactionIntent {
				is_deposit: true,
				..base_intent()
			},
			base_intent().with_transaction_type(TransactionType::IbcTransfer),
			TransactionIntent {
				from_address: "0xother".into(),
				..base_intent()
			},
			TransactionIntent {
				to_address: None,
				..base_intent()
			},
			TransactionIntent {
				to_address: Some("0xsomeone-else".into()),
				..base_intent()
			},
			base_intent().with_fee_mode(FeeMode::Fastest),
			base_intent().with_fee_mode(FeeMode::Lowest),
		];

		for variant in variants {
			assert_ne!(variant.cache_key(), base, "collision for {:?}", variant);
		}
	}

	#[test]
	fn test_separator_in_address_cannot_forge_key() {
		let mut left = base_intent();
		left.from_address = "a|b".into();
		left.to_address = Some("c".into());

		let mut right = base_intent();
		right.from_address = "a".into();
		right.to_address = Some("b|c".into());

		assert_ne!(left.cache_key(), right.cache_key());
	}

	#[test]
	fn test_empty_recipient_differs_from_missing_recipient() {
		let with_empty = TransactionIntent {
			to_address: Some(String::new()),
			..base_intent()
		};
		let without = TransactionIntent {
			to_address: None,
			..base_intent()
		};
		assert_ne!(with_empty.cache_key(), without.cache_key());
	}

	#[test]
	fn test_swap_defaults() {
		let swap = TransactionIntent::swap(eth(), true);
		assert_eq!(swap.action, Action::Swap);
		assert_eq!(swap.fee_mode, FeeMode::Fastest);
		assert!(swap.to_address.is_none());
		assert!(swap.is_deposit);
		assert_eq!(swap.from_address, "0xsender");
	}
}
