//! Chain identifiers and the transaction-model family each chain belongs to.
//!
//! Every concrete chain maps to exactly one [`ChainFamily`]. The family picks
//! the chain adapter that resolves parameters for it and the
//! [`ChainSpecificParams`](crate::ChainSpecificParams) variant it produces.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Group of blockchains sharing one transaction and fee model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChainFamily {
	Utxo,
	Evm,
	Cosmos,
	Solana,
	Sui,
	Polkadot,
	Ton,
	Ripple,
	Tron,
	Cardano,
	ThorchainLike,
}

impl ChainFamily {
	/// Returns the string representation of the family.
	pub fn as_str(&self) -> &'static str {
		match self {
			ChainFamily::Utxo => "utxo",
			ChainFamily::Evm => "evm",
			ChainFamily::Cosmos => "cosmos",
			ChainFamily::Solana => "solana",
			ChainFamily::Sui => "sui",
			ChainFamily::Polkadot => "polkadot",
			ChainFamily::Ton => "ton",
			ChainFamily::Ripple => "ripple",
			ChainFamily::Tron => "tron",
			ChainFamily::Cardano => "cardano",
			ChainFamily::ThorchainLike => "thorchain_like",
		}
	}

	/// Whether confirmations on this family can be detected by a
	/// sequence-number advance of the sending account.
	pub fn supports_sequence_tracking(&self) -> bool {
		matches!(self, ChainFamily::Cosmos | ChainFamily::ThorchainLike)
	}
}

impl fmt::Display for ChainFamily {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// A concrete blockchain supported by the wallet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Chain {
	// UTXO
	Bitcoin,
	BitcoinCash,
	Litecoin,
	Dogecoin,
	Dash,
	Zcash,
	Cardano,
	// EVM
	Ethereum,
	EthereumSepolia,
	Avalanche,
	Bsc,
	Arbitrum,
	Base,
	Optimism,
	Polygon,
	PolygonV2,
	Blast,
	Cronos,
	Mantle,
	Hyperliquid,
	Sei,
	Zksync,
	// Cosmos SDK
	Gaia,
	Kujira,
	Osmosis,
	Terra,
	TerraClassic,
	Dydx,
	Noble,
	Akash,
	// THORChain relatives
	Thorchain,
	ThorchainChainnet,
	ThorchainStagenet,
	Mayachain,
	// Account-model chains with their own protocols
	Solana,
	Sui,
	Polkadot,
	Ton,
	Ripple,
	Tron,
}

impl Chain {
	/// Returns every supported chain.
	pub fn all() -> impl Iterator<Item = Self> {
		[
			Self::Bitcoin,
			Self::BitcoinCash,
			Self::Litecoin,
			Self::Dogecoin,
			Self::Dash,
			Self::Zcash,
			Self::Cardano,
			Self::Ethereum,
			Self::EthereumSepolia,
			Self::Avalanche,
			Self::Bsc,
			Self::Arbitrum,
			Self::Base,
			Self::Optimism,
			Self::Polygon,
			Self::PolygonV2,
			Self::Blast,
			Self::Cronos,
			Self::Mantle,
			Self::Hyperliquid,
			Self::Sei,
			Self::Zksync,
			Self::Gaia,
			Self::Kujira,
			Self::Osmosis,
			Self::Terra,
			Self::TerraClassic,
			Self::Dydx,
			Self::Noble,
			Self::Akash,
			Self::Thorchain,
			Self::ThorchainChainnet,
			Self::ThorchainStagenet,
			Self::Mayachain,
			Self::Solana,
			Self::Sui,
			Self::Polkadot,
			Self::Ton,
			Self::Ripple,
			Self::Tron,
		]
		.into_iter()
	}

	/// Returns the configuration name of the chain.
	pub fn as_str(&self) -> &'static str {
		match self {
			Chain::Bitcoin => "bitcoin",
			Chain::BitcoinCash => "bitcoin-cash",
			Chain::Litecoin => "litecoin",
			Chain::Dogecoin => "dogecoin",
			Chain::Dash => "dash",
			Chain::Zcash => "zcash",
			Chain::Cardano => "cardano",
			Chain::Ethereum => "ethereum",
			Chain::EthereumSepolia => "ethereum-sepolia",
			Chain::Avalanche => "avalanche",
			Chain::Bsc => "bsc",
			Chain::Arbitrum => "arbitrum",
			Chain::Base => "base",
			Chain::Optimism => "optimism",
			Chain::Polygon => "polygon",
			Chain::PolygonV2 => "polygon-v2",
			Chain::Blast => "blast",
			Chain::Cronos => "cronos",
			Chain::Mantle => "mantle",
			Chain::Hyperliquid => "hyperliquid",
			Chain::Sei => "sei",
			Chain::Zksync => "zksync",
			Chain::Gaia => "gaia",
			Chain::Kujira => "kujira",
			Chain::Osmosis => "osmosis",
			Chain::Terra => "terra",
			Chain::TerraClassic => "terra-classic",
			Chain::Dydx => "dydx",
			Chain::Noble => "noble",
			Chain::Akash => "akash",
			Chain::Thorchain => "thorchain",
			Chain::ThorchainChainnet => "thorchain-chainnet",
			Chain::ThorchainStagenet => "thorchain-stagenet",
			Chain::Mayachain => "mayachain",
			Chain::Solana => "solana",
			Chain::Sui => "sui",
			Chain::Polkadot => "polkadot",
			Chain::Ton => "ton",
			Chain::Ripple => "ripple",
			Chain::Tron => "tron",
		}
	}

	/// Returns the family that determines how parameters are resolved.
	pub fn family(&self) -> ChainFamily {
		match self {
			Chain::Bitcoin
			| Chain::BitcoinCash
			| Chain::Litecoin
			| Chain::Dogecoin
			| Chain::Dash
			| Chain::Zcash => ChainFamily::Utxo,
			Chain::Cardano => ChainFamily::Cardano,
			Chain::Ethereum
			| Chain::EthereumSepolia
			| Chain::Avalanche
			| Chain::Bsc
			| Chain::Arbitrum
			| Chain::Base
			| Chain::Optimism
			| Chain::Polygon
			| Chain::PolygonV2
			| Chain::Blast
			| Chain::Cronos
			| Chain::Mantle
			| Chain::Hyperliquid
			| Chain::Sei
			| Chain::Zksync => ChainFamily::Evm,
			Chain::Gaia
			| Chain::Kujira
			| Chain::Osmosis
			| Chain::Terra
			| Chain::TerraClassic
			| Chain::Dydx
			| Chain::Noble
			| Chain::Akash => ChainFamily::Cosmos,
			Chain::Thorchain
			| Chain::ThorchainChainnet
			| Chain::ThorchainStagenet
			| Chain::Mayachain => ChainFamily::ThorchainLike,
			Chain::Solana => ChainFamily::Solana,
			Chain::Sui => ChainFamily::Sui,
			Chain::Polkadot => ChainFamily::Polkadot,
			Chain::Ton => ChainFamily::Ton,
			Chain::Ripple => ChainFamily::Ripple,
			Chain::Tron => ChainFamily::Tron,
		}
	}

	/// Whether broadcast transactions on this chain can be tracked until
	/// confirmation by the pending-transaction tracker.
	pub fn supports_pending_transactions(&self) -> bool {
		self.family().supports_sequence_tracking()
	}
}

impl fmt::Display for Chain {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Error returned when a chain name is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown chain: {0}")]
pub struct UnknownChain(pub String);

impl FromStr for Chain {
	type Err = UnknownChain;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Chain::all()
			.find(|chain| chain.as_str() == s)
			.ok_or_else(|| UnknownChain(s.to_string()))
	}
}
