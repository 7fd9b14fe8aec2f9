//! EVM family adapter, including the zkSync fee-estimation variant.

use crate::clients::EvmClient;
use crate::{AdapterError, ChainAdapter};
use async_trait::async_trait;
use chainparams_fees::{clamp_priority_fee, floor_gas_limit, max_fee_per_gas, PriorityFeeBuckets};
use chainparams_types::{
	truncate_id, Action, Chain, ChainFamily, ChainSpecificParams, TransactionIntent, U256,
};
use std::collections::HashMap;
use std::sync::Arc;

/// Gas units of a plain native transfer.
pub const DEFAULT_ETH_TRANSFER_GAS_UNITS: u64 = 23_000;
/// Gas units of an ERC20 `transfer`.
pub const DEFAULT_ERC20_TRANSFER_GAS_UNITS: u64 = 120_000;
/// Gas units assumed for swaps.
pub const DEFAULT_SWAP_GAS_UNITS: u64 = 600_000;
/// Mantle measures gas differently and needs a far larger swap limit.
pub const DEFAULT_MANTLE_SWAP_GAS_UNITS: u64 = 3_000_000_000;

const ZERO_ADDRESS: &str = "0x0000000000000000000000000000000000000000";
const ZK_DEFAULT_MEMO: &str = "0xffffffff";

/// One EVM chain endpoint together with its default priority fee.
#[derive(Clone)]
pub struct EvmNetwork {
	pub client: Arc<dyn EvmClient>,
	/// Floor for the selected priority fee, in wei.
	pub default_priority_fee: U256,
}

/// Resolves EIP-1559 fees, nonce and gas limit for EVM chains.
pub struct EvmAdapter {
	networks: HashMap<Chain, EvmNetwork>,
}

impl EvmAdapter {
	pub fn new(networks: HashMap<Chain, EvmNetwork>) -> Self {
		Self { networks }
	}

	fn network(&self, chain: Chain) -> Result<&EvmNetwork, AdapterError> {
		self.networks
			.get(&chain)
			.ok_or(AdapterError::UnsupportedChain(chain))
	}

	async fn fetch_zksync(
		&self,
		network: &EvmNetwork,
		intent: &TransactionIntent,
	) -> Result<ChainSpecificParams, AdapterError> {
		let memo = intent.memo.as_deref().unwrap_or(ZK_DEFAULT_MEMO);
		let data = format!("0x{}", hex::encode(memo.as_bytes()));

		let (nonce, estimate) = tokio::try_join!(
			network.client.nonce(&intent.from_address),
			network
				.client
				.zk_estimate_fee(&intent.from_address, ZERO_ADDRESS, data),
		)?;

		Ok(ChainSpecificParams::Ethereum {
			max_fee_per_gas_wei: estimate.max_fee_per_gas,
			priority_fee_wei: clamp_priority_fee(
				estimate.max_priority_fee_per_gas,
				estimate.max_fee_per_gas,
			),
			nonce,
			gas_limit: estimate.gas_limit,
		})
	}

	async fn gas_limit(&self, network: &EvmNetwork, intent: &TransactionIntent) -> U256 {
		if intent.action == Action::Swap {
			if let Some(limit) = intent.gas_limit {
				return limit;
			}
			return match intent.chain() {
				Chain::Mantle => U256::from(DEFAULT_MANTLE_SWAP_GAS_UNITS),
				_ => U256::from(DEFAULT_SWAP_GAS_UNITS),
			};
		}

		let from = intent.from_address.as_str();
		let to = intent.to_address.as_deref().unwrap_or(from);
		let amount = intent.amount.unwrap_or_default();

		let (estimate, default_units) = if intent.coin.is_native_token {
			(
				network
					.client
					.estimate_transfer_gas(from, to, amount, intent.memo.clone())
					.await,
				DEFAULT_ETH_TRANSFER_GAS_UNITS,
			)
		} else {
			(
				network
					.client
					.estimate_erc20_transfer_gas(from, &intent.coin.contract_address, to, amount)
					.await,
				DEFAULT_ERC20_TRANSFER_GAS_UNITS,
			)
		};

		let estimate = estimate.unwrap_or_else(|e| {
			tracing::warn!(
				chain = %intent.chain(),
				from = %truncate_id(from),
				error = %e,
				"Gas estimation failed, using default gas units"
			);
			U256::ZERO
		});

		floor_gas_limit(estimate, U256::from(default_units), intent.gas_limit)
	}
}

#[async_trait]
impl ChainAdapter for EvmAdapter {
	fn family(&self) -> ChainFamily {
		ChainFamily::Evm
	}

	async fn fetch_params(
		&self,
		intent: &TransactionIntent,
	) -> Result<ChainSpecificParams, AdapterError> {
		let network = self.network(intent.chain())?;

		if intent.chain() == Chain::Zksync {
			return self.fetch_zksync(network, intent).await;
		}

		let client = &network.client;
		let (base_fee, history, nonce, gas_limit) = tokio::join!(
			client.base_fee(),
			client.priority_fee_history(),
			client.nonce(&intent.from_address),
			self.gas_limit(network, intent),
		);
		let (base_fee, history, nonce) = (base_fee?, history?, nonce?);

		let buckets = match PriorityFeeBuckets::from_samples(&history) {
			Some(buckets) => buckets,
			None => PriorityFeeBuckets::uniform(client.max_priority_fee().await?),
		};
		let selected = buckets.select(intent.fee_mode);

		Ok(ChainSpecificParams::Ethereum {
			max_fee_per_gas_wei: max_fee_per_gas(base_fee, selected, network.default_priority_fee),
			priority_fee_wei: selected.max(network.default_priority_fee),
			nonce,
			gas_limit,
		})
	}
}
