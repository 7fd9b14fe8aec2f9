//! Cosmos-SDK family adapter.

use crate::clients::CosmosClient;
use crate::{parse_account_number, parse_sequence, AdapterError, ChainAdapter, SequenceSource};
use async_trait::async_trait;
use chainparams_types::{
	current_timestamp_nanos, truncate_id, Chain, ChainFamily, ChainSpecificParams, IbcDenomTrace,
	TransactionIntent, TransactionType,
};
use std::collections::HashMap;
use std::sync::Arc;

/// How far in the future IBC transfers time out.
pub const IBC_TIMEOUT_NANOS: u64 = 10 * 60 * 1_000_000_000;

/// Fixed gas units per chain.
pub fn gas_for(chain: Chain) -> u64 {
	match chain {
		Chain::TerraClassic => 100_000_000,
		Chain::Dydx => 2_500_000_000_000_000,
		Chain::Noble => 20_000,
		Chain::Akash => 3_000,
		Chain::Osmosis => 25_000,
		_ => 7_500,
	}
}

/// Chains whose IBC transfers carry a denom trace and timeout.
fn supports_ibc_timeout(chain: Chain) -> bool {
	matches!(
		chain,
		Chain::Gaia | Chain::Kujira | Chain::Osmosis | Chain::Terra
	)
}

/// Resolves account number, sequence, gas and IBC data for Cosmos-SDK chains.
pub struct CosmosAdapter {
	clients: HashMap<Chain, Arc<dyn CosmosClient>>,
}

impl CosmosAdapter {
	pub fn new(clients: HashMap<Chain, Arc<dyn CosmosClient>>) -> Self {
		Self { clients }
	}

	fn client(&self, chain: Chain) -> Result<&Arc<dyn CosmosClient>, AdapterError> {
		self.clients
			.get(&chain)
			.ok_or(AdapterError::UnsupportedChain(chain))
	}

	/// Denom trace (best effort) plus the `"{height}_{timeoutNanos}"` marker.
	async fn ibc_denom_trace(
		&self,
		client: &dyn CosmosClient,
		intent: &TransactionIntent,
	) -> Result<IbcDenomTrace, AdapterError> {
		let denom = &intent.coin.contract_address;
		let hash = denom
			.split_once("ibc/")
			.map(|(_, hash)| hash)
			.unwrap_or(denom.as_str());
		let (found, latest_block) = tokio::join!(
			async {
				if intent.coin.is_ibc_denom() {
					Some(client.denom_trace(hash).await)
				} else {
					None
				}
			},
			client.latest_block_height(),
		);

		let mut trace = IbcDenomTrace::default();
		match found {
			Some(Ok(found)) => {
				trace.path = found.path;
				trace.base_denom = found.base_denom;
			},
			Some(Err(e)) => {
				tracing::warn!(
					chain = %intent.chain(),
					denom = %denom,
					error = %e,
					"Denom trace lookup failed, continuing without it"
				);
			},
			None => {},
		}

		let latest_block = latest_block?;
		let timeout = current_timestamp_nanos().saturating_add(IBC_TIMEOUT_NANOS);
		trace.height = format!("{}_{}", latest_block, timeout);

		Ok(trace)
	}
}

#[async_trait]
impl ChainAdapter for CosmosAdapter {
	fn family(&self) -> ChainFamily {
		ChainFamily::Cosmos
	}

	async fn fetch_params(
		&self,
		intent: &TransactionIntent,
	) -> Result<ChainSpecificParams, AdapterError> {
		let chain = intent.chain();
		let client = self.client(chain)?;

		let wants_ibc = intent.transaction_type == TransactionType::IbcTransfer
			|| intent.coin.is_ibc_denom();
		let (account, ibc_denom_trace) = tokio::try_join!(
			async {
				client
					.account(&intent.from_address)
					.await
					.map_err(AdapterError::from)
			},
			async {
				if wants_ibc && supports_ibc_timeout(chain) {
					self.ibc_denom_trace(client.as_ref(), intent)
						.await
						.map(Some)
				} else {
					Ok(None)
				}
			},
		)?;
		let account = account.ok_or(AdapterError::FailToGetAccountNumber)?;
		let account_number = parse_account_number(&account.account_number)?;
		let sequence = parse_sequence(&account.sequence)?;

		Ok(ChainSpecificParams::Cosmos {
			account_number,
			sequence,
			gas: gas_for(chain),
			transaction_type: intent.transaction_type,
			ibc_denom_trace,
		})
	}
}

#[async_trait]
impl SequenceSource for CosmosAdapter {
	async fn fetch_sequence(&self, chain: Chain, address: &str) -> Result<u64, AdapterError> {
		let account = self
			.client(chain)?
			.account(address)
			.await?
			.ok_or(AdapterError::FailToGetSequenceNumber)?;
		let sequence = parse_sequence(&account.sequence)?;
		tracing::trace!(chain = %chain, address = %truncate_id(address), sequence, "Fetched sequence");
		Ok(sequence)
	}
}
