//! Polkadot adapter.

use crate::clients::PolkadotClient;
use crate::{AdapterError, ChainAdapter};
use async_trait::async_trait;
use chainparams_types::{ChainFamily, ChainSpecificParams, TransactionIntent};
use std::sync::Arc;

/// Fetches runtime and block references together with a fee estimate for
/// the concrete transfer.
pub struct PolkadotAdapter {
	client: Arc<dyn PolkadotClient>,
}

impl PolkadotAdapter {
	pub fn new(client: Arc<dyn PolkadotClient>) -> Self {
		Self { client }
	}
}

#[async_trait]
impl ChainAdapter for PolkadotAdapter {
	fn family(&self) -> ChainFamily {
		ChainFamily::Polkadot
	}

	async fn fetch_params(
		&self,
		intent: &TransactionIntent,
	) -> Result<ChainSpecificParams, AdapterError> {
		let from = intent.from_address.as_str();
		let to = intent.to_address.as_deref().unwrap_or_default();

		let (info, gas) = tokio::try_join!(
			self.client.gas_info(from),
			self.client.dynamic_fee(
				from,
				to,
				intent.amount.unwrap_or_default(),
				intent.memo.clone()
			),
		)?;

		Ok(ChainSpecificParams::Polkadot {
			recent_block_hash: info.recent_block_hash,
			nonce: info.nonce,
			current_block_number: info.current_block_number,
			spec_version: info.spec_version,
			transaction_version: info.transaction_version,
			genesis_hash: info.genesis_hash,
			gas,
		})
	}
}
