//! Cardano adapter.

use crate::clients::CardanoClient;
use crate::{AdapterError, ChainAdapter};
use async_trait::async_trait;
use chainparams_types::{ChainFamily, ChainSpecificParams, TransactionIntent};
use std::sync::Arc;

/// Fixed fee estimate in lovelace.
pub const ESTIMATED_FEE_LOVELACE: u64 = 180_000;
/// Slots added to the current slot to form the transaction TTL.
pub const TTL_SLOT_OFFSET: u64 = 720;

pub struct CardanoAdapter {
	client: Arc<dyn CardanoClient>,
}

impl CardanoAdapter {
	pub fn new(client: Arc<dyn CardanoClient>) -> Self {
		Self { client }
	}
}

#[async_trait]
impl ChainAdapter for CardanoAdapter {
	fn family(&self) -> ChainFamily {
		ChainFamily::Cardano
	}

	async fn fetch_params(
		&self,
		intent: &TransactionIntent,
	) -> Result<ChainSpecificParams, AdapterError> {
		let slot = self.client.current_slot().await?;
		Ok(ChainSpecificParams::Cardano {
			byte_fee: ESTIMATED_FEE_LOVELACE,
			send_max_amount: intent.send_max_amount,
			ttl: slot.saturating_add(TTL_SLOT_OFFSET),
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::clients::MockCardanoClient;
	use chainparams_types::{Chain, Coin};

	#[tokio::test]
	async fn test_ttl_from_current_slot() {
		let mut client = MockCardanoClient::new();
		client.expect_current_slot().returning(|| Ok(1_000));

		let adapter = CardanoAdapter::new(Arc::new(client));
		let intent = TransactionIntent::transfer(
			Coin {
				chain: Chain::Cardano,
				ticker: "ADA".into(),
				address: "addr1sender".into(),
				decimals: 6,
				contract_address: String::new(),
				is_native_token: true,
				fee_default: String::new(),
			},
			"addr1recipient",
		);

		let params = adapter.fetch_params(&intent).await.unwrap();
		assert_eq!(
			params,
			ChainSpecificParams::Cardano {
				byte_fee: 180_000,
				send_max_amount: false,
				ttl: 1_720,
			}
		);
	}
}
