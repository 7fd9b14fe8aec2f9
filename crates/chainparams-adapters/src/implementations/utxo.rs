//! UTXO family adapter (Bitcoin, Litecoin, Dogecoin, Dash, Bitcoin Cash, Zcash).

use crate::clients::UtxoClient;
use crate::{AdapterError, ChainAdapter};
use async_trait::async_trait;
use chainparams_fees::normalize_utxo_fee;
use chainparams_types::{Chain, ChainFamily, ChainSpecificParams, TransactionIntent, U256};
use std::sync::Arc;

/// Resolves a per-byte fee rate.
///
/// The network quote is normalized by the fee policy, except for Dogecoin,
/// whose quote is scaled down by 10, and Zcash, which always uses the coin's
/// configured default fee. A caller-supplied byte fee wins over both.
pub struct UtxoAdapter {
	client: Arc<dyn UtxoClient>,
}

impl UtxoAdapter {
	pub fn new(client: Arc<dyn UtxoClient>) -> Self {
		Self { client }
	}

	async fn byte_fee(&self, intent: &TransactionIntent) -> Result<U256, AdapterError> {
		if let Some(byte_fee) = intent.byte_fee {
			return Ok(byte_fee);
		}

		match intent.chain() {
			Chain::Zcash => {
				let raw = intent.coin.fee_default.trim();
				let parsed = if raw.is_empty() {
					None
				} else {
					U256::from_str_radix(raw, 10).ok()
				};
				parsed.ok_or_else(|| {
					AdapterError::InvalidResponse(format!(
						"Invalid default fee '{}' for {}",
						raw,
						intent.chain()
					))
				})
			},
			Chain::Dogecoin => {
				let sats = self.client.sats_per_byte(Chain::Dogecoin).await?;
				Ok(sats / U256::from(10))
			},
			chain => {
				let sats = self.client.sats_per_byte(chain).await?;
				Ok(normalize_utxo_fee(sats))
			},
		}
	}
}

#[async_trait]
impl ChainAdapter for UtxoAdapter {
	fn family(&self) -> ChainFamily {
		ChainFamily::Utxo
	}

	async fn fetch_params(
		&self,
		intent: &TransactionIntent,
	) -> Result<ChainSpecificParams, AdapterError> {
		let byte_fee = self.byte_fee(intent).await?;
		Ok(ChainSpecificParams::Utxo {
			byte_fee,
			send_max_amount: intent.send_max_amount,
		})
	}
}
