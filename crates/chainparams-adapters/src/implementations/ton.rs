//! TON adapter.

use crate::clients::TonClient;
use crate::{AdapterError, ChainAdapter};
use async_trait::async_trait;
use chainparams_types::{truncate_id, ChainFamily, ChainSpecificParams, TransactionIntent};
use std::sync::Arc;

/// Wallet state reported for addresses that have never been deployed.
pub const WALLET_STATE_UNINITIALIZED: &str = "uninit";

/// Resolves seqno and expiry, decides whether the message may bounce, and
/// finds the sender's jetton wallet for token transfers.
pub struct TonAdapter {
	client: Arc<dyn TonClient>,
}

impl TonAdapter {
	pub fn new(client: Arc<dyn TonClient>) -> Self {
		Self { client }
	}

	/// A message bounces only to an initialized wallet whose user-friendly
	/// address is in the bounceable form (leading `E`).
	async fn is_bounceable(&self, to: Option<&str>) -> Result<bool, AdapterError> {
		let Some(to) = to.filter(|to| !to.is_empty()) else {
			return Ok(false);
		};
		let state = self.client.wallet_state(to).await?;
		Ok(state != WALLET_STATE_UNINITIALIZED && to.starts_with('E'))
	}

	async fn jetton_address(&self, intent: &TransactionIntent) -> String {
		let master = intent.coin.contract_address.clone();
		if intent.coin.is_native_token {
			return master;
		}

		match self
			.client
			.jetton_wallet_address(&intent.coin.address, &master)
			.await
		{
			Ok(Some(wallet)) => wallet,
			Ok(None) => master,
			Err(e) => {
				tracing::warn!(
					owner = %truncate_id(&intent.coin.address),
					error = %e,
					"Jetton wallet lookup failed, using master address"
				);
				master
			},
		}
	}
}

#[async_trait]
impl ChainAdapter for TonAdapter {
	fn family(&self) -> ChainFamily {
		ChainFamily::Ton
	}

	async fn fetch_params(
		&self,
		intent: &TransactionIntent,
	) -> Result<ChainSpecificParams, AdapterError> {
		let (wallet, bounceable, jetton_address) = tokio::join!(
			self.client.wallet_info(&intent.coin.address),
			self.is_bounceable(intent.to_address.as_deref()),
			self.jetton_address(intent),
		);
		let (wallet, bounceable) = (wallet?, bounceable?);

		Ok(ChainSpecificParams::Ton {
			sequence_number: wallet.sequence_number,
			expire_at: wallet.expire_at,
			bounceable,
			send_max_amount: intent.send_max_amount,
			jetton_address,
			is_active_destination: !bounceable,
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::clients::{MockTonClient, TonWalletInfo};
	use crate::ClientError;
	use chainparams_types::{Chain, Coin};

	fn coin(native: bool) -> Coin {
		Coin {
			chain: Chain::Ton,
			ticker: if native { "TON".into() } else { "USDT".into() },
			address: "UQsender".into(),
			decimals: 9,
			contract_address: if native { String::new() } else { "EQmaster".into() },
			is_native_token: native,
			fee_default: String::new(),
		}
	}

	fn client(state: &'static str) -> MockTonClient {
		let mut client = MockTonClient::new();
		client.expect_wallet_info().returning(|_| {
			Ok(TonWalletInfo {
				sequence_number: 11,
				expire_at: 1_700_000_600,
			})
		});
		client
			.expect_wallet_state()
			.returning(move |_| Ok(state.to_string()));
		client
	}

	#[tokio::test]
	async fn test_bounceable_for_initialized_e_address() {
		let adapter = TonAdapter::new(Arc::new(client("active")));
		let params = adapter
			.fetch_params(&TransactionIntent::transfer(coin(true), "EQrecipient"))
			.await
			.unwrap();

		assert_eq!(
			params,
			ChainSpecificParams::Ton {
				sequence_number: 11,
				expire_at: 1_700_000_600,
				bounceable: true,
				send_max_amount: false,
				jetton_address: String::new(),
				is_active_destination: false,
			}
		);
	}

	#[tokio::test]
	async fn test_not_bounceable() {
		for (state, to) in [("uninit", "EQrecipient"), ("active", "UQrecipient")] {
			let adapter = TonAdapter::new(Arc::new(client(state)));
			let params = adapter
				.fetch_params(&TransactionIntent::transfer(coin(true), to))
				.await
				.unwrap();
			assert!(matches!(
				params,
				ChainSpecificParams::Ton { bounceable: false, is_active_destination: true, .. }
			));
		}
	}

	#[tokio::test]
	async fn test_jetton_wallet_resolution() {
		let mut resolved = client("active");
		resolved
			.expect_jetton_wallet_address()
			.withf(|owner, master| owner == "UQsender" && master == "EQmaster")
			.returning(|_, _| Ok(Some("EQjettonwallet".into())));
		let adapter = TonAdapter::new(Arc::new(resolved));
		let params = adapter
			.fetch_params(&TransactionIntent::transfer(coin(false), "UQrecipient"))
			.await
			.unwrap();
		assert!(matches!(
			params,
			ChainSpecificParams::Ton { ref jetton_address, .. } if jetton_address == "EQjettonwallet"
		));

		let mut failing = client("active");
		failing
			.expect_jetton_wallet_address()
			.returning(|_, _| Err(ClientError::Timeout));
		let adapter = TonAdapter::new(Arc::new(failing));
		let params = adapter
			.fetch_params(&TransactionIntent::transfer(coin(false), "UQrecipient"))
			.await
			.unwrap();
		assert!(matches!(
			params,
			ChainSpecificParams::Ton { ref jetton_address, .. } if jetton_address == "EQmaster"
		));
	}
}
