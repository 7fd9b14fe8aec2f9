//! Sui adapter.

use crate::clients::{SuiClient, SuiTransferSimulation};
use crate::retry::{retry_with_backoff, DEFAULT_MAX_RETRIES};
use crate::{AdapterError, ChainAdapter};
use async_trait::async_trait;
use chainparams_types::{ChainFamily, ChainSpecificParams, TransactionIntent, U256};
use std::sync::Arc;

/// Budget used when no dry run is possible.
pub const DEFAULT_GAS_BUDGET: u64 = 3_000_000;
/// Minimum budget accepted by the network.
pub const MIN_GAS_BUDGET: u64 = 2_000;

/// Adds the 15% safety margin to a gas cost.
fn with_margin(cost: u64) -> u64 {
	cost.saturating_mul(115) / 100
}

pub struct SuiAdapter {
	client: Arc<dyn SuiClient>,
}

impl SuiAdapter {
	pub fn new(client: Arc<dyn SuiClient>) -> Self {
		Self { client }
	}
}

#[async_trait]
impl ChainAdapter for SuiAdapter {
	fn family(&self) -> ChainFamily {
		ChainFamily::Sui
	}

	async fn fetch_params(
		&self,
		intent: &TransactionIntent,
	) -> Result<ChainSpecificParams, AdapterError> {
		let owner = intent.from_address.as_str();
		let (reference_gas_price, coins) = tokio::try_join!(
			self.client.reference_gas_price(),
			retry_with_backoff("sui_all_coins", DEFAULT_MAX_RETRIES, || {
				self.client.all_coins(owner)
			}),
		)?;

		let fallback = with_margin(DEFAULT_GAS_BUDGET);
		let gas_budget = match intent.amount.filter(|amount| *amount > U256::ZERO) {
			Some(amount) => {
				let simulation = SuiTransferSimulation {
					coin: intent.coin.clone(),
					to_address: intent
						.to_address
						.clone()
						.unwrap_or_else(|| intent.coin.address.clone()),
					amount,
					reference_gas_price,
					coins: coins.clone(),
					memo: intent.memo.clone(),
				};
				match self.client.dry_run_transfer(simulation).await {
					Ok(cost) => with_margin(cost.computation.saturating_add(cost.storage))
						.max(MIN_GAS_BUDGET),
					Err(e) => {
						tracing::warn!(error = %e, "Sui dry run failed, using default gas budget");
						fallback
					},
				}
			},
			None => fallback,
		};

		Ok(ChainSpecificParams::Sui {
			reference_gas_price,
			coins,
			gas_budget,
		})
	}
}
