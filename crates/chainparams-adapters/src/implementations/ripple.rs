//! Ripple adapter.

use crate::clients::RippleClient;
use crate::{AdapterError, ChainAdapter};
use async_trait::async_trait;
use chainparams_types::{ChainFamily, ChainSpecificParams, TransactionIntent};
use std::sync::Arc;

/// Fixed fee in drops.
pub const RIPPLE_GAS_DROPS: u64 = 180_000;
/// Ledgers added to the current index so that every signer has time to sign.
pub const LAST_LEDGER_MARGIN: u64 = 60;

pub struct RippleAdapter {
	client: Arc<dyn RippleClient>,
}

impl RippleAdapter {
	pub fn new(client: Arc<dyn RippleClient>) -> Self {
		Self { client }
	}
}

#[async_trait]
impl ChainAdapter for RippleAdapter {
	fn family(&self) -> ChainFamily {
		ChainFamily::Ripple
	}

	async fn fetch_params(
		&self,
		intent: &TransactionIntent,
	) -> Result<ChainSpecificParams, AdapterError> {
		let info = self
			.client
			.account_info(&intent.from_address)
			.await?
			.ok_or(AdapterError::FailToGetSequenceNumber)?;
		let sequence = info.sequence.ok_or(AdapterError::FailToGetSequenceNumber)?;
		let ledger = info.ledger_current_index.ok_or_else(|| {
			AdapterError::InvalidResponse("account_info without ledger_current_index".into())
		})?;

		Ok(ChainSpecificParams::Ripple {
			sequence,
			gas: RIPPLE_GAS_DROPS,
			last_ledger_sequence: ledger.saturating_add(LAST_LEDGER_MARGIN),
		})
	}
}
