//! Tron adapter. The network client already returns the complete bundle.

use crate::clients::TronClient;
use crate::{AdapterError, ChainAdapter};
use async_trait::async_trait;
use chainparams_types::{ChainFamily, ChainSpecificParams, TransactionIntent};
use std::sync::Arc;

pub struct TronAdapter {
	client: Arc<dyn TronClient>,
}

impl TronAdapter {
	pub fn new(client: Arc<dyn TronClient>) -> Self {
		Self { client }
	}
}

#[async_trait]
impl ChainAdapter for TronAdapter {
	fn family(&self) -> ChainFamily {
		ChainFamily::Tron
	}

	async fn fetch_params(
		&self,
		intent: &TransactionIntent,
	) -> Result<ChainSpecificParams, AdapterError> {
		let info = self
			.client
			.block_info(&intent.coin, intent.to_address.clone(), intent.memo.clone())
			.await?;
		Ok(ChainSpecificParams::Tron(info))
	}
}
