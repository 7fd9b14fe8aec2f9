//! THORChain-like adapter (THORChain, its stagenet and Mayachain).

use crate::clients::ThorchainClient;
use crate::{parse_account_number, parse_sequence, AdapterError, ChainAdapter, SequenceSource};
use async_trait::async_trait;
use chainparams_types::{Chain, ChainFamily, ChainSpecificParams, TransactionIntent};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::OnceCell;

struct ThorchainNode {
	client: Arc<dyn ThorchainClient>,
	/// Resolved once per process; it never changes for a running network.
	chain_id: OnceCell<String>,
}

pub struct ThorchainAdapter {
	nodes: HashMap<Chain, ThorchainNode>,
}

impl ThorchainAdapter {
	pub fn new(clients: HashMap<Chain, Arc<dyn ThorchainClient>>) -> Self {
		let nodes = clients
			.into_iter()
			.map(|(chain, client)| {
				(
					chain,
					ThorchainNode {
						client,
						chain_id: OnceCell::new(),
					},
				)
			})
			.collect();
		Self { nodes }
	}

	fn node(&self, chain: Chain) -> Result<&ThorchainNode, AdapterError> {
		self.nodes
			.get(&chain)
			.ok_or(AdapterError::UnsupportedChain(chain))
	}

	/// Network identifier of `chain`, fetched on first use.
	pub async fn chain_id(&self, chain: Chain) -> Result<String, AdapterError> {
		let node = self.node(chain)?;
		let id = node
			.chain_id
			.get_or_try_init(|| async {
				let id = node.client.network_chain_id().await?;
				tracing::info!(chain = %chain, chain_id = %id, "Resolved network chain id");
				Ok::<_, AdapterError>(id)
			})
			.await?;
		Ok(id.clone())
	}
}

#[async_trait]
impl ChainAdapter for ThorchainAdapter {
	fn family(&self) -> ChainFamily {
		ChainFamily::ThorchainLike
	}

	async fn fetch_params(
		&self,
		intent: &TransactionIntent,
	) -> Result<ChainSpecificParams, AdapterError> {
		let chain = intent.chain();
		let node = self.node(chain)?;
		self.chain_id(chain).await?;

		let (account, fee) = tokio::try_join!(
			node.client.account(&intent.from_address),
			node.client.native_fee(),
		)?;
		let account = account.ok_or(AdapterError::FailToGetAccountNumber)?;

		Ok(ChainSpecificParams::Thorchain {
			account_number: parse_account_number(&account.account_number)?,
			sequence: parse_sequence(&account.sequence)?,
			fee,
			is_deposit: intent.is_deposit,
			transaction_type: intent.transaction_type,
		})
	}
}

#[async_trait]
impl SequenceSource for ThorchainAdapter {
	async fn fetch_sequence(&self, chain: Chain, address: &str) -> Result<u64, AdapterError> {
		let account = self
			.node(chain)?
			.client
			.account(address)
			.await?
			.ok_or(AdapterError::FailToGetSequenceNumber)?;
		parse_sequence(&account.sequence)
	}
}
