//! EVM JSON-RPC client backed by an Alloy HTTP provider.

use crate::clients::{EvmClient, ZkFeeEstimate};
use crate::ClientError;
use alloy_primitives::{Address, Bytes, U256};
use alloy_provider::{Provider, ProviderBuilder, RootProvider};
use alloy_rpc_types::{BlockNumberOrTag, BlockTransactionsKind, TransactionInput, TransactionRequest};
use alloy_sol_types::{sol, SolCall};
use alloy_transport_http::Http;
use async_trait::async_trait;
use serde::Deserialize;
use std::future::{Future, IntoFuture};
use std::time::Duration;

sol! {
	function transfer(address to, uint256 amount) external returns (bool);
}

/// Blocks covered by the priority-fee history.
const FEE_HISTORY_BLOCKS: u64 = 10;
/// Reward percentile sampled in every block.
const FEE_HISTORY_PERCENTILE: f64 = 5.0;

/// `zks_estimateFee` response.
#[derive(Debug, Deserialize)]
struct ZksFeeResponse {
	gas_limit: U256,
	gas_per_pubdata_limit: U256,
	max_fee_per_gas: U256,
	max_priority_fee_per_gas: U256,
}

impl From<ZksFeeResponse> for ZkFeeEstimate {
	fn from(resp: ZksFeeResponse) -> Self {
		Self {
			gas_limit: resp.gas_limit,
			gas_per_pubdata_limit: resp.gas_per_pubdata_limit,
			max_fee_per_gas: resp.max_fee_per_gas,
			max_priority_fee_per_gas: resp.max_priority_fee_per_gas,
		}
	}
}

/// First reward of every block in a fee-history response.
fn reward_samples(reward: Option<Vec<Vec<u128>>>) -> Vec<U256> {
	reward
		.unwrap_or_default()
		.into_iter()
		.filter_map(|block| block.first().copied())
		.map(U256::from)
		.collect()
}

fn parse_address(value: &str) -> Result<Address, ClientError> {
	value
		.parse()
		.map_err(|e| ClientError::Decode(format!("Invalid address {}: {}", value, e)))
}

/// EVM client for one chain.
pub struct AlloyEvmClient {
	provider: RootProvider<Http<reqwest::Client>>,
	timeout: Duration,
}

impl AlloyEvmClient {
	/// Creates a client for `rpc_url`. Every call is bounded by `timeout`.
	pub fn new(rpc_url: &str, timeout: Duration) -> Result<Self, ClientError> {
		let url = rpc_url
			.parse()
			.map_err(|e| ClientError::Network(format!("Invalid RPC URL {}: {}", rpc_url, e)))?;
		let provider = ProviderBuilder::new().on_http(url);
		Ok(Self { provider, timeout })
	}

	async fn bounded<T, E, F>(&self, call: F) -> Result<T, ClientError>
	where
		F: Future<Output = Result<T, E>>,
		E: std::fmt::Display,
	{
		tokio::time::timeout(self.timeout, call)
			.await
			.map_err(|_| ClientError::Timeout)?
			.map_err(|e| ClientError::Network(e.to_string()))
	}

	async fn estimate(&self, tx: TransactionRequest) -> Result<U256, ClientError> {
		let gas = self
			.bounded(self.provider.estimate_gas(&tx).into_future())
			.await?;
		Ok(U256::from(gas))
	}
}

#[async_trait]
impl EvmClient for AlloyEvmClient {
	async fn base_fee(&self) -> Result<U256, ClientError> {
		let block = self
			.bounded(
				self.provider
					.get_block_by_number(BlockNumberOrTag::Latest, BlockTransactionsKind::Hashes),
			)
			.await?
			.ok_or_else(|| ClientError::Decode("Latest block not found".into()))?;

		block
			.header
			.base_fee_per_gas
			.map(U256::from)
			.ok_or_else(|| ClientError::Decode("Latest block has no baseFeePerGas".into()))
	}

	async fn priority_fee_history(&self) -> Result<Vec<U256>, ClientError> {
		let history = self
			.bounded(self.provider.get_fee_history(
				FEE_HISTORY_BLOCKS,
				BlockNumberOrTag::Latest,
				&[FEE_HISTORY_PERCENTILE],
			))
			.await?;
		Ok(reward_samples(history.reward))
	}

	async fn max_priority_fee(&self) -> Result<U256, ClientError> {
		let fee = self
			.bounded(self.provider.get_max_priority_fee_per_gas())
			.await?;
		Ok(U256::from(fee))
	}

	async fn nonce(&self, address: &str) -> Result<u64, ClientError> {
		let address = parse_address(address)?;
		self.bounded(self.provider.get_transaction_count(address).into_future())
			.await
	}

	async fn estimate_transfer_gas(
		&self,
		from: &str,
		to: &str,
		value: U256,
		memo: Option<String>,
	) -> Result<U256, ClientError> {
		let mut tx = TransactionRequest::default()
			.from(parse_address(from)?)
			.to(parse_address(to)?)
			.value(value);
		if let Some(memo) = memo.filter(|m| !m.is_empty()) {
			tx = tx.input(TransactionInput::new(Bytes::from(memo.into_bytes())));
		}
		self.estimate(tx).await
	}

	async fn estimate_erc20_transfer_gas(
		&self,
		from: &str,
		contract: &str,
		to: &str,
		amount: U256,
	) -> Result<U256, ClientError> {
		let call = transferCall {
			to: parse_address(to)?,
			amount,
		};
		let tx = TransactionRequest::default()
			.from(parse_address(from)?)
			.to(parse_address(contract)?)
			.input(TransactionInput::new(Bytes::from(call.abi_encode())));
		self.estimate(tx).await
	}

	async fn zk_estimate_fee(
		&self,
		from: &str,
		to: &str,
		data: String,
	) -> Result<ZkFeeEstimate, ClientError> {
		let request = serde_json::json!({
			"from": from,
			"to": to,
			"data": data,
		});
		let response: ZksFeeResponse = self
			.bounded(
				self.provider
					.raw_request("zks_estimateFee".into(), (request,)),
			)
			.await?;
		Ok(response.into())
	}
}
