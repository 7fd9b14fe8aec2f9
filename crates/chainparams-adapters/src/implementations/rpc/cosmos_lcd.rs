//! Cosmos LCD (REST) client.
//!
//! Only the three endpoints the Cosmos adapter needs are covered: the auth
//! account record, the latest block header and the IBC denom trace. Account
//! payloads differ between plain and vesting accounts, so the account number
//! and sequence are looked up in every known nesting.

use crate::clients::{CosmosAccount, CosmosClient, DenomTrace};
use crate::ClientError;
use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::Value;
use std::time::Duration;

/// Cosmos LCD client for one chain.
pub struct CosmosLcdClient {
	client: reqwest::Client,
	base_url: String,
}

impl CosmosLcdClient {
	/// Creates a client for `base_url`. Every request is bounded by `timeout`.
	pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ClientError> {
		let client = reqwest::Client::builder()
			.timeout(timeout)
			.build()
			.map_err(|e| ClientError::Network(format!("Failed to build HTTP client: {}", e)))?;
		Ok(Self {
			client,
			base_url: base_url.trim_end_matches('/').to_string(),
		})
	}

	/// GETs `path` and returns the decoded body, or `None` on 404.
	async fn get(&self, path: &str) -> Result<Option<Value>, ClientError> {
		let url = format!("{}{}", self.base_url, path);
		let response = self.client.get(&url).send().await.map_err(map_reqwest)?;

		let status = response.status();
		if status == StatusCode::NOT_FOUND {
			return Ok(None);
		}
		if !status.is_success() {
			let body = response.text().await.unwrap_or_default();
			return Err(ClientError::Rpc {
				code: i64::from(status.as_u16()),
				message: body,
			});
		}

		let body = response.json::<Value>().await.map_err(|e| {
			if e.is_timeout() {
				ClientError::Timeout
			} else {
				ClientError::Decode(e.to_string())
			}
		})?;
		Ok(Some(body))
	}
}

fn map_reqwest(e: reqwest::Error) -> ClientError {
	if e.is_timeout() {
		ClientError::Timeout
	} else {
		ClientError::Network(e.to_string())
	}
}

/// LCD numbers are strings; some gateways send bare numbers instead.
fn as_number_string(value: &Value) -> Option<String> {
	match value {
		Value::String(s) => Some(s.clone()),
		Value::Number(n) => Some(n.to_string()),
		_ => None,
	}
}

/// Extracts account number and sequence from an auth account response.
///
/// A missing sequence is reported as an empty string so that the adapter's
/// parsing turns it into a hard error.
fn parse_account(body: &Value) -> Option<CosmosAccount> {
	let account = body.get("account")?;
	let base = [
		"/base_account",
		"/base_vesting_account/base_account",
		"",
	]
	.iter()
	.filter_map(|pointer| account.pointer(pointer))
	.find(|candidate| candidate.get("account_number").is_some())?;

	Some(CosmosAccount {
		account_number: base
			.get("account_number")
			.and_then(as_number_string)
			.unwrap_or_default(),
		sequence: base
			.get("sequence")
			.and_then(as_number_string)
			.unwrap_or_default(),
	})
}

fn parse_block_height(body: &Value) -> Result<u64, ClientError> {
	let height = body
		.pointer("/block/header/height")
		.or_else(|| body.pointer("/sdk_block/header/height"))
		.and_then(as_number_string)
		.ok_or_else(|| ClientError::Decode("Missing block height".into()))?;
	height
		.parse()
		.map_err(|_| ClientError::Decode(format!("Invalid block height: {}", height)))
}

fn parse_denom_trace(body: &Value) -> Result<DenomTrace, ClientError> {
	let trace = body
		.get("denom_trace")
		.ok_or_else(|| ClientError::Decode("Missing denom_trace".into()))?;
	serde_json::from_value(trace.clone()).map_err(|e| ClientError::Decode(e.to_string()))
}

#[async_trait]
impl CosmosClient for CosmosLcdClient {
	async fn account(&self, address: &str) -> Result<Option<CosmosAccount>, ClientError> {
		let path = format!("/cosmos/auth/v1beta1/accounts/{}", address);
		Ok(self.get(&path).await?.as_ref().and_then(parse_account))
	}

	async fn latest_block_height(&self) -> Result<u64, ClientError> {
		let body = self
			.get("/cosmos/base/tendermint/v1beta1/blocks/latest")
			.await?
			.ok_or_else(|| ClientError::Decode("Latest block not found".into()))?;
		parse_block_height(&body)
	}

	async fn denom_trace(&self, hash: &str) -> Result<DenomTrace, ClientError> {
		let path = format!("/ibc/apps/transfer/v1/denom_traces/{}", hash);
		let body = self
			.get(&path)
			.await?
			.ok_or_else(|| ClientError::Decode(format!("Unknown denom trace {}", hash)))?;
		parse_denom_trace(&body)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;

	#[test]
	fn test_parse_base_account() {
		let body = json!({
			"account": {
				"@type": "/cosmos.auth.v1beta1.BaseAccount",
				"address": "cosmos1abc",
				"account_number": "12345",
				"sequence": "7"
			}
		});
		assert_eq!(
			parse_account(&body),
			Some(CosmosAccount {
				account_number: "12345".into(),
				sequence: "7".into(),
			})
		);
	}

	#[test]
	fn test_parse_nested_accounts() {
		let eth_account = json!({
			"account": {
				"@type": "/ethermint.types.v1.EthAccount",
				"base_account": { "account_number": "3", "sequence": 9 }
			}
		});
		let vesting = json!({
			"account": {
				"@type": "/cosmos.vesting.v1beta1.ContinuousVestingAccount",
				"base_vesting_account": {
					"base_account": { "account_number": "44", "sequence": "1" }
				}
			}
		});

		let parsed = parse_account(&eth_account).unwrap();
		assert_eq!(parsed.account_number, "3");
		assert_eq!(parsed.sequence, "9");

		let parsed = parse_account(&vesting).unwrap();
		assert_eq!(parsed.account_number, "44");
		assert_eq!(parsed.sequence, "1");
	}

	#[test]
	fn test_parse_account_without_sequence() {
		let body = json!({ "account": { "account_number": "1" } });
		let parsed = parse_account(&body).unwrap();
		assert!(parsed.sequence.is_empty());
		assert!(parse_account(&json!({ "code": 5 })).is_none());
	}

	#[test]
	fn test_parse_block_height() {
		let body = json!({ "block": { "header": { "height": "20554312" } } });
		assert_eq!(parse_block_height(&body).unwrap(), 20_554_312);

		let sdk = json!({ "sdk_block": { "header": { "height": "99" } } });
		assert_eq!(parse_block_height(&sdk).unwrap(), 99);

		assert!(matches!(
			parse_block_height(&json!({ "block": {} })),
			Err(ClientError::Decode(_))
		));
	}

	#[test]
	fn test_parse_denom_trace() {
		let body = json!({
			"denom_trace": { "path": "transfer/channel-141", "base_denom": "uosmo" }
		});
		assert_eq!(
			parse_denom_trace(&body).unwrap(),
			DenomTrace {
				path: "transfer/channel-141".into(),
				base_denom: "uosmo".into(),
			}
		);
		assert!(parse_denom_trace(&json!({})).is_err());
	}

	#[test]
	fn test_base_url_trailing_slash_trimmed() {
		let client = CosmosLcdClient::new("https://lcd.example.com/", Duration::from_secs(5)).unwrap();
		assert_eq!(client.base_url, "https://lcd.example.com");
	}
}
