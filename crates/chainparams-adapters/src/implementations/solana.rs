//! Solana adapter.
//!
//! Token transfers need the sender's associated token account, which must
//! exist, and the recipient's, which may not exist yet. A recipient lookup
//! that comes back inconclusive is followed by direct existence checks of
//! the two derivable addresses (standard and token-2022 programs); only when
//! both probes come back empty is the recipient account reported as absent.

use crate::clients::{SolanaClient, TokenAccountDeriver, TokenAccountLookup};
use crate::{AdapterError, BlockHashSource, ChainAdapter};
use async_trait::async_trait;
use chainparams_types::{truncate_id, ChainFamily, ChainSpecificParams, TransactionIntent};
use std::sync::Arc;

/// Minimum priority fee in micro-lamports per compute unit.
pub const MIN_PRIORITY_FEE: u64 = 1_000_000;
/// Compute-unit limit attached to the priority fee.
pub const PRIORITY_FEE_LIMIT: u64 = 100_000;

pub struct SolanaAdapter {
	client: Arc<dyn SolanaClient>,
	deriver: Arc<dyn TokenAccountDeriver>,
}

/// Recipient token account and the program it belongs to.
struct Recipient {
	address: Option<String>,
	is_token_2022: Option<bool>,
}

impl SolanaAdapter {
	pub fn new(client: Arc<dyn SolanaClient>, deriver: Arc<dyn TokenAccountDeriver>) -> Self {
		Self { client, deriver }
	}

	/// Re-fetches only the recent block hash.
	pub async fn recent_block_hash(&self) -> Result<String, AdapterError> {
		self.client
			.recent_block_hash()
			.await?
			.filter(|hash| !hash.is_empty())
			.ok_or(AdapterError::FailToGetRecentBlockHash)
	}

	async fn resolve_recipient(&self, owner: &str, mint: &str) -> Result<Recipient, AdapterError> {
		match self.client.token_account(owner, mint).await? {
			TokenAccountLookup::Found {
				address,
				is_token_2022,
			} => Ok(Recipient {
				address: Some(address),
				is_token_2022: Some(is_token_2022),
			}),
			TokenAccountLookup::Absent => Ok(Recipient {
				address: None,
				is_token_2022: None,
			}),
			TokenAccountLookup::Unknown => self.probe_recipient(owner, mint).await,
		}
	}

	async fn probe_recipient(&self, owner: &str, mint: &str) -> Result<Recipient, AdapterError> {
		let candidates = [false, true]
			.into_iter()
			.filter_map(|token_2022| self.deriver.derive(owner, mint, token_2022))
			.filter(|address| !address.is_empty());

		for candidate in candidates {
			let probe = self.client.account_exists(&candidate).await?;
			if probe.exists {
				return Ok(Recipient {
					address: Some(candidate),
					is_token_2022: Some(probe.is_token_2022),
				});
			}
		}

		Ok(Recipient {
			address: None,
			is_token_2022: None,
		})
	}
}

#[async_trait]
impl ChainAdapter for SolanaAdapter {
	fn family(&self) -> ChainFamily {
		ChainFamily::Solana
	}

	async fn fetch_params(
		&self,
		intent: &TransactionIntent,
	) -> Result<ChainSpecificParams, AdapterError> {
		let (block_hash, priority_fee) = tokio::join!(
			self.recent_block_hash(),
			self.client.priority_fee_estimate(),
		);
		let recent_block_hash = block_hash?;
		let priority_fee = priority_fee?.max(MIN_PRIORITY_FEE);

		if intent.coin.is_native_token {
			return Ok(ChainSpecificParams::Solana {
				recent_block_hash,
				priority_fee,
				priority_limit: PRIORITY_FEE_LIMIT,
				from_token_account: None,
				to_token_account: None,
				has_program_id: false,
			});
		}

		let mint = intent.coin.contract_address.as_str();
		let (from_token_account, sender_is_token_2022) = match self
			.client
			.token_account(&intent.from_address, mint)
			.await?
		{
			TokenAccountLookup::Found {
				address,
				is_token_2022,
			} if !address.is_empty() => (address, is_token_2022),
			_ => return Err(AdapterError::FailToGetAssociatedTokenAddress),
		};

		// Sender's program is the default until the recipient says otherwise.
		let mut has_program_id = sender_is_token_2022;
		let mut to_token_account = None;

		if let Some(to) = intent.to_address.as_deref().filter(|to| !to.is_empty()) {
			match self.resolve_recipient(to, mint).await {
				Ok(recipient) => {
					if let Some(is_token_2022) = recipient.is_token_2022 {
						has_program_id = is_token_2022;
					}
					to_token_account = recipient.address;
				},
				Err(e) => {
					tracing::warn!(
						recipient = %truncate_id(to),
						mint = %mint,
						error = %e,
						"Recipient token account lookup failed, treating as absent"
					);
				},
			}
		}

		Ok(ChainSpecificParams::Solana {
			recent_block_hash,
			priority_fee,
			priority_limit: PRIORITY_FEE_LIMIT,
			from_token_account: Some(from_token_account),
			to_token_account,
			has_program_id,
		})
	}
}

#[async_trait]
impl BlockHashSource for SolanaAdapter {
	async fn fetch_recent_block_hash(&self) -> Result<String, AdapterError> {
		self.recent_block_hash().await
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::clients::{AccountProbe, MockSolanaClient, MockTokenAccountDeriver};
	use crate::ClientError;
	use chainparams_types::{Chain, Coin};

	const MINT: &str = "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v";

	fn coin(native: bool) -> Coin {
		Coin {
			chain: Chain::Solana,
			ticker: if native { "SOL".into() } else { "USDC".into() },
			address: "sender".into(),
			decimals: 6,
			contract_address: if native { String::new() } else { MINT.into() },
			is_native_token: native,
			fee_default: String::new(),
		}
	}

	fn base_client() -> MockSolanaClient {
		let mut client = MockSolanaClient::new();
		client
			.expect_recent_block_hash()
			.returning(|| Ok(Some("blockhash".into())));
		client.expect_priority_fee_estimate().returning(|| Ok(5_000));
		client
	}

	fn no_deriver() -> Arc<dyn TokenAccountDeriver> {
		let mut deriver = MockTokenAccountDeriver::new();
		deriver.expect_derive().times(0);
		Arc::new(deriver)
	}

	#[tokio::test]
	async fn test_native_transfer() {
		let adapter = SolanaAdapter::new(Arc::new(base_client()), no_deriver());
		let params = adapter
			.fetch_params(&TransactionIntent::transfer(coin(true), "recipient"))
			.await
			.unwrap();

		assert_eq!(
			params,
			ChainSpecificParams::Solana {
				recent_block_hash: "blockhash".into(),
				priority_fee: MIN_PRIORITY_FEE,
				priority_limit: PRIORITY_FEE_LIMIT,
				from_token_account: None,
				to_token_account: None,
				has_program_id: false,
			}
		);
	}

	#[tokio::test]
	async fn test_missing_block_hash() {
		let mut client = MockSolanaClient::new();
		client.expect_recent_block_hash().returning(|| Ok(None));
		client.expect_priority_fee_estimate().returning(|| Ok(0));

		let adapter = SolanaAdapter::new(Arc::new(client), no_deriver());
		let err = adapter
			.fetch_params(&TransactionIntent::transfer(coin(true), "recipient"))
			.await
			.unwrap_err();
		assert!(matches!(err, AdapterError::FailToGetRecentBlockHash));
	}

	#[tokio::test]
	async fn test_sender_token_account_required() {
		let mut client = base_client();
		client
			.expect_token_account()
			.returning(|_, _| Ok(TokenAccountLookup::Unknown));

		let adapter = SolanaAdapter::new(Arc::new(client), no_deriver());
		let err = adapter
			.fetch_params(&TransactionIntent::transfer(coin(false), "recipient"))
			.await
			.unwrap_err();
		assert!(matches!(err, AdapterError::FailToGetAssociatedTokenAddress));
	}

	#[tokio::test]
	async fn test_recipient_found_directly() {
		let mut client = base_client();
		client.expect_token_account().returning(|owner, _| {
			Ok(TokenAccountLookup::Found {
				address: format!("{}-ata", owner),
				is_token_2022: owner == "recipient",
			})
		});
		client.expect_account_exists().times(0);

		let adapter = SolanaAdapter::new(Arc::new(client), no_deriver());
		let params = adapter
			.fetch_params(&TransactionIntent::transfer(coin(false), "recipient"))
			.await
			.unwrap();

		assert!(matches!(
			params,
			ChainSpecificParams::Solana {
				ref from_token_account,
				ref to_token_account,
				has_program_id: true,
				..
			} if from_token_account.as_deref() == Some("sender-ata")
				&& to_token_account.as_deref() == Some("recipient-ata")
		));
	}

	#[tokio::test]
	async fn test_confirmed_absent_recipient_skips_probe() {
		let mut client = base_client();
		client.expect_token_account().returning(|owner, _| {
			if owner == "sender" {
				Ok(TokenAccountLookup::Found {
					address: "sender-ata".into(),
					is_token_2022: false,
				})
			} else {
				Ok(TokenAccountLookup::Absent)
			}
		});
		client.expect_account_exists().times(0);

		let adapter = SolanaAdapter::new(Arc::new(client), no_deriver());
		let params = adapter
			.fetch_params(&TransactionIntent::transfer(coin(false), "recipient"))
			.await
			.unwrap();

		assert!(matches!(
			params,
			ChainSpecificParams::Solana { to_token_account: None, has_program_id: false, .. }
		));
	}

	#[tokio::test]
	async fn test_inconclusive_lookup_probes_token_2022_address() {
		let mut client = base_client();
		client.expect_token_account().returning(|owner, _| {
			if owner == "sender" {
				Ok(TokenAccountLookup::Found {
					address: "sender-ata".into(),
					is_token_2022: false,
				})
			} else {
				Ok(TokenAccountLookup::Unknown)
			}
		});
		client.expect_account_exists().returning(|address| {
			Ok(AccountProbe {
				exists: address == "ata-2022",
				is_token_2022: address == "ata-2022",
			})
		});

		let mut deriver = MockTokenAccountDeriver::new();
		deriver.expect_derive().returning(|_, _, token_2022| {
			Some(if token_2022 { "ata-2022" } else { "ata-std" }.to_string())
		});

		let adapter = SolanaAdapter::new(Arc::new(client), Arc::new(deriver));
		let params = adapter
			.fetch_params(&TransactionIntent::transfer(coin(false), "recipient"))
			.await
			.unwrap();

		assert!(matches!(
			params,
			ChainSpecificParams::Solana { ref to_token_account, has_program_id: true, .. }
				if to_token_account.as_deref() == Some("ata-2022")
		));
	}

	#[tokio::test]
	async fn test_recipient_probe_errors_degrade_to_absent() {
		let mut client = base_client();
		client.expect_token_account().returning(|owner, _| {
			if owner == "sender" {
				Ok(TokenAccountLookup::Found {
					address: "sender-ata".into(),
					is_token_2022: true,
				})
			} else {
				Err(ClientError::Timeout)
			}
		});

		let adapter = SolanaAdapter::new(Arc::new(client), no_deriver());
		let params = adapter
			.fetch_params(&TransactionIntent::transfer(coin(false), "recipient"))
			.await
			.unwrap();

		assert!(matches!(
			params,
			ChainSpecificParams::Solana { to_token_account: None, has_program_id: true, .. }
		));
	}

	#[tokio::test]
	async fn test_block_hash_source() {
		let mut client = MockSolanaClient::new();
		client
			.expect_recent_block_hash()
			.times(2)
			.returning({
				let mut calls = 0;
				move || {
					calls += 1;
					Ok(if calls == 1 { Some("fresh".into()) } else { Some(String::new()) })
				}
			});

		let adapter = SolanaAdapter::new(Arc::new(client), no_deriver());
		assert_eq!(adapter.fetch_recent_block_hash().await.unwrap(), "fresh");
		assert!(matches!(
			adapter.fetch_recent_block_hash().await,
			Err(AdapterError::FailToGetRecentBlockHash)
		));
	}

	#[tokio::test]
	async fn test_network_priority_fee_above_floor_is_kept() {
		let mut client = MockSolanaClient::new();
		client
			.expect_recent_block_hash()
			.returning(|| Ok(Some("blockhash".into())));
		client
			.expect_priority_fee_estimate()
			.returning(|| Ok(3_000_000));

		let adapter = SolanaAdapter::new(Arc::new(client), no_deriver());
		let params = adapter
			.fetch_params(&TransactionIntent::transfer(coin(true), "recipient"))
			.await
			.unwrap();
		assert!(matches!(
			params,
			ChainSpecificParams::Solana { priority_fee: 3_000_000, .. }
		));
	}
}
