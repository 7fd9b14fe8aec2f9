//! Pending transaction requests and responses.

use super::APIError;
use chainparams_types::{Chain, PendingTransaction};
use serde::{Deserialize, Serialize};

/// Body of `POST /api/pending`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddPendingRequest {
	pub tx_hash: String,
	pub address: String,
	pub chain: Chain,
	/// Account sequence used by the broadcast transaction.
	pub sequence: u64,
}

impl AddPendingRequest {
	pub fn validate(&self) -> Result<(), APIError> {
		if self.tx_hash.trim().is_empty() {
			return Err(APIError::bad_request("INVALID_TX_HASH", "tx_hash cannot be empty"));
		}
		if self.address.trim().is_empty() {
			return Err(APIError::bad_request("INVALID_ADDRESS", "address cannot be empty"));
		}
		Ok(())
	}
}

#[derive(Debug, Clone, Serialize)]
pub struct PendingStatusResponse {
	pub has_pending: bool,
	pub oldest: Option<PendingTransaction>,
	/// Seconds since `oldest` was added.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub elapsed_seconds: Option<u64>,
}

impl From<Option<PendingTransaction>> for PendingStatusResponse {
	fn from(oldest: Option<PendingTransaction>) -> Self {
		Self {
			has_pending: oldest.is_some(),
			elapsed_seconds: oldest.as_ref().map(PendingTransaction::elapsed_seconds),
			oldest,
		}
	}
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshResponse {
	/// Transactions still pending after the check.
	pub pending: usize,
}
