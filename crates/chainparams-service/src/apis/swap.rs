//! Swap parameter request.

use chainparams_types::Coin;
use serde::{Deserialize, Serialize};

/// Body of `POST /api/params/swap`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwapParamsRequest {
	pub coin: Coin,
	#[serde(default)]
	pub is_deposit: bool,
}
