//! Fee normalization policy.
//!
//! Every safety multiplier applied to a network fee quote lives here so the
//! policy can be audited in one place. Adapters fetch raw quotes and hand
//! them to these functions; they never scale fees themselves.

use chainparams_types::{FeeMode, U256};

/// Scales a UTXO fee-rate quote by 2.5: `raw * 2 + raw / 2`.
pub fn normalize_utxo_fee(raw: U256) -> U256 {
	raw.saturating_mul(U256::from(2))
		.saturating_add(raw / U256::from(2))
}

/// Scales an EVM base fee by 1.5 and floors it at 1 wei so the miner tip
/// is never zero.
pub fn normalize_evm_fee(raw: U256) -> U256 {
	let normalized = raw.saturating_add(raw / U256::from(2));
	normalized.max(U256::from(1))
}

/// Priority fees for the three fee modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriorityFeeBuckets {
	pub lowest: U256,
	pub normal: U256,
	pub fastest: U256,
}

impl PriorityFeeBuckets {
	/// Builds buckets from per-block reward samples.
	///
	/// The samples are sorted; `lowest` takes index 0, `normal` index N/2 and
	/// `fastest` index N-1. Returns `None` for an empty history.
	pub fn from_samples(samples: &[U256]) -> Option<Self> {
		if samples.is_empty() {
			return None;
		}
		let mut sorted = samples.to_vec();
		sorted.sort_unstable();

		Some(Self {
			lowest: sorted[0],
			normal: sorted[sorted.len() / 2],
			fastest: sorted[sorted.len() - 1],
		})
	}

	/// Uses one value for every mode.
	pub fn uniform(value: U256) -> Self {
		Self {
			lowest: value,
			normal: value,
			fastest: value,
		}
	}

	/// Builds buckets from the history, or from the single fallback quote
	/// when the history is empty.
	pub fn from_history_or(samples: &[U256], fallback: U256) -> Self {
		Self::from_samples(samples).unwrap_or_else(|| Self::uniform(fallback))
	}

	pub fn select(&self, mode: FeeMode) -> U256 {
		match mode {
			FeeMode::Lowest => self.lowest,
			FeeMode::Normal => self.normal,
			FeeMode::Fastest => self.fastest,
		}
	}
}

/// `normalize_evm_fee(base_fee) + max(selected_priority, default_priority)`.
pub fn max_fee_per_gas(base_fee: U256, selected_priority: U256, default_priority: U256) -> U256 {
	normalize_evm_fee(base_fee).saturating_add(selected_priority.max(default_priority))
}

/// Floors a gas estimate at the protocol default and at the caller's limit.
pub fn floor_gas_limit(estimate: U256, default_units: U256, explicit: Option<U256>) -> U256 {
	let floored = estimate.max(default_units);
	match explicit {
		Some(limit) => floored.max(limit),
		None => floored,
	}
}

/// Caps a priority fee at the max fee, as required for fee-estimate
/// responses that can report a tip above the total.
pub fn clamp_priority_fee(priority_fee: U256, max_fee: U256) -> U256 {
	priority_fee.min(max_fee)
}

#[cfg(test)]
mod tests {
	use super::*;

	fn u(v: u64) -> U256 {
		U256::from(v)
	}

	#[test]
	fn test_utxo_normalization() {
		assert_eq!(normalize_utxo_fee(u(10)), u(25));
		assert_eq!(normalize_utxo_fee(u(0)), u(0));
		assert_eq!(normalize_utxo_fee(u(1)), u(2));
		assert_eq!(normalize_utxo_fee(u(7)), u(17));
		for x in [3u64, 99, 12_345, 1_000_000_007] {
			assert_eq!(normalize_utxo_fee(u(x)), u(x * 2 + x / 2));
		}
	}

	#[test]
	fn test_evm_normalization_never_zero() {
		assert_eq!(normalize_evm_fee(u(0)), u(1));
		assert_eq!(normalize_evm_fee(u(1)), u(1));
		assert_eq!(normalize_evm_fee(u(100)), u(150));
		assert_eq!(normalize_evm_fee(u(3)), u(4));
	}

	#[test]
	fn test_normalization_saturates() {
		assert_eq!(normalize_utxo_fee(U256::MAX), U256::MAX);
		assert_eq!(normalize_evm_fee(U256::MAX), U256::MAX);
	}

	#[test]
	fn test_bucket_selection() {
		let buckets = PriorityFeeBuckets::from_samples(&[u(30), u(10), u(20)]).unwrap();
		assert_eq!(buckets.select(FeeMode::Lowest), u(10));
		assert_eq!(buckets.select(FeeMode::Normal), u(20));
		assert_eq!(buckets.select(FeeMode::Fastest), u(30));

		let even = PriorityFeeBuckets::from_samples(&[u(1), u(2), u(3), u(4)]).unwrap();
		assert_eq!(even.normal, u(3));

		let single = PriorityFeeBuckets::from_samples(&[u(5)]).unwrap();
		assert_eq!(single, PriorityFeeBuckets::uniform(u(5)));
	}

	#[test]
	fn test_empty_history_uses_fallback_for_all_modes() {
		assert!(PriorityFeeBuckets::from_samples(&[]).is_none());
		let buckets = PriorityFeeBuckets::from_history_or(&[], u(42));
		for mode in [FeeMode::Lowest, FeeMode::Normal, FeeMode::Fastest] {
			assert_eq!(buckets.select(mode), u(42));
		}
	}

	#[test]
	fn test_max_fee_per_gas() {
		let buckets = PriorityFeeBuckets::from_samples(&[u(10), u(20), u(30)]).unwrap();
		let priority = buckets.select(FeeMode::Fastest);
		assert_eq!(max_fee_per_gas(u(100), priority, u(0)), u(180));
		// default priority fee acts as a floor
		assert_eq!(max_fee_per_gas(u(100), priority, u(50)), u(200));
	}

	#[test]
	fn test_gas_limit_floor() {
		assert_eq!(floor_gas_limit(u(21_000), u(23_000), None), u(23_000));
		assert_eq!(floor_gas_limit(u(50_000), u(23_000), None), u(50_000));
		assert_eq!(
			floor_gas_limit(u(50_000), u(23_000), Some(u(80_000))),
			u(80_000)
		);
	}

	#[test]
	fn test_priority_clamped_to_max_fee() {
		assert_eq!(clamp_priority_fee(u(10), u(5)), u(5));
		assert_eq!(clamp_priority_fee(u(3), u(5)), u(3));
	}
}
