//! Time helpers.

/// Current UNIX time in nanoseconds. Returns 0 if the clock is before the
/// epoch and saturates on overflow.
pub fn current_timestamp_nanos() -> u64 {
	std::time::SystemTime::now()
		.duration_since(std::time::UNIX_EPOCH)
		.map(|d| u64::try_from(d.as_nanos()).unwrap_or(u64::MAX))
		.unwrap_or(0)
}
