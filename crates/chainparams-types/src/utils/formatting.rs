//! Log formatting helpers.

/// Truncates a hash or address for display purposes.
///
/// Shows only the first 8 characters followed by ".." for longer strings.
pub fn truncate_id(id: &str) -> String {
	if id.chars().count() <= 8 {
		id.to_string()
	} else {
		format!("{}..", id.chars().take(8).collect::<String>())
	}
}
