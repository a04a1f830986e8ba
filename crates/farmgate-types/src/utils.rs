//! Utility functions for formatting identifiers.

/// Utility function to truncate an identifier for display purposes.
///
/// Shows only the first 8 characters followed by ".." for longer strings,
/// keeping log lines readable when ids are UUIDs.
pub fn truncate_id(id: &str) -> String {
	// Cut on a char boundary; ids come from fixtures and are free-form.
	match id.char_indices().nth(8) {
		Some((cut, _)) => format!("{}..", &id[..cut]),
		None => id.to_string(),
	}
}
