//! Server protocol headers.

use crate::config::ValidateConfig;

/// Builds a protocol header name: `headerize("X-Up-", "fail-target")` is
/// `X-Up-Fail-Target`.
pub fn headerize(prefix: &str, name: &str) -> String {
	let mut header = prefix.to_string();
	for (i, segment) in name.split(['-', '_']).filter(|s| !s.is_empty()).enumerate() {
		if i > 0 {
			header.push('-');
		}
		let mut chars = segment.chars();
		if let Some(first) = chars.next() {
			header.extend(first.to_uppercase());
			header.push_str(&chars.as_str().to_ascii_lowercase());
		}
	}
	header
}

/// Name of the header telling the server which fields triggered a validation.
pub fn validate_header_name(config: &ValidateConfig) -> String {
	headerize(&config.header_prefix, "validate")
}

/// Space-joined field names, or the unknown-names sentinel when there are
/// none or the value exceeds the configured size.
pub fn validate_header_value<S: AsRef<str>>(names: &[S], config: &ValidateConfig) -> String {
	let value = names.iter().map(AsRef::as_ref).collect::<Vec<_>>().join(" ");
	if value.is_empty() || value.len() > config.max_header_size {
		config.unknown_names.clone()
	} else {
		value
	}
}
