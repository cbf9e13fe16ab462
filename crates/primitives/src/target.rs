//! Target selector strings.
//!
//! Targets are selector lists such as `.results, form .errors`. This module
//! only understands enough structure to split lists at their top-level commas
//! and to substitute the `:origin` pseudo-selector (and its `&` shorthand);
//! matching selectors against elements is the host's business.

/// Pseudo-selector standing for the element that triggered an update.
pub const ORIGIN_PSEUDO: &str = ":origin";

#[derive(Debug, Clone, Copy, Default)]
struct Scan {
	parens: usize,
	brackets: usize,
	quote: Option<char>,
}

impl Scan {
	/// Feeds one char, returning true when it sits at selector level (outside
	/// quotes and attribute brackets) before being consumed.
	fn step(&mut self, ch: char) -> bool {
		if let Some(q) = self.quote {
			if ch == q {
				self.quote = None;
			}
			return false;
		}
		if self.brackets > 0 {
			match ch {
				'"' | '\'' => self.quote = Some(ch),
				']' => self.brackets -= 1,
				_ => {}
			}
			return false;
		}
		match ch {
			'"' | '\'' => {
				self.quote = Some(ch);
				false
			}
			'[' => {
				self.brackets += 1;
				false
			}
			'(' => {
				self.parens += 1;
				true
			}
			')' => {
				self.parens = self.parens.saturating_sub(1);
				true
			}
			_ => true,
		}
	}
}

/// Splits a selector list at its top-level commas.
///
/// Commas nested in `:has(...)`, attribute brackets or quotes do not split.
/// Parts are trimmed and empty parts dropped.
pub fn split_target(target: &str) -> Vec<String> {
	let mut parts = Vec::new();
	let mut scan = Scan::default();
	let mut start = 0;
	for (i, ch) in target.char_indices() {
		let selector_level = scan.step(ch);
		if selector_level && ch == ',' && scan.parens == 0 {
			push_part(&mut parts, &target[start..i]);
			start = i + ch.len_utf8();
		}
	}
	push_part(&mut parts, &target[start..]);
	parts
}

fn push_part(parts: &mut Vec<String>, part: &str) {
	let part = part.trim();
	if !part.is_empty() {
		parts.push(part.to_string());
	}
}

/// Joins selectors into one selector list.
pub fn join_targets<I, S>(targets: I) -> String
where
	I: IntoIterator<Item = S>,
	S: AsRef<str>,
{
	let mut joined = String::new();
	for target in targets {
		if !joined.is_empty() {
			joined.push_str(", ");
		}
		joined.push_str(target.as_ref());
	}
	joined
}

fn is_ident_char(ch: char) -> bool {
	ch.is_ascii_alphanumeric() || ch == '-' || ch == '_'
}

/// Byte spans of every origin reference outside quotes and brackets.
fn origin_spans(target: &str) -> Vec<(usize, usize)> {
	let mut spans = Vec::new();
	let mut scan = Scan::default();
	let mut skip_until = 0;
	for (i, ch) in target.char_indices() {
		let selector_level = scan.step(ch);
		if i < skip_until || !selector_level {
			continue;
		}
		if ch == '&' {
			spans.push((i, i + 1));
		} else if ch == ':' && target[i..].starts_with(ORIGIN_PSEUDO) {
			let end = i + ORIGIN_PSEUDO.len();
			if !target[end..].chars().next().is_some_and(is_ident_char) {
				spans.push((i, end));
				skip_until = end;
			}
		}
	}
	spans
}

/// Substitutes every origin reference with the origin's own target.
///
/// `origin_target` is only called when the target references its origin.
pub fn resolve_origin(target: &str, origin_target: impl FnOnce() -> String) -> String {
	let spans = origin_spans(target);
	if spans.is_empty() {
		return target.to_string();
	}
	let replacement = origin_target();
	let mut resolved = String::with_capacity(target.len() + replacement.len());
	let mut cursor = 0;
	for (start, end) in spans {
		resolved.push_str(&target[cursor..start]);
		resolved.push_str(&replacement);
		cursor = end;
	}
	resolved.push_str(&target[cursor..]);
	resolved
}

#[cfg(test)]
mod tests {
	use proptest::prelude::*;

	use super::*;

	#[test]
	fn split_ignores_nested_commas() {
		assert_eq!(
			split_target(".a, fieldset:has(#x, #y) , [data-x=\"1,2\"]"),
			vec![".a", "fieldset:has(#x, #y)", "[data-x=\"1,2\"]"]
		);
	}

	#[test]
	fn split_drops_empty_parts() {
		assert_eq!(split_target(" , .a,,"), vec![".a"]);
		assert!(split_target("").is_empty());
	}

	#[test]
	fn resolve_origin_inside_has() {
		let resolved = resolve_origin(".group:has(:origin)", || "#email".to_string());
		assert_eq!(resolved, ".group:has(#email)");
	}

	#[test]
	fn resolve_origin_supports_ampersand_shorthand() {
		assert_eq!(resolve_origin("& .hint", || "#f".to_string()), "#f .hint");
	}

	#[test]
	fn resolve_origin_leaves_quoted_and_bracketed_text() {
		let target = "[title=':origin'], .x:origin-like";
		assert_eq!(resolve_origin(target, || unreachable!()), target);
	}

	#[test]
	fn resolve_origin_is_lazy() {
		assert_eq!(resolve_origin(".results", || panic!("not needed")), ".results");
	}

	proptest! {
		#[test]
		fn split_inverts_join(names in prop::collection::vec("[a-z][a-z0-9-]{0,8}", 1..6)) {
			let selectors: Vec<String> = names.iter().map(|n| format!(".{n}")).collect();
			prop_assert_eq!(split_target(&join_targets(&selectors)), selectors);
		}
	}
}
