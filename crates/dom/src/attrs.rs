//! Declarative option attributes.
//!
//! Each option is read from `up-validate-<key>` first and `up-watch-<key>`
//! second. Malformed values are logged and ignored.

use std::time::Duration;

use serde_json::Value;
use wireform_primitives::{Disable, FocusMode, Headers, Method, OptionLayer, Params};

use crate::document::Node;

const PREFIXES: [&str; 2] = ["up-validate-", "up-watch-"];

fn lookup<'a>(node: &'a Node, key: &str) -> Option<(String, &'a str)> {
	PREFIXES.iter().find_map(|prefix| {
		let name = format!("{prefix}{key}");
		node.attr(&name).map(|value| (name, value))
	})
}

fn parse_bool(value: &str) -> Option<bool> {
	match value.trim() {
		"" | "true" => Some(true),
		"false" => Some(false),
		_ => None,
	}
}

fn malformed(attr: &str, value: &str) {
	tracing::warn!(attr, value, "dom.attr_malformed");
}

fn read_bool(node: &Node, key: &str) -> Option<bool> {
	let (name, value) = lookup(node, key)?;
	let parsed = parse_bool(value);
	if parsed.is_none() {
		malformed(&name, value);
	}
	parsed
}

fn read_string(node: &Node, key: &str) -> Option<String> {
	lookup(node, key).map(|(_, value)| value.to_string())
}

fn read_json(node: &Node, key: &str) -> Option<(String, Value)> {
	let (name, value) = lookup(node, key)?;
	match serde_json::from_str(value) {
		Ok(json) => Some((name, json)),
		Err(_) => {
			malformed(&name, value);
			None
		}
	}
}

/// Parses a JSON attribute value on its own, for attributes outside the
/// prefixed option families (`up-data`, `up-params`, `up-headers`).
pub(crate) fn json_attr(node: &Node, name: &str) -> Option<Value> {
	let raw = node.attr(name)?;
	match serde_json::from_str(raw) {
		Ok(json) => Some(json),
		Err(_) => {
			malformed(name, raw);
			None
		}
	}
}

pub(crate) fn params_attr(node: &Node, name: &str) -> Option<Params> {
	let json = json_attr(node, name)?;
	Params::from_json(&json).map_err(|err| tracing::warn!(attr = name, %err, "dom.attr_malformed")).ok()
}

pub(crate) fn headers_attr(node: &Node, name: &str) -> Option<Headers> {
	let json = json_attr(node, name)?;
	Headers::from_json(&json).map_err(|err| tracing::warn!(attr = name, %err, "dom.attr_malformed")).ok()
}

/// Reads the option layer declared directly on one element.
pub(crate) fn read_layer(node: &Node) -> OptionLayer {
	let delay = lookup(node, "delay").and_then(|(name, value)| match value.trim().parse::<u64>() {
		Ok(ms) => Some(Duration::from_millis(ms)),
		Err(_) => {
			malformed(&name, value);
			None
		}
	});

	let disable = lookup(node, "disable").and_then(|(_, value)| match value.trim() {
		"" | "true" => Some(Disable::Form),
		"false" => None,
		selector => Some(Disable::Selector(selector.to_string())),
	});

	let method = lookup(node, "method").and_then(|(name, value)| match value.parse::<Method>() {
		Ok(method) => Some(method),
		Err(_) => {
			malformed(&name, value);
			None
		}
	});

	let params = read_json(node, "params").and_then(|(name, json)| {
		Params::from_json(&json).map_err(|err| tracing::warn!(attr = %name, %err, "dom.attr_malformed")).ok()
	});
	let headers = read_json(node, "headers").and_then(|(name, json)| {
		Headers::from_json(&json).map_err(|err| tracing::warn!(attr = %name, %err, "dom.attr_malformed")).ok()
	});

	OptionLayer {
		delay,
		event: read_string(node, "event"),
		batch: read_bool(node, "batch"),
		feedback: read_bool(node, "feedback"),
		disable,
		method,
		url: read_string(node, "url"),
		params,
		headers,
		data: read_json(node, "data").map(|(_, json)| json),
		keep_data: read_bool(node, "keep-data"),
		preview: read_string(node, "preview"),
		placeholder: read_string(node, "placeholder"),
		focus: lookup(node, "focus").and_then(|(_, value)| value.parse::<FocusMode>().ok()),
	}
}
