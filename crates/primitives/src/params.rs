use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Errors raised while reading params from structured input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParamsError {
	/// Params JSON must be an object mapping names to values.
	#[error("params must be a JSON object, got {0}")]
	NotAnObject(&'static str),
}

/// Ordered, multi-valued request params.
///
/// Entry order is preserved and one name may carry several values (e.g.
/// `tags[]`). Merging is structured: a later source replaces every entry of a
/// name it mentions, so later sources win key ties without collapsing their
/// own multi-valued entries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Params {
	entries: Vec<(String, String)>,
}

impl Params {
	pub fn new() -> Self {
		Self::default()
	}

	/// Appends one entry, keeping existing entries of the same name.
	pub fn add(&mut self, name: impl Into<String>, value: impl Into<String>) {
		self.entries.push((name.into(), value.into()));
	}

	/// Replaces every entry of `name` with a single value.
	pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
		let name = name.into();
		self.entries.retain(|(n, _)| *n != name);
		self.entries.push((name, value.into()));
	}

	/// Removes every entry of `name`, returning how many were removed.
	pub fn remove(&mut self, name: &str) -> usize {
		let before = self.entries.len();
		self.entries.retain(|(n, _)| n != name);
		before - self.entries.len()
	}

	/// Returns the first value for `name`.
	pub fn get(&self, name: &str) -> Option<&str> {
		self.entries.iter().find(|(n, _)| n == name).map(|(_, v)| v.as_str())
	}

	/// Returns all values for `name` in entry order.
	pub fn get_all(&self, name: &str) -> Vec<&str> {
		self.entries.iter().filter(|(n, _)| n == name).map(|(_, v)| v.as_str()).collect()
	}

	/// Returns the distinct names in first-occurrence order.
	pub fn names(&self) -> Vec<&str> {
		let mut names: Vec<&str> = Vec::new();
		for (name, _) in &self.entries {
			if !names.contains(&name.as_str()) {
				names.push(name);
			}
		}
		names
	}

	pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
		self.entries.iter().map(|(n, v)| (n.as_str(), v.as_str()))
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	/// Merges `other` into `self`; names present in `other` replace ours.
	pub fn merge_from(&mut self, other: &Params) {
		if other.is_empty() {
			return;
		}
		let replaced = other.names();
		self.entries.retain(|(n, _)| !replaced.contains(&n.as_str()));
		self.entries.extend(other.entries.iter().cloned());
	}

	/// Merges sources left to right into a new set.
	pub fn merge<'a>(sources: impl IntoIterator<Item = &'a Params>) -> Params {
		let mut merged = Params::new();
		for source in sources {
			merged.merge_from(source);
		}
		merged
	}

	/// Reads params from a JSON object.
	///
	/// Arrays produce one entry per element, `null` values are skipped and
	/// scalars are rendered without quotes.
	pub fn from_json(value: &Value) -> Result<Params, ParamsError> {
		let Value::Object(map) = value else {
			return Err(ParamsError::NotAnObject(json_kind(value)));
		};
		let mut params = Params::new();
		for (name, value) in map {
			match value {
				Value::Null => {}
				Value::Array(items) => {
					for item in items {
						if let Some(text) = scalar_text(item) {
							params.add(name.clone(), text);
						}
					}
				}
				other => {
					if let Some(text) = scalar_text(other) {
						params.add(name.clone(), text);
					}
				}
			}
		}
		Ok(params)
	}
}

fn scalar_text(value: &Value) -> Option<String> {
	match value {
		Value::Null => None,
		Value::String(s) => Some(s.clone()),
		other => Some(other.to_string()),
	}
}

pub(crate) fn json_kind(value: &Value) -> &'static str {
	match value {
		Value::Null => "null",
		Value::Bool(_) => "boolean",
		Value::Number(_) => "number",
		Value::String(_) => "string",
		Value::Array(_) => "array",
		Value::Object(_) => "object",
	}
}

impl<K, V> FromIterator<(K, V)> for Params
where
	K: Into<String>,
	V: Into<String>,
{
	fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
		Self {
			entries: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
		}
	}
}
