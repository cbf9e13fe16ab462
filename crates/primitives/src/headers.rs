use indexmap::IndexMap;
use serde_json::Value;

use crate::params::{ParamsError, json_kind};

/// Request headers with case-insensitive names.
///
/// The first spelling of a name is kept for output; later inserts of the same
/// name (in any case) replace the value in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers {
	inner: IndexMap<String, (String, String)>,
}

impl Headers {
	pub fn new() -> Self {
		Self::default()
	}

	/// Inserts a header, returning the previous value.
	pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) -> Option<String> {
		let name = name.into();
		let key = name.to_ascii_lowercase();
		let value = value.into();
		match self.inner.get_mut(&key) {
			Some(slot) => Some(std::mem::replace(&mut slot.1, value)),
			None => {
				self.inner.insert(key, (name, value));
				None
			}
		}
	}

	pub fn get(&self, name: &str) -> Option<&str> {
		self.inner.get(&name.to_ascii_lowercase()).map(|(_, v)| v.as_str())
	}

	pub fn remove(&mut self, name: &str) -> Option<String> {
		self.inner.shift_remove(&name.to_ascii_lowercase()).map(|(_, v)| v)
	}

	pub fn contains(&self, name: &str) -> bool {
		self.inner.contains_key(&name.to_ascii_lowercase())
	}

	pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
		self.inner.values().map(|(n, v)| (n.as_str(), v.as_str()))
	}

	pub fn len(&self) -> usize {
		self.inner.len()
	}

	pub fn is_empty(&self) -> bool {
		self.inner.is_empty()
	}

	/// Shallow merge: every header of `other` overwrites ours.
	pub fn merge_from(&mut self, other: &Headers) {
		for (name, value) in other.iter() {
			self.insert(name, value);
		}
	}

	/// Merges sources left to right into a new map.
	pub fn merge<'a>(sources: impl IntoIterator<Item = &'a Headers>) -> Headers {
		let mut merged = Headers::new();
		for source in sources {
			merged.merge_from(source);
		}
		merged
	}

	/// Reads headers from a JSON object of scalar values.
	pub fn from_json(value: &Value) -> Result<Headers, ParamsError> {
		let Value::Object(map) = value else {
			return Err(ParamsError::NotAnObject(json_kind(value)));
		};
		let mut headers = Headers::new();
		for (name, value) in map {
			match value {
				Value::Null => {}
				Value::String(s) => {
					headers.insert(name.clone(), s.clone());
				}
				other => {
					headers.insert(name.clone(), other.to_string());
				}
			}
		}
		Ok(headers)
	}
}

impl<K, V> FromIterator<(K, V)> for Headers
where
	K: Into<String>,
	V: Into<String>,
{
	fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
		let mut headers = Headers::new();
		for (k, v) in iter {
			headers.insert(k, v);
		}
		headers
	}
}
