use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// HTTP method of a render request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
	#[default]
	Get,
	Post,
	Put,
	Patch,
	Delete,
}

impl Method {
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Get => "GET",
			Self::Post => "POST",
			Self::Put => "PUT",
			Self::Patch => "PATCH",
			Self::Delete => "DELETE",
		}
	}

	/// Returns true for methods whose responses may be cached and shared.
	pub const fn is_safe(self) -> bool {
		matches!(self, Self::Get)
	}
}

impl fmt::Display for Method {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Error returned when a method name is not recognized.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown HTTP method: {0}")]
pub struct ParseMethodError(pub String);

impl FromStr for Method {
	type Err = ParseMethodError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.trim().to_ascii_uppercase().as_str() {
			"GET" => Ok(Self::Get),
			"POST" => Ok(Self::Post),
			"PUT" => Ok(Self::Put),
			"PATCH" => Ok(Self::Patch),
			"DELETE" => Ok(Self::Delete),
			_ => Err(ParseMethodError(s.to_string())),
		}
	}
}

/// Batch compatibility key: two solutions may share a render pass only when
/// their destinations are equal.
///
/// Displays as `"<METHOD> <url>"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Destination {
	pub method: Method,
	pub url: String,
}

impl Destination {
	pub fn new(method: Method, url: impl Into<String>) -> Self {
		Self { method, url: url.into() }
	}
}

impl fmt::Display for Destination {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{} {}", self.method, self.url)
	}
}
