use std::fmt;
use std::sync::Arc;

/// Human-readable reason attached to an aborted operation.
///
/// Cheap to clone; the same reason is handed to every caller rejected by one
/// abort.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AbortReason(Arc<str>);

impl AbortReason {
	/// Creates a reason from any string-like message.
	pub fn new(reason: impl Into<String>) -> Self {
		Self(Arc::from(reason.into()))
	}

	/// Reason used when the host form leaves the document.
	pub fn form_removed() -> Self {
		Self::new("form removed")
	}

	/// Reason used when the owner of pending work goes away.
	pub fn scheduler_dropped() -> Self {
		Self::new("scheduler dropped")
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl fmt::Display for AbortReason {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

impl From<&str> for AbortReason {
	fn from(value: &str) -> Self {
		Self::new(value)
	}
}

impl From<String> for AbortReason {
	fn from(value: String) -> Self {
		Self::new(value)
	}
}
