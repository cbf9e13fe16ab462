use std::fmt;

/// Lifecycle state of a [`Request`](crate::Request).
///
/// `Tracking` is only entered by attaching to a source request and only left
/// for the source's terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestState {
	/// Created, not yet sent.
	New,
	/// Sent, awaiting a response.
	Loading,
	/// Mirroring the outcome of another request.
	Tracking,
	Resolved,
	Rejected,
	Aborted,
}

impl RequestState {
	pub const fn is_terminal(self) -> bool {
		matches!(self, Self::Resolved | Self::Rejected | Self::Aborted)
	}

	/// Whether the request may still produce a response.
	pub const fn is_in_flight(self) -> bool {
		matches!(self, Self::New | Self::Loading | Self::Tracking)
	}

	pub const fn as_str(self) -> &'static str {
		match self {
			Self::New => "new",
			Self::Loading => "loading",
			Self::Tracking => "tracking",
			Self::Resolved => "resolved",
			Self::Rejected => "rejected",
			Self::Aborted => "aborted",
		}
	}
}

impl fmt::Display for RequestState {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}
