use thiserror::Error;
use wireform_primitives::AbortReason;

use crate::state::RequestState;

/// Request failures.
///
/// `Clone` so that one source outcome can settle every request tracking it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestError {
	#[error("request aborted: {0}")]
	Aborted(AbortReason),

	#[error("network error: {0}")]
	Network(String),

	#[error("server responded with status {0}")]
	Status(u16),

	/// The following request is already attached to a source or settled.
	#[error("request cannot track: already attached or settled")]
	TrackConflict,

	#[error("invalid request transition: {from} -> {to}")]
	InvalidTransition { from: RequestState, to: RequestState },
}

pub type Result<T> = std::result::Result<T, RequestError>;
