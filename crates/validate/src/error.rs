use thiserror::Error;
use tokio::task::JoinHandle;
use wireform_primitives::AbortReason;
use wireform_worker::{TaskClass, spawn};

use crate::solution::ValidationHandle;

/// Validation failures.
///
/// `Clone` so one pass outcome can reject every caller in its batch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidateError {
	#[error("validation aborted: {0}")]
	Aborted(AbortReason),

	#[error("validation target `{0}` does not match an element")]
	SelectorMismatch(String),

	#[error("render transport failed: {0}")]
	Transport(String),

	#[error("render failed: {0}")]
	Render(String),
}

impl ValidateError {
	pub fn is_abort(&self) -> bool {
		matches!(self, Self::Aborted(_))
	}
}

pub type Result<T> = std::result::Result<T, ValidateError>;

/// Observes a validation nobody awaits, logging its rejection.
///
/// Aborts are routine (the form moved on) and log at debug; other failures
/// log at warn.
pub fn mute_uncritical_rejection(handle: ValidationHandle) -> JoinHandle<()> {
	spawn(TaskClass::Background, async move {
		match handle.await {
			Ok(_) => {}
			Err(err) if err.is_abort() => tracing::debug!(%err, "validate.rejection_muted"),
			Err(err) => tracing::warn!(%err, "validate.rejection"),
		}
	})
}
