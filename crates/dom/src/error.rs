use thiserror::Error;
use wireform_primitives::ElementId;

use crate::selector::SelectorError;

/// Errors raised by document operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomError {
	/// The element does not exist (never created, or removed).
	#[error("unknown element: {0}")]
	UnknownElement(ElementId),

	/// A selector failed to parse.
	#[error(transparent)]
	Selector(#[from] SelectorError),
}

/// Result type for document operations.
pub type Result<T> = std::result::Result<T, DomError>;
