use std::fmt;

/// Opaque handle to an element owned by the host document.
///
/// Handles are referenced, never owned: a handle may outlive the element it
/// names, in which case host lookups on it simply find nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(pub u64);

impl ElementId {
	/// Returns the raw numeric id.
	pub const fn get(self) -> u64 {
		self.0
	}
}

impl fmt::Display for ElementId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "element#{}", self.0)
	}
}
