//! Field and form introspection contract.
//!
//! The revalidation core never touches a document directly. Everything it
//! needs to know about fields, forms, selectors and declarative attributes
//! comes through [`FormHost`].

use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use tokio::sync::broadcast;

use crate::abort::AbortReason;
use crate::destination::Method;
use crate::element::ElementId;
use crate::headers::Headers;
use crate::options::OptionLayer;
use crate::params::Params;

/// Value of the nearest per-field validation attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidateAttr {
	/// Validation explicitly switched off (`up-validate="false"`).
	Disabled,
	/// Validation on, without an explicit target.
	Enabled,
	/// Validation on, updating the given selector list.
	Target(String),
}

/// A field's structural group (label, input and help text container).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupMatch {
	pub element: ElementId,
	/// Target for the group; usually `<group selector>:has(:origin)`.
	pub target: String,
}

/// Where a form submits to, plus form-wide request defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormDestination {
	pub method: Method,
	pub url: String,
	pub params: Params,
	pub headers: Headers,
	pub content_type: Option<String>,
}

/// Events a host delivers for one form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostEvent {
	/// A DOM event of the given type fired on a field of the form.
	Field { field: ElementId, event: String },
	/// The form left the document.
	Removed,
}

/// Runs inline, on the aborting caller's stack, when pending work targeting a
/// form is aborted.
pub type AbortHook = Arc<dyn Fn(&AbortReason) + Send + Sync>;

/// Keeps an [`AbortHook`] registered. Dropping it unregisters the hook.
#[must_use = "dropping the registration unregisters the abort hook"]
pub struct AbortRegistration {
	unregister: Option<Box<dyn FnOnce() + Send>>,
}

impl AbortRegistration {
	pub fn new(unregister: impl FnOnce() + Send + 'static) -> Self {
		Self {
			unregister: Some(Box::new(unregister)),
		}
	}
}

impl fmt::Debug for AbortRegistration {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("AbortRegistration")
			.field("registered", &self.unregister.is_some())
			.finish()
	}
}

impl Drop for AbortRegistration {
	fn drop(&mut self) {
		if let Some(unregister) = self.unregister.take() {
			unregister();
		}
	}
}

/// Introspection surface of the document hosting a form.
pub trait FormHost: Send + Sync + 'static {
	/// Whether the element is a form field.
	fn is_field(&self, element: ElementId) -> bool;

	/// Fields at or below `container`, in document order.
	///
	/// A field passed as container yields itself.
	fn fields(&self, container: ElementId) -> Vec<ElementId>;

	/// The field's submission name.
	fn field_name(&self, field: ElementId) -> Option<String>;

	/// Nearest ancestor-or-self validation attribute of a field.
	fn validate_attr(&self, field: ElementId) -> Option<ValidateAttr>;

	/// The field's enclosing structural group.
	fn group_of(&self, field: ElementId) -> Option<GroupMatch>;

	/// First element matching `selector`, preferring matches near `origin`.
	///
	/// The selector has its origin references already resolved.
	fn query(&self, selector: &str, origin: ElementId) -> Option<ElementId>;

	/// A selector string that targets `element`.
	fn to_target(&self, element: ElementId) -> String;

	/// Attribute-derived options for `element` (inherited from ancestors
	/// below its form, the element's own attributes winning).
	fn option_layer(&self, element: ElementId) -> OptionLayer;

	/// Destination and request defaults of a form.
	fn destination(&self, form: ElementId) -> FormDestination;

	/// Data currently attached to an element.
	fn data(&self, element: ElementId) -> Option<Value>;

	/// Subscribes to field and removal events of a form.
	fn subscribe(&self, form: ElementId) -> broadcast::Receiver<HostEvent>;

	/// Registers `hook` to run synchronously whenever pending work targeting
	/// `form` is aborted.
	///
	/// Unlike [`subscribe`](Self::subscribe), delivery never waits for a task
	/// to be scheduled and cannot be lost to a lagging receiver.
	fn on_abort(&self, form: ElementId, hook: AbortHook) -> AbortRegistration;
}
