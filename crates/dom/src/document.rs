use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::{Mutex, RwLock};
use serde_json::Value;
use tokio::sync::broadcast;
use wireform_primitives::{AbortHook, AbortReason, AbortRegistration, ElementId, HostEvent};

use crate::error::{DomError, Result};
use crate::selector::SelectorList;

/// Capacity of each form's event channel.
const EVENT_BUFFER: usize = 64;

#[derive(Debug, Clone)]
pub(crate) struct Node {
	pub(crate) tag: String,
	pub(crate) attrs: IndexMap<String, String>,
	pub(crate) parent: Option<ElementId>,
	pub(crate) children: Vec<ElementId>,
	pub(crate) data: Option<Value>,
}

impl Node {
	pub(crate) fn new(tag: &str) -> Self {
		Self {
			tag: tag.to_ascii_lowercase(),
			attrs: IndexMap::new(),
			parent: None,
			children: Vec::new(),
			data: None,
		}
	}

	pub(crate) fn attr(&self, name: &str) -> Option<&str> {
		self.attrs.get(name).map(String::as_str)
	}

	pub(crate) fn has_class(&self, class: &str) -> bool {
		self.attr("class").is_some_and(|classes| classes.split_whitespace().any(|c| c == class))
	}
}

#[derive(Debug)]
pub(crate) struct Tree {
	nodes: HashMap<ElementId, Node>,
	root: ElementId,
	next_id: u64,
}

impl Tree {
	fn new() -> Self {
		let root = ElementId(0);
		let mut nodes = HashMap::new();
		nodes.insert(root, Node::new("body"));
		Self { nodes, root, next_id: 1 }
	}

	pub(crate) fn node(&self, id: ElementId) -> Option<&Node> {
		self.nodes.get(&id)
	}

	pub(crate) fn parent(&self, id: ElementId) -> Option<ElementId> {
		self.node(id).and_then(|n| n.parent)
	}

	/// Descendants of `id` in document order, excluding `id`.
	pub(crate) fn descendants(&self, id: ElementId) -> Vec<ElementId> {
		let mut out = Vec::new();
		let mut stack: Vec<ElementId> = self.node(id).map(|n| n.children.iter().rev().copied().collect()).unwrap_or_default();
		while let Some(next) = stack.pop() {
			out.push(next);
			if let Some(node) = self.node(next) {
				stack.extend(node.children.iter().rev().copied());
			}
		}
		out
	}

	/// `id` followed by its ancestors up to the root.
	pub(crate) fn ancestors_or_self(&self, id: ElementId) -> Vec<ElementId> {
		let mut chain = Vec::new();
		let mut cursor = self.node(id).map(|_| id);
		while let Some(current) = cursor {
			chain.push(current);
			cursor = self.parent(current);
		}
		chain
	}

	pub(crate) fn is_attached(&self, id: ElementId) -> bool {
		self.ancestors_or_self(id).last() == Some(&self.root)
	}

	pub(crate) fn closest(&self, id: ElementId, selector: &SelectorList) -> Option<ElementId> {
		self.ancestors_or_self(id).into_iter().find(|&el| selector.matches(self, el))
	}

	pub(crate) fn closest_tag(&self, id: ElementId, tag: &str) -> Option<ElementId> {
		self.ancestors_or_self(id).into_iter().find(|&el| self.node(el).is_some_and(|n| n.tag == tag))
	}

	pub(crate) fn query_all(&self, selector: &SelectorList) -> Vec<ElementId> {
		self.descendants(self.root).into_iter().filter(|&el| selector.matches(self, el)).collect()
	}

	fn node_mut(&mut self, id: ElementId) -> Result<&mut Node> {
		self.nodes.get_mut(&id).ok_or(DomError::UnknownElement(id))
	}
}

#[derive(Default)]
struct AbortHooks {
	next_id: u64,
	by_form: HashMap<ElementId, Vec<(u64, AbortHook)>>,
}

impl AbortHooks {
	fn remove(&mut self, form: ElementId, id: u64) {
		if let Some(hooks) = self.by_form.get_mut(&form) {
			hooks.retain(|(hook_id, _)| *hook_id != id);
			if hooks.is_empty() {
				self.by_form.remove(&form);
			}
		}
	}
}

impl fmt::Debug for AbortHooks {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let hooks: usize = self.by_form.values().map(Vec::len).sum();
		f.debug_struct("AbortHooks").field("hooks", &hooks).finish_non_exhaustive()
	}
}

/// In-memory element tree with per-form event channels and abort hooks.
#[derive(Debug)]
pub struct Document {
	location: String,
	tree: RwLock<Tree>,
	channels: Mutex<HashMap<ElementId, broadcast::Sender<HostEvent>>>,
	abort_hooks: Arc<Mutex<AbortHooks>>,
}

impl Document {
	/// Creates an empty document whose `<body>` is [`Self::body`].
	///
	/// `location` is the URL forms without an `action` submit to.
	pub fn new(location: impl Into<String>) -> Self {
		Self {
			location: location.into(),
			tree: RwLock::new(Tree::new()),
			channels: Mutex::new(HashMap::new()),
			abort_hooks: Arc::default(),
		}
	}

	pub fn body(&self) -> ElementId {
		self.tree.read().root
	}

	pub fn location(&self) -> &str {
		&self.location
	}

	/// Appends a new element with attributes as the last child of `parent`.
	pub fn append(&self, parent: ElementId, tag: &str, attrs: &[(&str, &str)]) -> Result<ElementId> {
		let mut tree = self.tree.write();
		let id = ElementId(tree.next_id);
		tree.node_mut(parent)?.children.push(id);
		tree.next_id += 1;

		let mut node = Node::new(tag);
		node.parent = Some(parent);
		for (name, value) in attrs {
			node.attrs.insert((*name).to_string(), (*value).to_string());
		}
		tree.nodes.insert(id, node);
		Ok(id)
	}

	pub fn tag(&self, element: ElementId) -> Option<String> {
		self.tree.read().node(element).map(|n| n.tag.clone())
	}

	pub fn attr(&self, element: ElementId, name: &str) -> Option<String> {
		self.tree.read().node(element).and_then(|n| n.attr(name)).map(str::to_string)
	}

	pub fn set_attr(&self, element: ElementId, name: &str, value: &str) -> Result<()> {
		self.tree.write().node_mut(element)?.attrs.insert(name.to_string(), value.to_string());
		Ok(())
	}

	pub fn remove_attr(&self, element: ElementId, name: &str) -> Result<Option<String>> {
		Ok(self.tree.write().node_mut(element)?.attrs.shift_remove(name))
	}

	/// Attaches structured data to an element, replacing any `up-data` attribute value.
	pub fn set_data(&self, element: ElementId, data: Value) -> Result<()> {
		self.tree.write().node_mut(element)?.data = Some(data);
		Ok(())
	}

	pub fn parent(&self, element: ElementId) -> Option<ElementId> {
		self.tree.read().parent(element)
	}

	pub fn children(&self, element: ElementId) -> Vec<ElementId> {
		self.tree.read().node(element).map(|n| n.children.clone()).unwrap_or_default()
	}

	/// Whether the element is still attached under the body.
	pub fn is_attached(&self, element: ElementId) -> bool {
		self.tree.read().is_attached(element)
	}

	pub fn matches(&self, element: ElementId, selector: &str) -> Result<bool> {
		let selector = SelectorList::parse(selector)?;
		Ok(selector.matches(&self.tree.read(), element))
	}

	pub fn closest(&self, element: ElementId, selector: &str) -> Result<Option<ElementId>> {
		let selector = SelectorList::parse(selector)?;
		Ok(self.tree.read().closest(element, &selector))
	}

	/// All attached elements matching `selector`, in document order.
	pub fn query_all(&self, selector: &str) -> Result<Vec<ElementId>> {
		let selector = SelectorList::parse(selector)?;
		Ok(self.tree.read().query_all(&selector))
	}

	/// The form enclosing an element (or the element itself).
	pub fn form_of(&self, element: ElementId) -> Option<ElementId> {
		self.tree.read().closest_tag(element, "form")
	}

	/// Detaches an element and its subtree.
	///
	/// Forms inside the subtree receive [`HostEvent::Removed`].
	pub fn remove(&self, element: ElementId) -> Result<()> {
		let removed_forms = {
			let mut tree = self.tree.write();
			let parent = tree.node_mut(element)?.parent.take();
			if let Some(parent) = parent {
				tree.node_mut(parent)?.children.retain(|&c| c != element);
			}
			let mut subtree = vec![element];
			subtree.extend(tree.descendants(element));
			subtree.into_iter().filter(|&el| tree.node(el).is_some_and(|n| n.tag == "form")).collect::<Vec<_>>()
		};
		for form in removed_forms {
			tracing::debug!(%form, "dom.form_removed");
			self.emit(form, HostEvent::Removed);
		}
		Ok(())
	}

	/// Fires a DOM event of type `event` on a field.
	///
	/// Returns false when the field is outside a form or nobody listens.
	pub fn dispatch(&self, field: ElementId, event: &str) -> bool {
		let Some(form) = self.form_of(field) else {
			return false;
		};
		self.emit(
			form,
			HostEvent::Field {
				field,
				event: event.to_string(),
			},
		)
	}

	/// Aborts pending work targeting a form.
	///
	/// Every abort hook of the form runs before this returns. Returns false
	/// when no hook is registered.
	pub fn abort(&self, form: ElementId, reason: impl Into<AbortReason>) -> bool {
		let reason = reason.into();
		let hooks: Vec<AbortHook> = self
			.abort_hooks
			.lock()
			.by_form
			.get(&form)
			.map(|hooks| hooks.iter().map(|(_, hook)| hook.clone()).collect())
			.unwrap_or_default();
		tracing::debug!(%form, %reason, hooks = hooks.len(), "dom.form_aborted");
		for hook in &hooks {
			hook(&reason);
		}
		!hooks.is_empty()
	}

	pub(crate) fn register_abort_hook(&self, form: ElementId, hook: AbortHook) -> AbortRegistration {
		let id = {
			let mut hooks = self.abort_hooks.lock();
			hooks.next_id += 1;
			let id = hooks.next_id;
			hooks.by_form.entry(form).or_default().push((id, hook));
			id
		};
		let hooks = Arc::downgrade(&self.abort_hooks);
		AbortRegistration::new(move || {
			if let Some(hooks) = hooks.upgrade() {
				hooks.lock().remove(form, id);
			}
		})
	}

	pub(crate) fn tree(&self) -> parking_lot::RwLockReadGuard<'_, Tree> {
		self.tree.read()
	}

	pub(crate) fn channel(&self, form: ElementId) -> broadcast::Receiver<HostEvent> {
		self.channels
			.lock()
			.entry(form)
			.or_insert_with(|| broadcast::channel(EVENT_BUFFER).0)
			.subscribe()
	}

	fn emit(&self, form: ElementId, event: HostEvent) -> bool {
		let channels = self.channels.lock();
		match channels.get(&form) {
			Some(tx) => tx.send(event).is_ok(),
			None => false,
		}
	}
}
