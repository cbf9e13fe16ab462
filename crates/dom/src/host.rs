use serde_json::Value;
use tokio::sync::broadcast;
use wireform_primitives::{
	AbortHook, AbortRegistration, ElementId, FormDestination, FormHost, GroupMatch, Headers, HostEvent, Method,
	OptionLayer, Params, ValidateAttr,
};

use crate::attrs;
use crate::document::{Document, Tree};
use crate::selector::SelectorList;

/// Containers that make up a field group, innermost first.
const GROUP_SELECTORS: [&str; 4] = ["[up-form-group]", "fieldset", "label", "form"];

const NON_FIELD_INPUTS: [&str; 4] = ["submit", "button", "reset", "image"];

fn is_field(tree: &Tree, element: ElementId) -> bool {
	let Some(node) = tree.node(element) else {
		return false;
	};
	match node.tag.as_str() {
		"select" | "textarea" => true,
		"input" => !node.attr("type").is_some_and(|ty| NON_FIELD_INPUTS.contains(&ty.to_ascii_lowercase().as_str())),
		_ => false,
	}
}

fn escape_attr(value: &str) -> String {
	value.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Best selector for `element`, most specific attribute first.
fn target_for(tree: &Tree, element: ElementId) -> String {
	let Some(node) = tree.node(element) else {
		return String::new();
	};
	if let Some(up_id) = node.attr("up-id") {
		return format!("[up-id=\"{}\"]", escape_attr(up_id));
	}
	if let Some(id) = node.attr("id").filter(|id| !id.is_empty()) {
		return format!("#{id}");
	}
	if let Some(name) = node.attr("name").filter(|_| node.tag != "form") {
		return format!("{}[name=\"{}\"]", node.tag, escape_attr(name));
	}
	if let Some(classes) = node.attr("class").filter(|c| !c.trim().is_empty()) {
		let mut target = node.tag.clone();
		for class in classes.split_whitespace().filter(|c| !c.starts_with("up-")) {
			target.push('.');
			target.push_str(class);
		}
		if target != node.tag {
			return target;
		}
	}
	if node.tag == "form"
		&& let Some(action) = node.attr("action")
	{
		return format!("form[action=\"{}\"]", escape_attr(action));
	}
	node.tag.clone()
}

impl FormHost for Document {
	fn is_field(&self, element: ElementId) -> bool {
		is_field(&self.tree(), element)
	}

	fn fields(&self, container: ElementId) -> Vec<ElementId> {
		let tree = self.tree();
		if is_field(&tree, container) {
			return vec![container];
		}
		tree.descendants(container).into_iter().filter(|&el| is_field(&tree, el)).collect()
	}

	fn field_name(&self, field: ElementId) -> Option<String> {
		self.attr(field, "name").filter(|name| !name.is_empty())
	}

	fn validate_attr(&self, field: ElementId) -> Option<ValidateAttr> {
		let tree = self.tree();
		tree.ancestors_or_self(field).into_iter().find_map(|el| {
			let value = tree.node(el)?.attr("up-validate")?;
			Some(match value.trim() {
				"false" => ValidateAttr::Disabled,
				"" | "true" => ValidateAttr::Enabled,
				target => ValidateAttr::Target(target.to_string()),
			})
		})
	}

	fn group_of(&self, field: ElementId) -> Option<GroupMatch> {
		let tree = self.tree();
		let form = tree.closest_tag(field, "form");
		for raw in GROUP_SELECTORS {
			let Ok(selector) = SelectorList::parse(raw) else {
				continue;
			};
			let Some(element) = tree.closest(field, &selector) else {
				continue;
			};
			// Groups never extend past the field's own form.
			if let Some(form) = form
				&& element != form
				&& !tree.ancestors_or_self(element).contains(&form)
			{
				continue;
			}
			let target = match tree.node(element).and_then(|n| n.attr("id")).filter(|id| !id.is_empty()) {
				Some(id) => format!("#{id}"),
				None => format!("{raw}:has(:origin)"),
			};
			return Some(GroupMatch { element, target });
		}
		None
	}

	fn query(&self, selector: &str, origin: ElementId) -> Option<ElementId> {
		let parsed = match SelectorList::parse(selector) {
			Ok(parsed) => parsed,
			Err(err) => {
				tracing::warn!(selector, %err, "dom.query_invalid");
				return None;
			}
		};
		let tree = self.tree();
		let matches = tree.query_all(&parsed);
		let form = tree.closest_tag(origin, "form");
		form.and_then(|form| matches.iter().copied().find(|&el| el == form || tree.ancestors_or_self(el).contains(&form)))
			.or_else(|| matches.first().copied())
	}

	fn to_target(&self, element: ElementId) -> String {
		target_for(&self.tree(), element)
	}

	fn option_layer(&self, element: ElementId) -> OptionLayer {
		let tree = self.tree();
		let mut layer = OptionLayer::default();
		for el in tree.ancestors_or_self(element) {
			let Some(node) = tree.node(el) else {
				break;
			};
			// A form only contributes to its own layer.
			if node.tag == "form" && el != element {
				break;
			}
			layer = layer.over(attrs::read_layer(node));
			if node.tag == "form" {
				break;
			}
		}
		layer
	}

	fn destination(&self, form: ElementId) -> FormDestination {
		let tree = self.tree();
		let Some(node) = tree.node(form) else {
			return FormDestination {
				method: Method::Get,
				url: self.location().to_string(),
				params: Params::new(),
				headers: Headers::new(),
				content_type: None,
			};
		};
		let method = node
			.attr("up-method")
			.or_else(|| node.attr("method"))
			.and_then(|raw| {
				raw.parse::<Method>()
					.map_err(|err| tracing::warn!(%form, %err, "dom.form_method_invalid"))
					.ok()
			})
			.unwrap_or_default();
		let url = node.attr("action").filter(|a| !a.is_empty()).unwrap_or(self.location()).to_string();
		FormDestination {
			method,
			url,
			params: attrs::params_attr(node, "up-params").unwrap_or_default(),
			headers: attrs::headers_attr(node, "up-headers").unwrap_or_default(),
			content_type: node.attr("enctype").map(str::to_string),
		}
	}

	fn data(&self, element: ElementId) -> Option<Value> {
		let tree = self.tree();
		let node = tree.node(element)?;
		node.data.clone().or_else(|| attrs::json_attr(node, "up-data"))
	}

	fn subscribe(&self, form: ElementId) -> broadcast::Receiver<HostEvent> {
		self.channel(form)
	}

	fn on_abort(&self, form: ElementId, hook: AbortHook) -> AbortRegistration {
		self.register_abort_hook(form, hook)
	}
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;
	use serde_json::json;
	use std::time::Duration;
	use wireform_primitives::Disable;

	use super::*;

	struct Fixture {
		doc: Document,
		form: ElementId,
		group: ElementId,
		email: ElementId,
		password: ElementId,
	}

	fn fixture() -> Fixture {
		let doc = Document::new("/signup");
		let form = doc
			.append(
				doc.body(),
				"form",
				&[("action", "/users"), ("method", "post"), ("up-validate-delay", "200")],
			)
			.unwrap();
		let group = doc.append(form, "fieldset", &[("up-validate-batch", "false")]).unwrap();
		let email = doc
			.append(group, "input", &[("name", "email"), ("up-validate", ""), ("up-validate-delay", "50")])
			.unwrap();
		let password = doc.append(form, "input", &[("name", "password"), ("type", "password")]).unwrap();
		doc.append(form, "input", &[("type", "submit")]).unwrap();
		Fixture {
			doc,
			form,
			group,
			email,
			password,
		}
	}

	#[test]
	fn fields_skip_buttons() {
		let f = fixture();
		assert_eq!(f.doc.fields(f.form), vec![f.email, f.password]);
		assert_eq!(f.doc.fields(f.email), vec![f.email]);
		assert!(!f.doc.is_field(f.group));
	}

	#[test]
	fn validate_attr_is_inherited() {
		let f = fixture();
		assert_eq!(f.doc.validate_attr(f.email), Some(ValidateAttr::Enabled));
		assert_eq!(f.doc.validate_attr(f.password), None);

		f.doc.set_attr(f.form, "up-validate", "false").unwrap();
		assert_eq!(f.doc.validate_attr(f.password), Some(ValidateAttr::Disabled));
		f.doc.set_attr(f.password, "up-validate", ".strength").unwrap();
		assert_eq!(f.doc.validate_attr(f.password), Some(ValidateAttr::Target(".strength".into())));
	}

	#[test]
	fn group_falls_back_to_has_origin() {
		let f = fixture();
		assert_eq!(
			f.doc.group_of(f.email),
			Some(GroupMatch {
				element: f.group,
				target: "fieldset:has(:origin)".into()
			})
		);
		f.doc.set_attr(f.group, "id", "contact").unwrap();
		assert_eq!(f.doc.group_of(f.email).map(|g| g.target), Some("#contact".into()));
		assert_eq!(f.doc.group_of(f.password).map(|g| g.element), Some(f.form));
	}

	#[test]
	fn targets_prefer_stable_attributes() {
		let f = fixture();
		assert_eq!(f.doc.to_target(f.email), "input[name=\"email\"]");
		assert_eq!(f.doc.to_target(f.form), "form[action=\"/users\"]");
		f.doc.set_attr(f.form, "id", "signup").unwrap();
		assert_eq!(f.doc.to_target(f.form), "#signup");
		assert_eq!(f.doc.to_target(f.group), "fieldset");
	}

	#[test]
	fn query_prefers_origin_form() {
		let f = fixture();
		let other = f.doc.append(f.doc.body(), "form", &[]).unwrap();
		let outside = f.doc.append(other, "input", &[("name", "email")]).unwrap();
		// `outside` comes later in document order but the origin form wins.
		assert_eq!(f.doc.query("input[name=\"email\"]", f.password), Some(f.email));
		assert_eq!(f.doc.query("input[name=\"email\"]", outside), Some(outside));
		assert_eq!(f.doc.query("input[", f.password), None);
	}

	#[test]
	fn option_layer_stops_at_form() {
		let f = fixture();
		let layer = f.doc.option_layer(f.email);
		assert_eq!(layer.delay, Some(Duration::from_millis(50)));
		assert_eq!(layer.batch, Some(false));

		// The form's own delay only shows on the form layer.
		assert_eq!(f.doc.option_layer(f.password).delay, None);
		assert_eq!(f.doc.option_layer(f.form).delay, Some(Duration::from_millis(200)));

		f.doc.set_attr(f.group, "up-watch-disable", "").unwrap();
		assert_eq!(f.doc.option_layer(f.email).disable, Some(Disable::Form));
	}

	#[test]
	fn destination_reads_form_attributes() {
		let f = fixture();
		f.doc.set_attr(f.form, "up-params", r#"{"locale": "en"}"#).unwrap();
		f.doc.set_attr(f.form, "up-headers", r#"{"X-Tenant": "acme"}"#).unwrap();
		let dest = f.doc.destination(f.form);
		assert_eq!(dest.method, Method::Post);
		assert_eq!(dest.url, "/users");
		assert_eq!(dest.params.get("locale"), Some("en"));
		assert_eq!(dest.headers.get("x-tenant"), Some("acme"));

		f.doc.remove_attr(f.form, "action").unwrap();
		assert_eq!(f.doc.destination(f.form).url, "/signup");
	}

	#[test]
	fn attached_data_wins_over_attribute() {
		let f = fixture();
		f.doc.set_attr(f.group, "up-data", r#"{"step": 1}"#).unwrap();
		assert_eq!(f.doc.data(f.group), Some(json!({ "step": 1 })));
		f.doc.set_data(f.group, json!({ "step": 2 })).unwrap();
		assert_eq!(f.doc.data(f.group), Some(json!({ "step": 2 })));
		assert_eq!(f.doc.data(f.email), None);
	}
}
