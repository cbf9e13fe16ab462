use indexmap::{IndexMap, IndexSet};
use wireform_primitives::{Disable, ElementId, FocusMode, FormHost, Headers, Params, join_targets, resolve_origin};

use crate::config::ValidateConfig;
use crate::protocol;
use crate::render::{GuardEvent, RenderOptions, VALIDATE_EVENT};
use crate::solution::Solution;

/// Merges a batch of solutions into the options of one render pass.
///
/// The batch's origin becomes the form, so anything origin-relative is
/// resolved per solution here.
pub struct OptionsMerger<'a> {
	host: &'a dyn FormHost,
	form: ElementId,
	config: &'a ValidateConfig,
}

impl<'a> OptionsMerger<'a> {
	pub fn new(host: &'a dyn FormHost, form: ElementId, config: &'a ValidateConfig) -> Self {
		Self { host, form, config }
	}

	pub fn merge(&self, batch: &[Solution]) -> RenderOptions {
		let destination = self.host.destination(self.form);

		let mut fields = Vec::new();
		for solution in batch {
			for field in self.host.fields(solution.origin) {
				if !fields.contains(&field) {
					fields.push(field);
				}
			}
		}
		// Radio groups repeat one name over several inputs.
		let names: IndexSet<String> = fields.iter().filter_map(|&f| self.host.field_name(f)).collect();
		let names: Vec<String> = names.into_iter().collect();

		let params = Params::merge(
			std::iter::once(&destination.params).chain(batch.iter().filter_map(|s| s.options.params.as_ref())),
		);
		let mut headers = Headers::merge(
			std::iter::once(&destination.headers).chain(batch.iter().filter_map(|s| s.options.headers.as_ref())),
		);
		headers.insert(
			protocol::validate_header_name(self.config),
			protocol::validate_header_value(&names, self.config),
		);

		let mut data_map = IndexMap::new();
		let mut preview_map = IndexMap::new();
		let mut placeholder_map = IndexMap::new();
		for solution in batch {
			let data = if solution.options.keep_data {
				self.host.data(solution.element)
			} else {
				solution.options.data.clone()
			};
			if let Some(data) = data {
				data_map.insert(solution.target.clone(), data);
			}
			if let Some(preview) = &solution.options.preview {
				preview_map.insert(solution.target.clone(), preview.clone());
			}
			if let Some(placeholder) = &solution.options.placeholder {
				placeholder_map.insert(solution.target.clone(), placeholder.clone());
			}
		}

		let disable = batch
			.iter()
			.filter_map(|solution| {
				Some(match solution.options.disable.as_ref()? {
					Disable::Form => Disable::Form,
					Disable::Selector(selector) => {
						Disable::Selector(resolve_origin(selector, || self.host.to_target(solution.origin)))
					}
				})
			})
			.collect();

		let (method, url) = match batch.first() {
			Some(head) => (head.options.method, head.options.url.clone()),
			None => (destination.method, destination.url.clone()),
		};

		RenderOptions {
			target: join_targets(batch.iter().map(|s| s.target.as_str())),
			origin: self.form,
			method,
			url,
			content_type: destination.content_type.clone(),
			guard_event: GuardEvent {
				name: VALIDATE_EVENT,
				form: self.form,
				fields,
				params: params.clone(),
				log: "Validating form".to_string(),
			},
			params,
			headers,
			focus: batch.iter().rev().find_map(|s| s.options.focus.clone()).unwrap_or(FocusMode::Keep),
			feedback: batch.iter().any(|s| s.options.feedback),
			data_map,
			preview_map,
			placeholder_map,
			disable,
			tolerate_error_status: true,
			tolerate_missing_target: true,
		}
	}
}
