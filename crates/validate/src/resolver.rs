use wireform_primitives::{ElementId, FormHost, ValidateAttr, resolve_origin, split_target};

use crate::config::ValidateConfig;
use crate::error::{Result, ValidateError};
use crate::solution::{Deferred, Solution, SolutionOptions, ValidateOptions};

/// A solution before options are layered onto it.
#[derive(Debug)]
struct Candidate {
	element: ElementId,
	target: String,
	origin: ElementId,
}

/// Turns a validation trigger into solutions.
///
/// The first applicable strategy wins: an explicit target, then the
/// field's `up-validate` selector or its form group, then the origin
/// element itself.
pub struct SolutionResolver<'a> {
	host: &'a dyn FormHost,
	form: ElementId,
	config: &'a ValidateConfig,
}

impl<'a> SolutionResolver<'a> {
	pub fn new(host: &'a dyn FormHost, form: ElementId, config: &'a ValidateConfig) -> Self {
		Self { host, form, config }
	}

	/// Resolves `options` into solutions sharing one deferred.
	///
	/// Fails with [`ValidateError::SelectorMismatch`] when an explicit target
	/// matches nothing at all.
	pub fn resolve(&self, options: &ValidateOptions) -> Result<Vec<Solution>> {
		let origin = options.origin.unwrap_or(self.form);
		let candidates = match &options.target {
			Some(target) => self.target_candidates(target, origin)?,
			None => match self.field_candidates(origin, options)? {
				Some(candidates) => candidates,
				None => self.element_candidates(origin),
			},
		};

		let destination = self.host.destination(self.form);
		let form_layer = self.host.option_layer(self.form);
		let deferred = Deferred::new();
		let solutions = candidates
			.into_iter()
			.map(|candidate| {
				let mut layer = options.layer.clone().over(self.host.option_layer(candidate.origin));
				if candidate.origin != self.form {
					layer = layer.over(form_layer.clone());
				}
				let (solution_options, batch) = SolutionOptions::layered(layer, self.config, &destination);
				let target = resolve_origin(&candidate.target, || self.host.to_target(candidate.origin));
				tracing::trace!(%target, origin = %candidate.origin, batch, "validate.solution");
				Solution {
					element: candidate.element,
					target,
					origin: candidate.origin,
					destination: solution_options.destination(),
					options: solution_options,
					batch,
					deferred: deferred.clone(),
				}
			})
			.collect();
		Ok(solutions)
	}

	fn target_candidates(&self, target: &str, origin: ElementId) -> Result<Vec<Candidate>> {
		tracing::debug!(target, "validate.resolve_target");
		let mut candidates = Vec::new();
		let mut missing = Vec::new();
		for selector in split_target(target) {
			let resolved = resolve_origin(&selector, || self.host.to_target(origin));
			match self.host.query(&resolved, origin) {
				Some(element) => candidates.push(Candidate {
					element,
					target: selector,
					origin,
				}),
				None => {
					tracing::warn!(selector = %resolved, "validate.target_mismatch");
					missing.push(selector);
				}
			}
		}
		if candidates.is_empty() {
			let selector = if missing.is_empty() { target.to_string() } else { missing.join(", ") };
			return Err(ValidateError::SelectorMismatch(selector));
		}
		Ok(candidates)
	}

	fn field_candidates(&self, origin: ElementId, options: &ValidateOptions) -> Result<Option<Vec<Candidate>>> {
		if !self.host.is_field(origin) {
			return Ok(None);
		}
		if let Some(ValidateAttr::Target(target)) = self.host.validate_attr(origin) {
			return self.target_candidates(&target, origin).map(Some);
		}
		if !options.form_group.unwrap_or(self.config.form_group) {
			return Ok(None);
		}
		Ok(self.host.group_of(origin).map(|group| {
			tracing::debug!(field = %origin, group = %group.element, "validate.resolve_group");
			vec![Candidate {
				element: group.element,
				target: group.target,
				origin,
			}]
		}))
	}

	fn element_candidates(&self, element: ElementId) -> Vec<Candidate> {
		tracing::debug!(%element, "validate.resolve_element");
		vec![Candidate {
			element,
			target: self.host.to_target(element),
			origin: element,
		}]
	}
}
