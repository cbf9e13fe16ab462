mod support;

use std::time::Duration;

use pretty_assertions::assert_eq;
use support::signup_form;
use wireform_validate::{SolutionResolver, ValidateConfig, ValidateError, ValidateOptions};

fn targets(solutions: &[wireform_validate::Solution]) -> Vec<&str> {
	solutions.iter().map(|s| s.target.as_str()).collect()
}

#[test]
fn explicit_target_is_split_and_resolved_per_selector() {
	let f = signup_form();
	let config = ValidateConfig::default();
	let resolver = SolutionResolver::new(&*f.doc, f.form, &config);

	let solutions = resolver.resolve(&ValidateOptions::new().target(".results, #contact")).unwrap();
	assert_eq!(targets(&solutions), vec![".results", "#contact"]);
	assert_eq!(solutions[0].element, f.results);
	assert_eq!(solutions[1].element, f.contact);
	assert!(solutions.iter().all(|s| s.origin == f.form));
}

#[test]
fn mismatching_selectors_are_dropped() {
	let f = signup_form();
	let config = ValidateConfig::default();
	let resolver = SolutionResolver::new(&*f.doc, f.form, &config);

	let solutions = resolver.resolve(&ValidateOptions::new().target(".results, .nope")).unwrap();
	assert_eq!(targets(&solutions), vec![".results"]);

	let err = resolver.resolve(&ValidateOptions::new().target(".nope, .gone")).unwrap_err();
	assert_eq!(err, ValidateError::SelectorMismatch(".nope, .gone".into()));
}

#[test]
fn origin_references_are_substituted() {
	let f = signup_form();
	let config = ValidateConfig::default();
	let resolver = SolutionResolver::new(&*f.doc, f.form, &config);

	let solutions = resolver
		.resolve(&ValidateOptions::new().origin(f.email).target("fieldset:has(:origin)"))
		.unwrap();
	assert_eq!(targets(&solutions), vec!["fieldset:has(input[name=\"email\"])"]);
	assert_eq!(solutions[0].element, f.contact);
}

#[test]
fn field_uses_its_validate_target() {
	let f = signup_form();
	let config = ValidateConfig::default();
	let resolver = SolutionResolver::new(&*f.doc, f.form, &config);

	let solutions = resolver.resolve(&ValidateOptions::new().origin(f.email)).unwrap();
	assert_eq!(targets(&solutions), vec![".results"]);
	assert_eq!(solutions[0].origin, f.email);
	assert_eq!(solutions[0].element, f.results);
}

#[test]
fn field_without_target_falls_back_to_group() {
	let f = signup_form();
	let config = ValidateConfig::default();
	let resolver = SolutionResolver::new(&*f.doc, f.form, &config);

	let solutions = resolver.resolve(&ValidateOptions::new().origin(f.password)).unwrap();
	assert_eq!(targets(&solutions), vec!["fieldset:has(input[name=\"password\"])"]);
	assert_eq!(solutions[0].element, f.credentials);

	let solutions = resolver
		.resolve(&ValidateOptions::new().origin(f.password).form_group(false))
		.unwrap();
	assert_eq!(targets(&solutions), vec!["input[name=\"password\"]"]);
	assert_eq!(solutions[0].element, f.password);
}

#[test]
fn group_with_id_targets_the_id() {
	let f = signup_form();
	f.doc.remove_attr(f.name, "up-validate").unwrap();
	let config = ValidateConfig::default();
	let resolver = SolutionResolver::new(&*f.doc, f.form, &config);

	let solutions = resolver.resolve(&ValidateOptions::new().origin(f.name)).unwrap();
	assert_eq!(targets(&solutions), vec!["#contact"]);
}

#[test]
fn non_field_origin_targets_itself() {
	let f = signup_form();
	let config = ValidateConfig::default();
	let resolver = SolutionResolver::new(&*f.doc, f.form, &config);

	let solutions = resolver.resolve(&ValidateOptions::new().origin(f.results)).unwrap();
	assert_eq!(targets(&solutions), vec!["div.results"]);
	assert_eq!(solutions[0].origin, f.results);
}

#[test]
fn options_layer_call_site_over_attributes_over_form() {
	let f = signup_form();
	f.doc.set_attr(f.form, "up-validate-batch", "false").unwrap();
	f.doc.set_attr(f.form, "up-validate-delay", "700").unwrap();
	let config = ValidateConfig::default();
	let resolver = SolutionResolver::new(&*f.doc, f.form, &config);

	let password = resolver.resolve(&ValidateOptions::new().origin(f.password)).unwrap().remove(0);
	assert_eq!(password.options.delay, Duration::from_millis(100));
	assert!(!password.batch);
	assert_eq!(password.destination.to_string(), "POST /users");

	let quick = resolver
		.resolve(&ValidateOptions::new().origin(f.password).delay(Duration::from_millis(5)).batch(true))
		.unwrap()
		.remove(0);
	assert_eq!(quick.options.delay, Duration::from_millis(5));
	assert!(quick.batch);

	let email = resolver.resolve(&ValidateOptions::new().origin(f.email)).unwrap().remove(0);
	assert_eq!(email.options.delay, Duration::from_millis(700));
}
