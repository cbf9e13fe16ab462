//! End-to-end revalidation driven by field events on an in-memory form.

mod support;

use std::time::Duration;

use pretty_assertions::assert_eq;
use support::{RecordingPipeline, SignupForm, signup_form};
use wireform_primitives::AbortReason;
use wireform_validate::{SchedulerPhase, ValidateConfig, ValidateError, ValidateOptions, ValidationScheduler};

fn started(f: &SignupForm, latency_ms: u64) -> (ValidationScheduler, std::sync::Arc<RecordingPipeline>) {
	let pipeline = RecordingPipeline::new(Duration::from_millis(latency_ms));
	let scheduler = ValidationScheduler::new(f.form, f.doc.clone(), pipeline.clone(), ValidateConfig::default());
	assert!(scheduler.start());
	(scheduler, pipeline)
}

async fn settle() {
	tokio::time::sleep(Duration::from_secs(1)).await;
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn changes_in_one_tick_render_once() {
	let f = signup_form();
	let (_scheduler, pipeline) = started(&f, 10);

	assert!(f.doc.dispatch(f.email, "change"));
	assert!(f.doc.dispatch(f.name, "change"));
	settle().await;

	let passes = pipeline.passes();
	assert_eq!(passes.len(), 1);
	assert_eq!(passes[0].target, ".results, .results");
	assert_eq!(passes[0].headers.get("X-Up-Validate"), Some("email name"));
	assert_eq!(passes[0].params.get("locale"), Some("en"));
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn only_configured_events_on_validating_fields_count() {
	let f = signup_form();
	let (_scheduler, pipeline) = started(&f, 0);

	f.doc.dispatch(f.email, "input");
	f.doc.dispatch(f.nickname, "change");
	settle().await;
	assert!(pipeline.passes().is_empty());

	f.doc.set_attr(f.name, "up-validate-event", "input").unwrap();
	f.doc.dispatch(f.name, "change");
	settle().await;
	assert!(pipeline.passes().is_empty());

	f.doc.dispatch(f.name, "input");
	settle().await;
	assert_eq!(pipeline.passes().len(), 1);

	f.doc.set_attr(f.contact, "up-validate", "false").unwrap();
	f.doc.remove_attr(f.email, "up-validate").unwrap();
	f.doc.dispatch(f.email, "change");
	settle().await;
	assert_eq!(pipeline.passes().len(), 1);
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn group_validation_honors_field_delay() {
	let f = signup_form();
	let (_scheduler, pipeline) = started(&f, 0);

	f.doc.dispatch(f.password, "change");
	settle().await;

	assert_eq!(pipeline.dispatch_times(), vec![100]);
	assert_eq!(pipeline.passes()[0].target, "fieldset:has(input[name=\"password\"])");
	assert_eq!(pipeline.passes()[0].headers.get("X-Up-Validate"), Some("password"));
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn separate_destinations_render_back_to_back() {
	let f = signup_form();
	let (scheduler, pipeline) = started(&f, 20);

	let a = scheduler
		.validate(ValidateOptions::new().target(".results").url("/a").delay(Duration::from_millis(300)))
		.unwrap();
	tokio::time::sleep(Duration::from_millis(100)).await;
	let b = scheduler
		.validate(ValidateOptions::new().target("#contact").url("/b").delay(Duration::from_millis(50)))
		.unwrap();

	assert!(a.await.is_ok());
	assert!(b.await.is_ok());
	assert_eq!(pipeline.dispatch_times(), vec![150, 170]);
	let urls: Vec<String> = pipeline.passes().into_iter().map(|p| p.url).collect();
	assert_eq!(urls, vec!["/a", "/b"]);
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn host_abort_rejects_queued_validations() {
	let f = signup_form();
	let (scheduler, pipeline) = started(&f, 0);

	let handle = scheduler
		.validate(ValidateOptions::new().origin(f.email).delay(Duration::from_millis(200)))
		.unwrap();
	tokio::time::sleep(Duration::from_millis(50)).await;
	assert!(f.doc.abort(f.form, "navigated away"));

	assert_eq!(handle.await, Err(ValidateError::Aborted(AbortReason::new("navigated away"))));
	settle().await;
	assert!(pipeline.passes().is_empty());
	assert_eq!(scheduler.phase(), SchedulerPhase::Idle);
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn host_abort_in_the_triggering_tick_wins_over_the_timer() {
	let f = signup_form();
	let (scheduler, pipeline) = started(&f, 0);
	tokio::task::yield_now().await;

	let handle = scheduler.validate(ValidateOptions::new().origin(f.email)).unwrap();
	assert!(f.doc.abort(f.form, "navigated away"));
	assert_eq!(scheduler.pending(), 0);
	assert!(!scheduler.is_debouncing());

	assert_eq!(handle.await, Err(ValidateError::Aborted(AbortReason::new("navigated away"))));
	settle().await;
	assert!(pipeline.passes().is_empty());
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn host_abort_survives_a_burst_of_field_events() {
	let f = signup_form();
	let (scheduler, pipeline) = started(&f, 0);

	let handle = scheduler
		.validate(ValidateOptions::new().origin(f.email).delay(Duration::from_millis(200)))
		.unwrap();
	for _ in 0..100 {
		f.doc.dispatch(f.nickname, "input");
	}
	assert!(f.doc.abort(f.form, "navigated away"));

	assert_eq!(handle.await, Err(ValidateError::Aborted(AbortReason::new("navigated away"))));
	settle().await;
	assert!(pipeline.passes().is_empty());
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn removing_the_form_stops_the_scheduler() {
	let f = signup_form();
	let (scheduler, pipeline) = started(&f, 0);

	let handle = scheduler
		.validate(ValidateOptions::new().origin(f.email).delay(Duration::from_millis(200)))
		.unwrap();
	f.doc.remove(f.form).unwrap();

	assert_eq!(handle.await, Err(ValidateError::Aborted(AbortReason::form_removed())));
	assert!(!f.doc.dispatch(f.email, "change"));
	assert!(!f.doc.abort(f.form, "late"));
	settle().await;
	assert!(pipeline.passes().is_empty());

	// The listener is gone, so starting again subscribes afresh.
	assert!(scheduler.start());
}
