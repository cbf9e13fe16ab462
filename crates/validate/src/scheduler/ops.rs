use std::sync::{Arc, Weak};

use tokio::sync::broadcast::{self, error::RecvError};
use tokio_util::sync::CancellationToken;
use wireform_primitives::{AbortReason, ElementId, HostEvent, ValidateAttr};
use wireform_worker::{TaskClass, spawn};

use super::Shared;
use super::state::{Listener, SchedulerState};
use crate::error::{Result, ValidateError, mute_uncritical_rejection};
use crate::merge::OptionsMerger;
use crate::render::pass_outcome;
use crate::resolver::SolutionResolver;
use crate::solution::{ValidateOptions, ValidationHandle};

/// Clears the rendering flag when a pass ends, including on unwind or when
/// the drain future is dropped mid-render.
struct RenderingGuard<'a>(&'a Shared);

impl Drop for RenderingGuard<'_> {
	fn drop(&mut self) {
		self.0.state.lock().rendering = false;
	}
}

impl Shared {
	pub(super) fn validate(self: &Arc<Self>, options: ValidateOptions) -> Result<ValidationHandle> {
		let solutions = SolutionResolver::new(&*self.host, self.form, &self.config).resolve(&options)?;
		let Some(handle) = solutions.first().map(|s| s.deferred.handle()) else {
			return Err(ValidateError::SelectorMismatch(options.target.unwrap_or_default()));
		};

		let mut state = self.state.lock();
		state.queue.extend(solutions);
		self.arm_timer(&mut state);
		Ok(handle)
	}

	/// Re-arms the timer from scratch with the shortest delay in the queue.
	fn arm_timer(self: &Arc<Self>, state: &mut SchedulerState) {
		let delay = state.queue.shortest_delay().unwrap_or_default();
		let weak = Arc::downgrade(self);
		let generation = state.timer.arm(delay, move |generation| async move {
			if let Some(shared) = weak.upgrade() {
				shared.on_timer(generation).await;
			}
		});
		tracing::trace!(form = %self.form, generation, pending = state.queue.len(), "validate.schedule");
	}

	async fn on_timer(self: Arc<Self>, generation: u64) {
		if !self.state.lock().timer.take_fired(generation) {
			tracing::trace!(form = %self.form, generation, "validate.fire_stale");
			return;
		}
		self.drain().await;
	}

	/// Renders batches until a guard stops it.
	async fn drain(&self) {
		loop {
			let batch = {
				let mut state = self.state.lock();
				if state.queue.is_empty() {
					return;
				}
				if state.rendering {
					tracing::trace!(form = %self.form, "validate.drain_busy");
					return;
				}
				if state.timer.is_armed() {
					tracing::trace!(form = %self.form, "validate.drain_debouncing");
					return;
				}
				state.rendering = true;
				state.queue.take_batch()
			};
			let _rendering = RenderingGuard(self);

			let options = OptionsMerger::new(&*self.host, self.form, &self.config).merge(&batch);
			tracing::debug!(
				form = %self.form,
				solutions = batch.len(),
				target = %options.target,
				destination = %batch[0].destination,
				"validate.render"
			);
			let outcome = pass_outcome(self.pipeline.render(options).await);
			if let Err(err) = &outcome {
				tracing::debug!(form = %self.form, %err, "validate.render_failed");
			}
			for solution in &batch {
				solution.deferred.settle(outcome.clone());
			}
		}
	}

	pub(super) fn abort(&self, reason: AbortReason) -> usize {
		let aborted = {
			let mut state = self.state.lock();
			state.timer.clear();
			state.queue.drain_all()
		};
		if aborted.is_empty() {
			return 0;
		}
		tracing::debug!(form = %self.form, solutions = aborted.len(), %reason, "validate.abort");
		for solution in &aborted {
			solution.deferred.settle(Err(ValidateError::Aborted(reason.clone())));
		}
		aborted.len()
	}

	pub(super) fn start(self: &Arc<Self>) -> bool {
		let cancel = CancellationToken::new();
		let events = {
			let mut state = self.state.lock();
			if state.listener.is_some() {
				return false;
			}
			let events = self.host.subscribe(self.form);
			let weak = Arc::downgrade(self);
			let abort_hook = self.host.on_abort(
				self.form,
				Arc::new(move |reason: &AbortReason| {
					if let Some(shared) = weak.upgrade() {
						shared.abort(reason.clone());
					}
				}),
			);
			state.listener = Some(Listener::new(cancel.clone(), abort_hook));
			events
		};
		tracing::debug!(form = %self.form, "validate.start");
		spawn(TaskClass::Background, listen(Arc::downgrade(self), events, cancel));
		true
	}

	pub(super) fn stop(&self) {
		let listener = self.state.lock().listener.take();
		if listener.is_some() {
			drop(listener);
			tracing::debug!(form = %self.form, "validate.stop");
		}
		self.abort(AbortReason::form_removed());
	}

	fn is_validating_field(&self, field: ElementId) -> bool {
		self.host.is_field(field) && !matches!(self.host.validate_attr(field), None | Some(ValidateAttr::Disabled))
	}

	fn field_event(&self, field: ElementId) -> String {
		self.host
			.option_layer(field)
			.event
			.or_else(|| self.host.option_layer(self.form).event)
			.unwrap_or_else(|| self.config.event.clone())
	}

	fn on_field_event(self: &Arc<Self>, field: ElementId, event: &str) {
		if !self.is_validating_field(field) || self.field_event(field) != event {
			return;
		}
		tracing::debug!(form = %self.form, %field, event, "validate.field_event");
		match self.validate(ValidateOptions::new().origin(field)) {
			Ok(handle) => {
				mute_uncritical_rejection(handle);
			}
			Err(err) => tracing::warn!(form = %self.form, %field, %err, "validate.field_unresolved"),
		}
	}
}

async fn listen(shared: Weak<Shared>, mut events: broadcast::Receiver<HostEvent>, cancel: CancellationToken) {
	loop {
		let event = tokio::select! {
			biased;
			_ = cancel.cancelled() => return,
			event = events.recv() => event,
		};
		let Some(shared) = shared.upgrade() else {
			return;
		};
		match event {
			Ok(HostEvent::Field { field, event }) => shared.on_field_event(field, &event),
			Ok(HostEvent::Removed) => {
				shared.stop();
				return;
			}
			Err(RecvError::Lagged(skipped)) => {
				tracing::warn!(form = %shared.form, skipped, "validate.events_lagged");
			}
			Err(RecvError::Closed) => return,
		}
	}
}
