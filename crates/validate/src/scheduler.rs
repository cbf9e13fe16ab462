//! Per-form validation scheduler.
//!
//! [`ValidationScheduler`] collects dirty solutions, debounces them behind one
//! timer armed with the shortest delay over the whole queue, and drains the
//! queue one batch at a time through the render pipeline. At most one render
//! pass is in flight per scheduler.
//!
//! # Phases
//!
//! * `Idle`: nothing pending.
//! * `Debouncing`: the timer is armed. Every new trigger re-arms it from scratch.
//! * `Rendering`: a pass is in flight. Triggers still queue and re-arm; the
//!   drain loop picks them up once the pass settles.
//!
//! A timer fire renders only if the queue is non-empty, no pass is in flight
//! and the timer was not re-armed after the fire was scheduled.

mod ops;
mod state;

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use wireform_primitives::{AbortReason, ElementId, FormHost};

pub use self::state::SchedulerPhase;
use self::state::SchedulerState;
use crate::config::ValidateConfig;
use crate::error::Result;
use crate::render::RenderPipeline;
use crate::solution::{ValidateOptions, ValidationHandle};

pub(crate) struct Shared {
	form: ElementId,
	host: Arc<dyn FormHost>,
	pipeline: Arc<dyn RenderPipeline>,
	config: ValidateConfig,
	state: Mutex<SchedulerState>,
}

/// Revalidation engine of one form.
///
/// Must be used from within a tokio runtime: scheduling spawns the debounce
/// timer and [`start`](Self::start) spawns the event listener.
pub struct ValidationScheduler {
	shared: Arc<Shared>,
}

impl fmt::Debug for ValidationScheduler {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let state = self.shared.state.lock();
		f.debug_struct("ValidationScheduler")
			.field("form", &self.shared.form)
			.field("phase", &state.phase())
			.field("pending", &state.queue.len())
			.finish_non_exhaustive()
	}
}

impl ValidationScheduler {
	pub fn new(form: ElementId, host: Arc<dyn FormHost>, pipeline: Arc<dyn RenderPipeline>, config: ValidateConfig) -> Self {
		Self {
			shared: Arc::new(Shared {
				form,
				host,
				pipeline,
				config,
				state: Mutex::new(SchedulerState::new()),
			}),
		}
	}

	pub fn form(&self) -> ElementId {
		self.shared.form
	}

	pub fn config(&self) -> &ValidateConfig {
		&self.shared.config
	}

	/// Starts listening to the form's field and removal events and registers
	/// a synchronous abort hook with the host.
	///
	/// Returns false if already listening.
	pub fn start(&self) -> bool {
		self.shared.start()
	}

	/// Stops listening and aborts everything queued with "form removed".
	pub fn stop(&self) {
		self.shared.stop();
	}

	/// Queues the solutions for `options` and (re)arms the debounce timer.
	///
	/// The returned handle settles with the outcome of the pass that renders
	/// the first of this call's solutions.
	pub fn validate(&self, options: ValidateOptions) -> Result<ValidationHandle> {
		self.shared.validate(options)
	}

	/// Rejects every queued solution with [`Aborted`](crate::ValidateError::Aborted)
	/// and clears the timer. An in-flight pass is left to the pipeline.
	///
	/// Returns the number of solutions rejected.
	pub fn abort(&self, reason: impl Into<AbortReason>) -> usize {
		self.shared.abort(reason.into())
	}

	pub fn phase(&self) -> SchedulerPhase {
		self.shared.state.lock().phase()
	}

	/// Number of queued solutions.
	pub fn pending(&self) -> usize {
		self.shared.state.lock().queue.len()
	}

	pub fn is_rendering(&self) -> bool {
		self.shared.state.lock().rendering
	}

	pub fn is_debouncing(&self) -> bool {
		self.shared.state.lock().timer.is_armed()
	}
}

impl Drop for ValidationScheduler {
	/// Detaches from the host and rejects everything still queued. A pass
	/// already in flight settles normally; nothing is dispatched after it.
	fn drop(&mut self) {
		let listener = self.shared.state.lock().listener.take();
		drop(listener);
		self.shared.abort(AbortReason::scheduler_dropped());
	}
}
