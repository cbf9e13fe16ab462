use tokio_util::sync::CancellationToken;
use wireform_primitives::AbortRegistration;
use wireform_worker::{DebounceTimer, TaskClass};

use crate::queue::DirtyQueue;

/// Coarse scheduler state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerPhase {
	/// Nothing queued or pending.
	Idle,
	/// A debounce is pending.
	Debouncing,
	/// A render pass is in flight.
	Rendering,
}

/// Mutable scheduler state, guarded by one short-lived lock.
#[derive(Debug)]
pub(crate) struct SchedulerState {
	pub(crate) queue: DirtyQueue,
	/// Armed iff a debounce is pending.
	pub(crate) timer: DebounceTimer,
	/// True from dispatch until every deferred of the pass is settled.
	pub(crate) rendering: bool,
	/// Host subscriptions while started.
	pub(crate) listener: Option<Listener>,
}

/// Host subscriptions of a started scheduler.
///
/// Dropping it stops the event listener task and unregisters the abort hook.
#[derive(Debug)]
pub(crate) struct Listener {
	cancel: CancellationToken,
	_abort_hook: AbortRegistration,
}

impl Listener {
	pub(crate) fn new(cancel: CancellationToken, abort_hook: AbortRegistration) -> Self {
		Self {
			cancel,
			_abort_hook: abort_hook,
		}
	}
}

impl Drop for Listener {
	fn drop(&mut self) {
		self.cancel.cancel();
	}
}

impl SchedulerState {
	pub(crate) fn new() -> Self {
		Self {
			queue: DirtyQueue::new(),
			timer: DebounceTimer::new(TaskClass::Interactive),
			rendering: false,
			listener: None,
		}
	}

	pub(crate) fn phase(&self) -> SchedulerPhase {
		if self.rendering {
			SchedulerPhase::Rendering
		} else if self.timer.is_armed() {
			SchedulerPhase::Debouncing
		} else {
			SchedulerPhase::Idle
		}
	}
}
