use std::future::Future;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::{TaskClass, spawn};

#[derive(Debug)]
struct Arm {
	generation: u64,
	cancel: CancellationToken,
}

/// Re-armable one-shot timer.
///
/// Every [`arm`](Self::arm) cancels the previous arm and starts a new
/// generation. Cancellation only covers the wait: once the delay elapsed the
/// fire callback runs to completion, so a callback may safely drive long work
/// (such as a render) that later re-arms do not interrupt.
///
/// The timer stays armed until the owner disarms it. A fire callback should
/// call [`take_fired`](Self::take_fired) with its generation; a `false` result
/// means the timer was re-armed or cleared after this fire was scheduled and
/// the callback is stale.
#[derive(Debug)]
pub struct DebounceTimer {
	class: TaskClass,
	next_generation: u64,
	armed: Option<Arm>,
}

impl DebounceTimer {
	pub fn new(class: TaskClass) -> Self {
		Self {
			class,
			next_generation: 0,
			armed: None,
		}
	}

	/// Clears any pending arm and arms the timer from scratch.
	///
	/// Returns the new generation, which is also passed to `on_fire`.
	pub fn arm<F, Fut>(&mut self, delay: Duration, on_fire: F) -> u64
	where
		F: FnOnce(u64) -> Fut + Send + 'static,
		Fut: Future<Output = ()> + Send + 'static,
	{
		self.clear();
		self.next_generation = self.next_generation.wrapping_add(1);
		let generation = self.next_generation;
		let cancel = CancellationToken::new();
		let task_cancel = cancel.clone();
		self.armed = Some(Arm { generation, cancel });

		tracing::trace!(generation, delay_ms = delay.as_millis() as u64, "debounce.arm");
		spawn(self.class, async move {
			tokio::select! {
				biased;
				_ = task_cancel.cancelled() => {
					tracing::trace!(generation, "debounce.cancelled");
					return;
				}
				_ = tokio::time::sleep(delay) => {}
			}
			tracing::trace!(generation, "debounce.fire");
			on_fire(generation).await;
		});
		generation
	}

	/// Cancels the pending arm. Returns whether one was pending.
	pub fn clear(&mut self) -> bool {
		match self.armed.take() {
			Some(arm) => {
				arm.cancel.cancel();
				true
			}
			None => false,
		}
	}

	/// Disarms the timer if `generation` is the current arm.
	pub fn take_fired(&mut self, generation: u64) -> bool {
		match &self.armed {
			Some(arm) if arm.generation == generation => {
				self.armed = None;
				true
			}
			_ => false,
		}
	}

	pub fn is_armed(&self) -> bool {
		self.armed.is_some()
	}

	/// Generation of the pending arm.
	pub fn generation(&self) -> Option<u64> {
		self.armed.as_ref().map(|arm| arm.generation)
	}
}

impl Drop for DebounceTimer {
	fn drop(&mut self) {
		self.clear();
	}
}
