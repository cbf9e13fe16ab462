use std::collections::VecDeque;
use std::time::Duration;

use crate::solution::Solution;

/// Solutions waiting for a render pass, oldest first.
#[derive(Debug, Default)]
pub struct DirtyQueue {
	solutions: VecDeque<Solution>,
}

fn can_batch(head: &Solution, other: &Solution) -> bool {
	head.destination == other.destination && head.batch && other.batch
}

impl DirtyQueue {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn push(&mut self, solution: Solution) {
		self.solutions.push_back(solution);
	}

	pub fn extend(&mut self, solutions: impl IntoIterator<Item = Solution>) {
		self.solutions.extend(solutions);
	}

	pub fn len(&self) -> usize {
		self.solutions.len()
	}

	pub fn is_empty(&self) -> bool {
		self.solutions.is_empty()
	}

	pub fn iter(&self) -> impl Iterator<Item = &Solution> {
		self.solutions.iter()
	}

	/// Shortest delay over every queued solution.
	pub fn shortest_delay(&self) -> Option<Duration> {
		self.solutions.iter().map(|s| s.options.delay).min()
	}

	/// Removes the head and every later solution that may share its pass.
	///
	/// Solutions left behind keep their relative order. Empty only when the
	/// queue is empty.
	pub fn take_batch(&mut self) -> Vec<Solution> {
		let Some(head) = self.solutions.pop_front() else {
			return Vec::new();
		};
		let mut batch = vec![head];
		let mut rest = VecDeque::with_capacity(self.solutions.len());
		for solution in self.solutions.drain(..) {
			if can_batch(&batch[0], &solution) {
				batch.push(solution);
			} else {
				rest.push_back(solution);
			}
		}
		self.solutions = rest;
		batch
	}

	/// Removes every queued solution.
	pub fn drain_all(&mut self) -> Vec<Solution> {
		self.solutions.drain(..).collect()
	}
}
