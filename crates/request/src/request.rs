use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use tokio::sync::{broadcast, watch};
use wireform_primitives::{AbortReason, Destination, Headers, Method, Params};

use crate::error::{RequestError, Result};
use crate::state::RequestState;

const EVENT_BUFFER: usize = 16;

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique request identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestId(u64);

impl RequestId {
	fn next() -> Self {
		Self(NEXT_ID.fetch_add(1, Ordering::Relaxed))
	}
}

impl fmt::Display for RequestId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "request#{}", self.0)
	}
}

/// What a request asks for.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestSpec {
	pub method: Method,
	pub url: String,
	pub params: Params,
	/// Fragment selector the response is rendered into.
	pub target: Option<String>,
	pub headers: Headers,
}

impl RequestSpec {
	pub fn new(method: Method, url: impl Into<String>) -> Self {
		Self {
			method,
			url: url.into(),
			..Self::default()
		}
	}

	#[must_use]
	pub fn with_target(mut self, target: impl Into<String>) -> Self {
		self.target = Some(target.into());
		self
	}

	#[must_use]
	pub fn with_params(mut self, params: Params) -> Self {
		self.params = params;
		self
	}

	pub fn destination(&self) -> Destination {
		Destination::new(self.method, self.url.clone())
	}
}

/// Server response carried by a resolved request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
	pub status: u16,
	pub headers: Headers,
	pub text: String,
}

impl Response {
	pub fn new(status: u16, text: impl Into<String>) -> Self {
		Self {
			status,
			headers: Headers::new(),
			text: text.into(),
		}
	}

	pub fn is_success(&self) -> bool {
		(200..300).contains(&self.status)
	}
}

/// Terminal outcome of a request.
pub type Settlement = std::result::Result<Response, RequestError>;

/// Lifecycle notifications published by a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestEvent {
	Loading,
	/// Started mirroring `source`.
	Tracking { source: RequestId },
	Settled(RequestState),
	/// A request tracking this one was aborted on its own and detached.
	FollowerAborted { follower: RequestId, reason: AbortReason },
}

#[derive(Debug)]
struct Core {
	state: RequestState,
	outcome: Option<Settlement>,
	followers: Vec<Request>,
	source: Option<Weak<Inner>>,
}

#[derive(Debug)]
struct Inner {
	id: RequestId,
	spec: RequestSpec,
	core: Mutex<Core>,
	settled: watch::Sender<bool>,
	events: broadcast::Sender<RequestEvent>,
}

/// Shared handle to one logical request.
///
/// Clones refer to the same request. Each request settles at most once;
/// later settlement attempts are ignored.
#[derive(Debug, Clone)]
pub struct Request {
	inner: Arc<Inner>,
}

impl Request {
	pub fn new(spec: RequestSpec) -> Self {
		Self {
			inner: Arc::new(Inner {
				id: RequestId::next(),
				spec,
				core: Mutex::new(Core {
					state: RequestState::New,
					outcome: None,
					followers: Vec::new(),
					source: None,
				}),
				settled: watch::Sender::new(false),
				events: broadcast::Sender::new(EVENT_BUFFER),
			}),
		}
	}

	pub fn id(&self) -> RequestId {
		self.inner.id
	}

	pub fn spec(&self) -> &RequestSpec {
		&self.inner.spec
	}

	pub fn state(&self) -> RequestState {
		self.inner.core.lock().state
	}

	pub fn is_settled(&self) -> bool {
		self.state().is_terminal()
	}

	/// The terminal outcome, once settled.
	pub fn outcome(&self) -> Option<Settlement> {
		self.inner.core.lock().outcome.clone()
	}

	/// Number of requests currently tracking this one.
	pub fn follower_count(&self) -> usize {
		self.inner.core.lock().followers.len()
	}

	pub fn ptr_eq(a: &Request, b: &Request) -> bool {
		Arc::ptr_eq(&a.inner, &b.inner)
	}

	pub fn subscribe(&self) -> broadcast::Receiver<RequestEvent> {
		self.inner.events.subscribe()
	}

	/// Marks the request as sent.
	pub fn load(&self) -> Result<()> {
		{
			let mut core = self.inner.core.lock();
			if core.state != RequestState::New {
				return Err(RequestError::InvalidTransition {
					from: core.state,
					to: RequestState::Loading,
				});
			}
			core.state = RequestState::Loading;
		}
		tracing::debug!(request = %self.id(), "request.loading");
		self.emit(RequestEvent::Loading);
		Ok(())
	}

	/// Resolves with a response. Returns false if already settled.
	pub fn resolve(&self, response: Response) -> bool {
		self.finish(Ok(response), false)
	}

	/// Rejects with an error. Returns false if already settled.
	pub fn reject(&self, error: RequestError) -> bool {
		self.finish(Err(error), false)
	}

	/// Aborts the request. Returns false if already settled.
	///
	/// A request tracking a source detaches and reports the abort to the
	/// source without cancelling it.
	pub fn abort(&self, reason: impl Into<AbortReason>) -> bool {
		self.finish(Err(RequestError::Aborted(reason.into())), false)
	}

	/// Waits for the terminal outcome.
	pub async fn wait(&self) -> Settlement {
		let mut settled = self.inner.settled.subscribe();
		// The sender lives as long as `self`, so this only returns once settled.
		let _ = settled.wait_for(|done| *done).await;
		match self.outcome() {
			Some(outcome) => outcome,
			None => Err(RequestError::Aborted(AbortReason::new("request dropped"))),
		}
	}

	/// Attaches `self` to `source`. Called by [`track`](crate::track) after
	/// the follower has been checked and moved to `Tracking`.
	pub(crate) fn begin_tracking(&self, source: &Request) -> Result<()> {
		{
			let mut core = self.inner.core.lock();
			if core.state != RequestState::New {
				return Err(RequestError::TrackConflict);
			}
			core.state = RequestState::Tracking;
			core.source = Some(Arc::downgrade(&source.inner));
		}
		tracing::debug!(request = %self.id(), source = %source.id(), "request.tracking");
		self.emit(RequestEvent::Tracking { source: source.id() });
		Ok(())
	}

	/// Registers `follower` on `self`, or returns the outcome to mirror when
	/// `self` already settled.
	pub(crate) fn attach_follower(&self, follower: &Request) -> Option<Settlement> {
		let mut core = self.inner.core.lock();
		if let Some(outcome) = &core.outcome {
			return Some(outcome.clone());
		}
		// Settled since it began tracking; it has already detached itself.
		if follower.is_settled() {
			return None;
		}
		core.followers.push(follower.clone());
		None
	}

	/// Settles from the source's outcome.
	pub(crate) fn mirror(&self, outcome: Settlement) -> bool {
		self.finish(outcome, true)
	}

	fn detach_follower(&self, follower: RequestId) {
		self.inner.core.lock().followers.retain(|f| f.id() != follower);
	}

	fn finish(&self, outcome: Settlement, from_source: bool) -> bool {
		let state = match &outcome {
			Ok(_) => RequestState::Resolved,
			Err(RequestError::Aborted(_)) => RequestState::Aborted,
			Err(_) => RequestState::Rejected,
		};
		let (followers, source) = {
			let mut core = self.inner.core.lock();
			if core.state.is_terminal() {
				tracing::trace!(request = %self.id(), state = %core.state, "request.settle_ignored");
				return false;
			}
			core.state = state;
			core.outcome = Some(outcome.clone());
			(std::mem::take(&mut core.followers), core.source.take())
		};
		tracing::debug!(request = %self.id(), %state, from_source, "request.settled");
		self.inner.settled.send_replace(true);
		self.emit(RequestEvent::Settled(state));

		if !from_source && let Some(source) = source.and_then(|weak| weak.upgrade()) {
			let source = Request { inner: source };
			source.detach_follower(self.id());
			if let Err(RequestError::Aborted(reason)) = &outcome {
				tracing::debug!(request = %self.id(), source = %source.id(), "request.follower_aborted");
				source.emit(RequestEvent::FollowerAborted {
					follower: self.id(),
					reason: reason.clone(),
				});
			}
		}
		for follower in followers {
			follower.mirror(outcome.clone());
		}
		true
	}

	fn emit(&self, event: RequestEvent) {
		// No subscribers is fine.
		let _ = self.inner.events.send(event);
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn load_only_from_new() {
		let request = Request::new(RequestSpec::new(Method::Get, "/a"));
		request.load().unwrap();
		assert_eq!(request.state(), RequestState::Loading);
		assert_eq!(
			request.load(),
			Err(RequestError::InvalidTransition {
				from: RequestState::Loading,
				to: RequestState::Loading
			})
		);
	}

	#[test]
	fn settles_once() {
		let request = Request::new(RequestSpec::new(Method::Get, "/a"));
		assert!(request.resolve(Response::new(200, "ok")));
		assert!(!request.abort("late"));
		assert!(!request.reject(RequestError::Status(500)));
		assert_eq!(request.state(), RequestState::Resolved);
		assert_eq!(request.outcome(), Some(Ok(Response::new(200, "ok"))));
	}

	#[test]
	fn error_kinds_map_to_states() {
		let rejected = Request::new(RequestSpec::default());
		rejected.reject(RequestError::Network("reset".into()));
		assert_eq!(rejected.state(), RequestState::Rejected);

		let aborted = Request::new(RequestSpec::default());
		aborted.abort("user navigated");
		assert_eq!(aborted.state(), RequestState::Aborted);
	}

	#[tokio::test(flavor = "current_thread")]
	async fn wait_returns_outcome() {
		let request = Request::new(RequestSpec::new(Method::Get, "/a"));
		let waiter = {
			let request = request.clone();
			tokio::spawn(async move { request.wait().await })
		};
		tokio::task::yield_now().await;
		request.reject(RequestError::Status(502));
		assert_eq!(waiter.await.unwrap(), Err(RequestError::Status(502)));
		// Waiting after settlement returns immediately.
		assert_eq!(request.wait().await, Err(RequestError::Status(502)));
	}
}
