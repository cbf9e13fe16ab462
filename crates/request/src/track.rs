use crate::error::{RequestError, Result};
use crate::request::Request;

/// Makes `following` mirror the terminal outcome of `source`.
///
/// `following` must be new; it moves to [`Tracking`](crate::RequestState::Tracking)
/// and later settles exactly like `source` (same response, error or abort
/// reason). A source that already settled settles `following` immediately.
///
/// Aborting `following` on its own detaches it and reports the abort to
/// `source` as [`FollowerAborted`](crate::RequestEvent::FollowerAborted);
/// `source` keeps running.
pub fn track(source: &Request, following: &Request) -> Result<()> {
	if Request::ptr_eq(source, following) {
		return Err(RequestError::TrackConflict);
	}
	following.begin_tracking(source)?;
	if let Some(outcome) = source.attach_follower(following) {
		following.mirror(outcome);
	}
	Ok(())
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;
	use wireform_primitives::{AbortReason, Method};

	use super::*;
	use crate::{RequestEvent, RequestSpec, RequestState, Response};

	fn request() -> Request {
		Request::new(RequestSpec::new(Method::Get, "/search").with_target(".results"))
	}

	#[test]
	fn following_enters_tracking() {
		let (source, following) = (request(), request());
		source.load().unwrap();
		track(&source, &following).unwrap();
		assert_eq!(following.state(), RequestState::Tracking);
		assert_eq!(source.follower_count(), 1);
	}

	#[test]
	fn follower_settled_before_attaching_is_not_registered() {
		let (source, following) = (request(), request());
		source.load().unwrap();
		following.begin_tracking(&source).unwrap();
		assert!(following.abort("navigated"));

		assert!(source.attach_follower(&following).is_none());
		assert_eq!(source.follower_count(), 0);
		source.resolve(Response::new(200, "<div class=results>"));
		assert_eq!(following.state(), RequestState::Aborted);
	}

	#[test]
	fn source_resolution_is_mirrored() {
		let (source, following) = (request(), request());
		track(&source, &following).unwrap();
		source.resolve(Response::new(200, "<div class=results>"));
		assert_eq!(following.state(), RequestState::Resolved);
		assert_eq!(following.outcome(), source.outcome());
	}

	#[test]
	fn source_rejection_is_mirrored() {
		let (source, following) = (request(), request());
		track(&source, &following).unwrap();
		source.reject(RequestError::Network("connection reset".into()));
		assert_eq!(following.state(), RequestState::Rejected);
		assert_eq!(following.outcome(), Some(Err(RequestError::Network("connection reset".into()))));
	}

	#[test]
	fn source_abort_carries_reason() {
		let (source, following) = (request(), request());
		track(&source, &following).unwrap();
		source.abort("superseded");
		assert_eq!(
			following.outcome(),
			Some(Err(RequestError::Aborted(AbortReason::new("superseded"))))
		);
	}

	#[test]
	fn settled_source_settles_immediately() {
		let (source, following) = (request(), request());
		source.resolve(Response::new(200, "cached"));
		track(&source, &following).unwrap();
		assert_eq!(following.state(), RequestState::Resolved);
		assert_eq!(source.follower_count(), 0);
	}

	#[test]
	fn second_track_conflicts() {
		let (a, b, following) = (request(), request(), request());
		track(&a, &following).unwrap();
		assert_eq!(track(&b, &following), Err(RequestError::TrackConflict));
		assert_eq!(track(&following, &following), Err(RequestError::TrackConflict));

		let settled = request();
		settled.abort("gone");
		assert_eq!(track(&a, &settled), Err(RequestError::TrackConflict));
	}

	#[test]
	fn independent_settlement_wins() {
		let (source, following) = (request(), request());
		track(&source, &following).unwrap();
		following.resolve(Response::new(304, ""));
		source.reject(RequestError::Status(500));
		assert_eq!(following.outcome(), Some(Ok(Response::new(304, ""))));
		assert_eq!(source.follower_count(), 0);
	}

	#[tokio::test(flavor = "current_thread")]
	async fn follower_abort_reports_upward_without_cancelling_source() {
		let (source, following) = (request(), request());
		source.load().unwrap();
		track(&source, &following).unwrap();
		let mut events = source.subscribe();

		following.abort("user left");
		assert_eq!(following.state(), RequestState::Aborted);
		assert_eq!(source.state(), RequestState::Loading);
		assert_eq!(source.follower_count(), 0);
		assert_eq!(
			events.recv().await.ok(),
			Some(RequestEvent::FollowerAborted {
				follower: following.id(),
				reason: AbortReason::new("user left"),
			})
		);

		source.resolve(Response::new(200, "late"));
		assert_eq!(following.state(), RequestState::Aborted);
	}

	#[test]
	fn chains_propagate() {
		let (a, b, c) = (request(), request(), request());
		track(&a, &b).unwrap();
		track(&b, &c).unwrap();
		a.abort("stop");
		assert_eq!(c.state(), RequestState::Aborted);
	}
}
