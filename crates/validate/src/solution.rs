use std::future::IntoFuture;
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tokio::sync::watch;
use wireform_primitives::{
	AbortReason, BoxFutureStatic, Destination, Disable, ElementId, FocusMode, FormDestination, Headers, Method,
	OptionLayer, Params,
};

use crate::config::ValidateConfig;
use crate::error::ValidateError;
use crate::render::RenderResult;

/// Final result of one validation call.
pub type ValidationOutcome = Result<RenderResult, ValidateError>;

/// Settle-once outcome shared by every solution of one validation call.
#[derive(Debug, Clone)]
pub struct Deferred {
	tx: Arc<watch::Sender<Option<ValidationOutcome>>>,
}

impl Deferred {
	pub(crate) fn new() -> Self {
		Self {
			tx: Arc::new(watch::Sender::new(None)),
		}
	}

	/// Settles the deferred. Returns false if it was already settled.
	pub(crate) fn settle(&self, outcome: ValidationOutcome) -> bool {
		self.tx.send_if_modified(|slot| {
			if slot.is_some() {
				return false;
			}
			*slot = Some(outcome);
			true
		})
	}

	pub fn is_settled(&self) -> bool {
		self.tx.borrow().is_some()
	}

	pub fn handle(&self) -> ValidationHandle {
		ValidationHandle { rx: self.tx.subscribe() }
	}
}

/// Awaitable result of [`validate`](crate::ValidationScheduler::validate).
///
/// Resolves when the render pass containing the call's solutions settles,
/// or rejects with [`ValidateError::Aborted`] when they are aborted first.
#[derive(Debug, Clone)]
pub struct ValidationHandle {
	rx: watch::Receiver<Option<ValidationOutcome>>,
}

impl ValidationHandle {
	/// The outcome if already settled.
	pub fn try_outcome(&self) -> Option<ValidationOutcome> {
		self.rx.borrow().clone()
	}

	pub async fn wait(mut self) -> ValidationOutcome {
		let settled = match self.rx.wait_for(Option::is_some).await {
			Ok(slot) => slot.clone(),
			Err(_) => None,
		};
		settled.unwrap_or_else(|| Err(ValidateError::Aborted(AbortReason::scheduler_dropped())))
	}
}

impl IntoFuture for ValidationHandle {
	type Output = ValidationOutcome;
	type IntoFuture = BoxFutureStatic<ValidationOutcome>;

	fn into_future(self) -> Self::IntoFuture {
		Box::pin(self.wait())
	}
}

/// Call-site options for one validation.
#[derive(Debug, Clone, Default)]
pub struct ValidateOptions {
	/// Triggering element; the form when unset.
	pub origin: Option<ElementId>,
	/// Explicit target selector list.
	pub target: Option<String>,
	/// Overrides the configured form-group fallback.
	pub form_group: Option<bool>,
	/// Render options given at the call site.
	pub layer: OptionLayer,
}

impl ValidateOptions {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn origin(mut self, origin: ElementId) -> Self {
		self.origin = Some(origin);
		self
	}

	pub fn target(mut self, target: impl Into<String>) -> Self {
		self.target = Some(target.into());
		self
	}

	pub fn form_group(mut self, enabled: bool) -> Self {
		self.form_group = Some(enabled);
		self
	}

	pub fn delay(mut self, delay: Duration) -> Self {
		self.layer.delay = Some(delay);
		self
	}

	pub fn batch(mut self, batch: bool) -> Self {
		self.layer.batch = Some(batch);
		self
	}

	pub fn url(mut self, url: impl Into<String>) -> Self {
		self.layer.url = Some(url.into());
		self
	}

	pub fn method(mut self, method: Method) -> Self {
		self.layer.method = Some(method);
		self
	}

	pub fn params(mut self, params: Params) -> Self {
		self.layer.params = Some(params);
		self
	}

	pub fn headers(mut self, headers: Headers) -> Self {
		self.layer.headers = Some(headers);
		self
	}

	pub fn data(mut self, data: Value) -> Self {
		self.layer.data = Some(data);
		self
	}

	pub fn keep_data(mut self, keep: bool) -> Self {
		self.layer.keep_data = Some(keep);
		self
	}

	pub fn preview(mut self, preview: impl Into<String>) -> Self {
		self.layer.preview = Some(preview.into());
		self
	}

	pub fn placeholder(mut self, placeholder: impl Into<String>) -> Self {
		self.layer.placeholder = Some(placeholder.into());
		self
	}

	pub fn focus(mut self, focus: FocusMode) -> Self {
		self.layer.focus = Some(focus);
		self
	}

	pub fn feedback(mut self, feedback: bool) -> Self {
		self.layer.feedback = Some(feedback);
		self
	}

	pub fn disable(mut self, disable: Disable) -> Self {
		self.layer.disable = Some(disable);
		self
	}
}

/// Render options of one solution after layering.
///
/// `params` and `headers` hold only what the call site or attributes gave;
/// form defaults are applied when a batch is merged.
#[derive(Debug, Clone, PartialEq)]
pub struct SolutionOptions {
	pub delay: Duration,
	pub feedback: bool,
	pub disable: Option<Disable>,
	pub method: Method,
	pub url: String,
	pub params: Option<Params>,
	pub headers: Option<Headers>,
	pub data: Option<Value>,
	pub keep_data: bool,
	pub preview: Option<String>,
	pub placeholder: Option<String>,
	pub focus: Option<FocusMode>,
}

impl SolutionOptions {
	/// Applies framework defaults and the form destination under `layer`.
	///
	/// Returns the options and the solution's batch flag.
	pub(crate) fn layered(layer: OptionLayer, config: &ValidateConfig, form: &FormDestination) -> (Self, bool) {
		let layer = layer.over(config.defaults_layer());
		let options = Self {
			delay: layer.delay.unwrap_or_default(),
			feedback: layer.feedback.unwrap_or(config.feedback),
			disable: layer.disable,
			method: layer.method.unwrap_or(form.method),
			url: layer.url.unwrap_or_else(|| form.url.clone()),
			params: layer.params,
			headers: layer.headers,
			data: layer.data,
			keep_data: layer.keep_data.unwrap_or(false),
			preview: layer.preview,
			placeholder: layer.placeholder,
			focus: layer.focus,
		};
		(options, layer.batch.unwrap_or(config.batch))
	}

	pub fn destination(&self) -> Destination {
		Destination::new(self.method, self.url.clone())
	}
}

/// One fragment update waiting to be rendered.
#[derive(Debug, Clone)]
pub struct Solution {
	/// Element the target resolved to when the solution was created.
	pub element: ElementId,
	/// Fragment selector with origin references substituted.
	pub target: String,
	pub origin: ElementId,
	pub options: SolutionOptions,
	pub batch: bool,
	pub destination: Destination,
	pub deferred: Deferred,
}

#[cfg(test)]
mod tests {
	use super::*;

	fn form() -> FormDestination {
		FormDestination {
			method: Method::Post,
			url: "/users".into(),
			params: Params::new(),
			headers: Headers::new(),
			content_type: None,
		}
	}

	#[test]
	fn layering_falls_back_to_config_and_form() {
		let config = ValidateConfig {
			delay_ms: 40,
			batch: false,
			..ValidateConfig::default()
		};
		let (options, batch) = SolutionOptions::layered(OptionLayer::default(), &config, &form());
		assert_eq!(options.delay, Duration::from_millis(40));
		assert_eq!(options.destination(), Destination::new(Method::Post, "/users"));
		assert!(!batch);
		assert!(options.feedback);

		let layer = OptionLayer {
			url: Some("/users/check".into()),
			batch: Some(true),
			..OptionLayer::default()
		};
		let (options, batch) = SolutionOptions::layered(layer, &config, &form());
		assert_eq!(options.url, "/users/check");
		assert!(batch);
	}

	#[tokio::test(flavor = "current_thread")]
	async fn deferred_settles_once_for_all_handles() {
		let deferred = Deferred::new();
		let (first, second) = (deferred.handle(), deferred.handle());
		let ok = RenderResult {
			target: ".a".into(),
			status: 200,
		};
		assert!(deferred.settle(Ok(ok.clone())));
		assert!(!deferred.settle(Err(ValidateError::Aborted(AbortReason::new("late")))));
		assert_eq!(first.await, Ok(ok.clone()));
		assert_eq!(second.try_outcome(), Some(Ok(ok)));
	}

	#[tokio::test(flavor = "current_thread")]
	async fn dropped_deferred_rejects_as_aborted() {
		let deferred = Deferred::new();
		let handle = deferred.handle();
		drop(deferred);
		assert!(matches!(handle.await, Err(ValidateError::Aborted(_))));
	}
}
