#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::time::Instant;
use wireform_dom::Document;
use wireform_primitives::ElementId;
use wireform_validate::{RenderError, RenderOptions, RenderPipeline, RenderResult};

/// Render pipeline that records every pass and answers after a fixed latency.
pub struct RecordingPipeline {
	start: Instant,
	latency: Duration,
	passes: Mutex<Vec<(Duration, RenderOptions)>>,
}

impl RecordingPipeline {
	pub fn new(latency: Duration) -> Arc<Self> {
		Arc::new(Self {
			start: Instant::now(),
			latency,
			passes: Mutex::new(Vec::new()),
		})
	}

	pub fn passes(&self) -> Vec<RenderOptions> {
		self.passes.lock().iter().map(|(_, options)| options.clone()).collect()
	}

	pub fn dispatch_times(&self) -> Vec<u64> {
		self.passes.lock().iter().map(|(at, _)| at.as_millis() as u64).collect()
	}
}

#[async_trait]
impl RenderPipeline for RecordingPipeline {
	async fn render(&self, options: RenderOptions) -> Result<RenderResult, RenderError> {
		let target = options.target.clone();
		self.passes.lock().push((self.start.elapsed(), options));
		tokio::time::sleep(self.latency).await;
		Ok(RenderResult { target, status: 200 })
	}
}

/// A signup form:
///
/// ```html
/// <form action="/users" method="post" up-params='{"locale": "en"}'>
///   <fieldset id="contact">
///     <input name="email" up-validate=".results">
///     <input name="name" up-validate=".results">
///   </fieldset>
///   <fieldset class="credentials">
///     <input name="password" type="password" up-validate up-validate-delay="100">
///   </fieldset>
///   <input name="nickname">
///   <div class="results"></div>
/// </form>
/// ```
pub struct SignupForm {
	pub doc: Arc<Document>,
	pub form: ElementId,
	pub contact: ElementId,
	pub email: ElementId,
	pub name: ElementId,
	pub credentials: ElementId,
	pub password: ElementId,
	pub nickname: ElementId,
	pub results: ElementId,
}

pub fn signup_form() -> SignupForm {
	let _ = tracing_subscriber::fmt::try_init();
	let doc = Arc::new(Document::new("/signup"));
	let form = doc
		.append(
			doc.body(),
			"form",
			&[("action", "/users"), ("method", "post"), ("up-params", r#"{"locale": "en"}"#)],
		)
		.unwrap();
	let contact = doc.append(form, "fieldset", &[("id", "contact")]).unwrap();
	let email = doc.append(contact, "input", &[("name", "email"), ("up-validate", ".results")]).unwrap();
	let name = doc.append(contact, "input", &[("name", "name"), ("up-validate", ".results")]).unwrap();
	let credentials = doc.append(form, "fieldset", &[("class", "credentials")]).unwrap();
	let password = doc
		.append(
			credentials,
			"input",
			&[("name", "password"), ("type", "password"), ("up-validate", ""), ("up-validate-delay", "100")],
		)
		.unwrap();
	let nickname = doc.append(form, "input", &[("name", "nickname")]).unwrap();
	let results = doc.append(form, "div", &[("class", "results")]).unwrap();
	SignupForm {
		doc,
		form,
		contact,
		email,
		name,
		credentials,
		password,
		nickname,
		results,
	}
}
