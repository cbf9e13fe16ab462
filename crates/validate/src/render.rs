//! Render pipeline contract.

use async_trait::async_trait;
use indexmap::IndexMap;
use serde_json::Value;
use thiserror::Error;
use wireform_primitives::{AbortReason, Disable, ElementId, FocusMode, Headers, Method, Params};

use crate::error::ValidateError;

/// Name of the guard event emitted before a validation pass.
pub const VALIDATE_EVENT: &str = "up:form:validate";

/// Event the pipeline emits on the form before rendering; a listener may
/// cancel the pass, which the pipeline reports as an abort.
#[derive(Debug, Clone, PartialEq)]
pub struct GuardEvent {
	pub name: &'static str,
	pub form: ElementId,
	/// Fields whose change caused the pass.
	pub fields: Vec<ElementId>,
	pub params: Params,
	pub log: String,
}

/// Options for one render pass.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderOptions {
	/// Selector list of every fragment to update.
	pub target: String,
	pub origin: ElementId,
	pub method: Method,
	pub url: String,
	pub content_type: Option<String>,
	pub params: Params,
	pub headers: Headers,
	pub focus: FocusMode,
	pub feedback: bool,
	/// Data per target; only targets with data appear.
	pub data_map: IndexMap<String, Value>,
	pub preview_map: IndexMap<String, String>,
	pub placeholder_map: IndexMap<String, String>,
	/// Elements to disable while the pass is in flight, origins resolved.
	pub disable: Vec<Disable>,
	/// Render error responses like successful ones.
	pub tolerate_error_status: bool,
	/// Skip targets missing from the response instead of failing the pass.
	pub tolerate_missing_target: bool,
	pub guard_event: GuardEvent,
}

/// A completed render pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderResult {
	pub target: String,
	pub status: u16,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
	/// The server answered with an error status and the response was rendered.
	#[error("server responded with status {}", .0.status)]
	ErrorStatus(RenderResult),

	#[error("render aborted: {0}")]
	Aborted(AbortReason),

	/// The request never produced a response.
	#[error("transport failure: {0}")]
	Transport(String),

	#[error("render failed: {0}")]
	Failed(String),
}

impl From<RenderError> for ValidateError {
	fn from(err: RenderError) -> Self {
		match err {
			RenderError::ErrorStatus(result) => ValidateError::Render(format!("unexpected status {}", result.status)),
			RenderError::Aborted(reason) => ValidateError::Aborted(reason),
			RenderError::Transport(message) => ValidateError::Transport(message),
			RenderError::Failed(message) => ValidateError::Render(message),
		}
	}
}

/// Outcome handed to every caller of a pass. Validation responses with an
/// error status still render, so they resolve.
pub(crate) fn pass_outcome(result: Result<RenderResult, RenderError>) -> Result<RenderResult, ValidateError> {
	match result {
		Ok(result) | Err(RenderError::ErrorStatus(result)) => Ok(result),
		Err(err) => Err(err.into()),
	}
}

/// Fetches and renders fragments.
#[async_trait]
pub trait RenderPipeline: Send + Sync + 'static {
	async fn render(&self, options: RenderOptions) -> Result<RenderResult, RenderError>;
}
