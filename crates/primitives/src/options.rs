use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde_json::Value;

use crate::destination::Method;
use crate::headers::Headers;
use crate::params::Params;

/// Focus handling requested for a render pass.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FocusMode {
	/// Preserve current focus, selection and scroll positions.
	#[default]
	Keep,
	/// Let the renderer pick a sensible focus target.
	Auto,
	/// Focus the updated fragment.
	Target,
	/// Focus the fragment's layer.
	Layer,
	/// Do not touch focus at all.
	None,
	/// Focus the first element matching a selector.
	Selector(String),
}

impl FromStr for FocusMode {
	type Err = std::convert::Infallible;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Ok(match s.trim() {
			"keep" => Self::Keep,
			"auto" => Self::Auto,
			"target" => Self::Target,
			"layer" => Self::Layer,
			"none" | "false" => Self::None,
			other => Self::Selector(other.to_string()),
		})
	}
}

impl fmt::Display for FocusMode {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Keep => f.write_str("keep"),
			Self::Auto => f.write_str("auto"),
			Self::Target => f.write_str("target"),
			Self::Layer => f.write_str("layer"),
			Self::None => f.write_str("none"),
			Self::Selector(selector) => f.write_str(selector),
		}
	}
}

/// Elements to disable while a render pass is in flight.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Disable {
	/// Disable every field of the host form.
	Form,
	/// Disable elements matching a selector; may reference `:origin`.
	Selector(String),
}

/// One layer of optional render options.
///
/// Layers come from call sites, from attributes on an origin element and from
/// attributes on its form. [`OptionLayer::over`] stacks them so that the upper
/// layer wins field by field; unset fields fall through.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OptionLayer {
	pub delay: Option<Duration>,
	pub event: Option<String>,
	pub batch: Option<bool>,
	pub feedback: Option<bool>,
	pub disable: Option<Disable>,
	pub method: Option<Method>,
	pub url: Option<String>,
	pub params: Option<Params>,
	pub headers: Option<Headers>,
	pub data: Option<Value>,
	pub keep_data: Option<bool>,
	pub preview: Option<String>,
	pub placeholder: Option<String>,
	pub focus: Option<FocusMode>,
}

impl OptionLayer {
	/// Stacks `self` on top of `lower`: every field set here wins.
	#[must_use]
	pub fn over(self, lower: OptionLayer) -> OptionLayer {
		OptionLayer {
			delay: self.delay.or(lower.delay),
			event: self.event.or(lower.event),
			batch: self.batch.or(lower.batch),
			feedback: self.feedback.or(lower.feedback),
			disable: self.disable.or(lower.disable),
			method: self.method.or(lower.method),
			url: self.url.or(lower.url),
			params: self.params.or(lower.params),
			headers: self.headers.or(lower.headers),
			data: self.data.or(lower.data),
			keep_data: self.keep_data.or(lower.keep_data),
			preview: self.preview.or(lower.preview),
			placeholder: self.placeholder.or(lower.placeholder),
			focus: self.focus.or(lower.focus),
		}
	}

	pub fn is_empty(&self) -> bool {
		*self == OptionLayer::default()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn upper_layer_wins_per_field() {
		let call = OptionLayer {
			delay: Some(Duration::from_millis(10)),
			..OptionLayer::default()
		};
		let attrs = OptionLayer {
			delay: Some(Duration::from_millis(300)),
			batch: Some(false),
			..OptionLayer::default()
		};

		let layered = call.over(attrs);
		assert_eq!(layered.delay, Some(Duration::from_millis(10)));
		assert_eq!(layered.batch, Some(false));
		assert_eq!(layered.url, None);
	}

	#[test]
	fn focus_mode_parsing() {
		assert_eq!("keep".parse::<FocusMode>(), Ok(FocusMode::Keep));
		assert_eq!("false".parse::<FocusMode>(), Ok(FocusMode::None));
		assert_eq!("#name".parse::<FocusMode>(), Ok(FocusMode::Selector("#name".into())));
	}
}
