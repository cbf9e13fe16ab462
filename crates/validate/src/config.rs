use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use wireform_primitives::OptionLayer;

/// Errors raised while loading [`ValidateConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
	#[error("TOML parse error: {0}")]
	Toml(#[from] toml::de::Error),

	#[error("invalid value for `{field}`: {reason}")]
	Invalid { field: &'static str, reason: String },
}

/// Framework defaults for revalidation.
///
/// Every option here is the lowest layer: call-site options and element
/// attributes override it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ValidateConfig {
	/// Debounce delay in milliseconds.
	pub delay_ms: u64,
	/// DOM event type that triggers a field's validation.
	pub event: String,
	/// Whether solutions may share a render pass.
	pub batch: bool,
	/// Whether render passes show navigation feedback.
	pub feedback: bool,
	/// Whether fields without an explicit target fall back to their group.
	pub form_group: bool,
	/// Prefix of protocol headers (`X-Up-`).
	pub header_prefix: String,
	/// Longest header value sent before falling back to `unknown_names`.
	pub max_header_size: usize,
	/// Validate header value used when field names are unknown or too long.
	pub unknown_names: String,
}

impl Default for ValidateConfig {
	fn default() -> Self {
		Self {
			delay_ms: 0,
			event: "change".to_string(),
			batch: true,
			feedback: true,
			form_group: true,
			header_prefix: "X-Up-".to_string(),
			max_header_size: 2048,
			unknown_names: ":unknown".to_string(),
		}
	}
}

impl ValidateConfig {
	/// Parses a TOML document; missing keys take their defaults.
	pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
		let config: Self = toml::from_str(input)?;
		config.check()?;
		Ok(config)
	}

	pub fn delay(&self) -> Duration {
		Duration::from_millis(self.delay_ms)
	}

	/// Framework defaults as the bottom option layer.
	pub fn defaults_layer(&self) -> OptionLayer {
		OptionLayer {
			delay: Some(self.delay()),
			event: Some(self.event.clone()),
			batch: Some(self.batch),
			feedback: Some(self.feedback),
			..OptionLayer::default()
		}
	}

	fn check(&self) -> Result<(), ConfigError> {
		if self.event.trim().is_empty() {
			return Err(ConfigError::Invalid {
				field: "event",
				reason: "must name a DOM event".to_string(),
			});
		}
		if self.header_prefix.is_empty() {
			return Err(ConfigError::Invalid {
				field: "header_prefix",
				reason: "must not be empty".to_string(),
			});
		}
		if self.max_header_size == 0 {
			return Err(ConfigError::Invalid {
				field: "max_header_size",
				reason: "must be positive".to_string(),
			});
		}
		Ok(())
	}
}
