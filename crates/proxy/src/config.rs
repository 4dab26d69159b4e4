//! Factory configuration.
//!
//! Loaded from TOML, for example:
//!
//! ```toml
//! allocation = "constructor"
//! record_source = false
//! type_name_suffix = "$Stub"
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// How raw proxy instances are produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AllocationMode {
	/// Zero every field without running any constructor.
	#[default]
	Bypass,
	/// Run the proxy type's zero-argument constructor chain instead. Models a
	/// host without a bypass allocation primitive.
	Constructor,
}

/// Settings for a [`crate::ProxyFactory`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProxyConfig {
	pub allocation: AllocationMode,
	/// Keep the generated source text for [`crate::ProxyFactory::last_generated_source`].
	pub record_source: bool,
	/// Appended to the target type name, before a sequence number, to name
	/// generated proxy types.
	pub type_name_suffix: String,
}

impl Default for ProxyConfig {
	fn default() -> Self {
		Self {
			allocation: AllocationMode::Bypass,
			record_source: true,
			type_name_suffix: default_suffix(),
		}
	}
}

fn default_suffix() -> String {
	"$Proxy".to_owned()
}

/// Errors that can occur when loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
	#[error("TOML parse error: {0}")]
	Toml(#[from] toml::de::Error),

	#[error("type_name_suffix must not be empty")]
	EmptySuffix,
}

impl ProxyConfig {
	/// Parses a configuration; absent keys keep their defaults.
	pub fn from_toml(src: &str) -> Result<Self, ConfigError> {
		let config: Self = toml::from_str(src)?;
		if config.type_name_suffix.is_empty() {
			return Err(ConfigError::EmptySuffix);
		}
		Ok(config)
	}
}
