//! Runtime configuration.
//!
//! Every section has defaults, so an empty document is valid. Unknown keys
//! are rejected rather than ignored.

use serde::Deserialize;
use thiserror::Error as ThisError;

pub const DEFAULT_MAX_FLATTEN_DEPTH: usize = 4;
pub const DEFAULT_MAX_SORT_KEYS: usize = 16;

///
/// ConfigError
///

#[derive(Debug, ThisError)]
pub enum ConfigError {
    #[error("config parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config value for '{key}': {reason}")]
    Invalid { key: &'static str, reason: String },
}

///
/// SeekviewConfig
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct SeekviewConfig {
    pub registry: RegistryConfig,
    pub navigator: NavigatorConfig,
}

impl SeekviewConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(input)?;
        config.validate()?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.navigator.max_sort_keys == 0 {
            return Err(ConfigError::Invalid {
                key: "navigator.max_sort_keys",
                reason: "must be at least 1".to_string(),
            });
        }

        Ok(())
    }
}

///
/// RegistryConfig
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct RegistryConfig {
    /// How many embedded/reference levels path expansion descends.
    pub max_flatten_depth: usize,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            max_flatten_depth: DEFAULT_MAX_FLATTEN_DEPTH,
        }
    }
}

///
/// NullOrdering
/// Where nulls sort relative to non-null values, for ascending keys.
///

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum NullOrdering {
    /// Nulls are the lowest value.
    #[default]
    First,
    /// Nulls are the highest value.
    Last,
}

///
/// NavigatorConfig
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct NavigatorConfig {
    pub nulls: NullOrdering,
    /// Upper bound on sort keys after identifier tiebreaks are appended.
    pub max_sort_keys: usize,
}

impl Default for NavigatorConfig {
    fn default() -> Self {
        Self {
            nulls: NullOrdering::First,
            max_sort_keys: DEFAULT_MAX_SORT_KEYS,
        }
    }
}

///
/// TESTS
///
