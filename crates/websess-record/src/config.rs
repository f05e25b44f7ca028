//! Record binding configuration.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use websess_core::{ConfigValidationError, Result};

/// Record binding configuration options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound(
    serialize = "C: Serialize",
    deserialize = "C: Deserialize<'de> + Default"
))]
pub struct RecordBindingConfig<C> {
    /// Filter forwarded to every repository lookup
    #[serde(default)]
    pub model_find_criteria: C,

    /// Synchronize states from the record when a session is restored
    /// (default: true)
    #[serde(default = "default_true")]
    pub auto_sync_model: bool,

    /// Record attribute → session state key copied on synchronization
    #[serde(default)]
    pub attribute_to_state_map: BTreeMap<String, String>,
}

fn default_true() -> bool {
    true
}

impl<C: Default> Default for RecordBindingConfig<C> {
    fn default() -> Self {
        Self::new(C::default())
    }
}

impl<C> RecordBindingConfig<C> {
    /// Create a config with the given find criteria and auto-sync enabled.
    pub fn new(model_find_criteria: C) -> Self {
        Self {
            model_find_criteria,
            auto_sync_model: true,
            attribute_to_state_map: BTreeMap::new(),
        }
    }

    /// Enable or disable synchronization on restore
    pub fn with_auto_sync(mut self, auto_sync_model: bool) -> Self {
        self.auto_sync_model = auto_sync_model;
        self
    }

    /// Copy `attribute` into the `state` key on synchronization
    pub fn map_attribute(mut self, attribute: impl Into<String>, state: impl Into<String>) -> Self {
        self.attribute_to_state_map
            .insert(attribute.into(), state.into());
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> std::result::Result<(), ConfigValidationError> {
        for (attribute, state) in &self.attribute_to_state_map {
            if attribute.trim().is_empty() {
                return Err(ConfigValidationError::invalid_value(
                    "attribute_to_state_map",
                    "attribute names must not be empty",
                ));
            }
            if state.trim().is_empty() {
                return Err(ConfigValidationError::invalid_value(
                    format!("attribute_to_state_map.{}", attribute),
                    "state keys must not be empty",
                ));
            }
        }
        Ok(())
    }
}

impl<C: DeserializeOwned + Default> RecordBindingConfig<C> {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }
}
