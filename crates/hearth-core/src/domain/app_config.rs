use serde::Serialize;
use serde_yaml::{Mapping, Value};

use crate::domain::paths::non_blank;

/// Merged application config.
///
/// Only `tmp_dir_path` means anything here; every other key is passed
/// through untouched for whoever consumes the settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct AppConfig(Mapping);

impl AppConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse one config layer.
    ///
    /// An empty document is an empty layer. Anything other than a mapping at
    /// the top level is rejected like a syntax error.
    pub fn parse_layer(text: &str) -> Result<Self, serde_yaml::Error> {
        let value: Value = serde_yaml::from_str(text)?;
        if value.is_null() {
            return Ok(Self::default());
        }
        serde_yaml::from_value::<Mapping>(value).map(Self)
    }

    /// Shallow merge, `layer` wins on conflicting top-level keys.
    pub fn merge_layer(&mut self, layer: AppConfig) {
        for (key, value) in layer.0 {
            self.0.insert(key, value);
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_mapping(&self) -> &Mapping {
        &self.0
    }

    /// Non-blank `tmp_dir_path`, if configured.
    pub fn tmp_dir_path(&self) -> Option<&str> {
        non_blank(self.get("tmp_dir_path").and_then(Value::as_str))
    }
}

impl From<Mapping> for AppConfig {
    fn from(mapping: Mapping) -> Self {
        Self(mapping)
    }
}
