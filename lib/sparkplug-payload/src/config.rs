use serde::Deserialize;
use sparkplug_config::{ConfigurationError, ConfigurationLoader};

const fn default_max_depth() -> usize {
    64
}

const fn default_flatten_property_lists() -> bool {
    true
}

/// Payload codec configuration.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
pub struct CodecConfiguration {
    /// Maximum nesting depth of property sets, property set lists, and templates.
    ///
    /// Payloads nested deeper than this fail with [`CodecError::RecursionLimitExceeded`][crate::CodecError].
    ///
    /// Defaults to 64.
    #[serde(default = "default_max_depth")]
    max_depth: usize,

    /// Whether a property set list holding exactly one property set decodes to that bare property set.
    ///
    /// Defaults to `true`.
    #[serde(default = "default_flatten_property_lists")]
    flatten_property_lists: bool,

    /// Whether numeric values must sit in exactly the slot their type calls for.
    ///
    /// Defaults to `false`.
    #[serde(default)]
    strict_slots: bool,
}

impl CodecConfiguration {
    /// Creates a new `CodecConfiguration` from the given configuration.
    ///
    /// # Errors
    ///
    /// If the configuration cannot be deserialized, an error is returned.
    pub fn from_configuration(config: ConfigurationLoader) -> Result<Self, ConfigurationError> {
        config.into_typed()
    }

    /// Sets the maximum nesting depth.
    ///
    /// Defaults to 64.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Sets whether single-element property set lists are flattened when decoding.
    ///
    /// With flattening disabled, a property set list always decodes to a sequence of property maps, so "one property
    /// set" and "a list holding one property set" stay distinguishable.
    ///
    /// Defaults to `true`.
    pub fn with_flatten_property_lists(mut self, flatten: bool) -> Self {
        self.flatten_property_lists = flatten;
        self
    }

    /// Sets whether numeric slots are checked strictly.
    ///
    /// Integers may be carried in either `int_value` or `long_value`, and floats in either `float_value` or
    /// `double_value`. In strict mode, only the slot the catalog names for a type is accepted. Otherwise, the sibling
    /// slot is accepted and a warning is logged.
    ///
    /// Defaults to `false`.
    pub fn with_strict_slots(mut self, strict: bool) -> Self {
        self.strict_slots = strict;
        self
    }

    /// Returns the maximum nesting depth.
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Returns whether single-element property set lists are flattened.
    pub fn flatten_property_lists(&self) -> bool {
        self.flatten_property_lists
    }

    /// Returns whether numeric slots are checked strictly.
    pub fn strict_slots(&self) -> bool {
        self.strict_slots
    }
}

impl Default for CodecConfiguration {
    fn default() -> Self {
        Self {
            max_depth: default_max_depth(),
            flatten_property_lists: default_flatten_property_lists(),
            strict_slots: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write as _;

    use super::*;

    #[test]
    fn defaults() {
        let config = CodecConfiguration::default();
        assert_eq!(config.max_depth(), 64);
        assert!(config.flatten_property_lists());
        assert!(!config.strict_slots());
    }

    #[test]
    fn from_yaml_with_partial_overrides() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        file.write_all(b"max_depth: 8\nstrict_slots: true\n").unwrap();

        let loader = ConfigurationLoader::default().from_yaml(file.path()).unwrap();
        let config = CodecConfiguration::from_configuration(loader).unwrap();

        assert_eq!(
            config,
            CodecConfiguration::default().with_max_depth(8).with_strict_slots(true)
        );
    }

    #[test]
    fn from_environment() {
        std::env::set_var("SPKCODECTEST_FLATTEN_PROPERTY_LISTS", "false");

        let loader = ConfigurationLoader::default().from_environment("spkcodectest").unwrap();
        let config = CodecConfiguration::from_configuration(loader).unwrap();
        std::env::remove_var("SPKCODECTEST_FLATTEN_PROPERTY_LISTS");

        assert!(!config.flatten_property_lists());
        assert_eq!(config.max_depth(), 64);
    }
}
