//! Codec configuration sources.
//!
//! Settings for the payload codec can come from a YAML file, a JSON file, or environment variables sharing a prefix.
//! Sources are merged in the order they are added and the result is deserialized into a settings type.
#![deny(warnings)]
#![deny(missing_docs)]

use std::{borrow::Cow, path::Path};

use figment::{error::Kind, providers::Env, Figment};
use serde::Deserialize;
use snafu::{ResultExt as _, Snafu};
use tracing::debug;

mod provider;
use self::provider::SettingsFile;

/// A configuration error.
#[derive(Debug, Snafu)]
#[snafu(context(suffix(false)))]
pub enum ConfigurationError {
    /// An environment source was added with an empty prefix.
    #[snafu(display("Environment variable prefix must not be empty."))]
    EmptyPrefix,

    /// A required setting was not given by any source.
    #[snafu(display("Setting '{}' is required. {}", field, hint))]
    MissingField {
        /// Where the setting can be given.
        hint: String,

        /// Name of the setting.
        field: Cow<'static, str>,
    },

    /// A setting was given with a value of the wrong type.
    #[snafu(display("Setting '{}' must be {}, found {}.", field, expected, found))]
    InvalidFieldType {
        /// Period-separated path of the setting.
        field: String,

        /// Type the setting must have.
        expected: String,

        /// Type of the value that was given.
        found: String,
    },

    /// A source could not be read or parsed.
    #[snafu(display("Failed to load configuration: {}", source))]
    Load {
        /// Error source.
        source: figment::Error,
    },
}

/// Builds codec settings from files and the environment.
///
/// Each source overrides the ones added before it. Files are read as soon as they are added, so a missing or
/// malformed file is reported by the method that added it.
///
/// ```no_run
/// # use serde::Deserialize;
/// # use sparkplug_config::ConfigurationLoader;
/// #[derive(Deserialize)]
/// struct Settings {
///     max_depth: usize,
/// }
///
/// let settings: Settings = ConfigurationLoader::default()
///     .try_from_yaml("/etc/sparkplug/codec.yaml")
///     .from_environment("sparkplug")?
///     .into_typed()?;
/// # Ok::<(), sparkplug_config::ConfigurationError>(())
/// ```
pub struct ConfigurationLoader {
    figment: Figment,
    env_prefixes: Vec<String>,
}

impl Default for ConfigurationLoader {
    fn default() -> Self {
        Self {
            figment: Figment::new(),
            env_prefixes: Vec::new(),
        }
    }
}

impl ConfigurationLoader {
    fn with_file(mut self, file: SettingsFile) -> Self {
        self.figment = self.figment.admerge(file);
        self
    }

    /// Adds a YAML settings file.
    ///
    /// # Errors
    ///
    /// If the file cannot be read or is not valid YAML, an error is returned.
    pub fn from_yaml<P>(self, path: P) -> Result<Self, ConfigurationError>
    where
        P: AsRef<Path>,
    {
        let file = SettingsFile::yaml(path).context(Load)?;
        Ok(self.with_file(file))
    }

    /// Adds a YAML settings file if it can be loaded, and skips it otherwise.
    pub fn try_from_yaml<P>(self, path: P) -> Self
    where
        P: AsRef<Path>,
    {
        match SettingsFile::yaml(&path) {
            Ok(file) => self.with_file(file),
            Err(e) => {
                debug!(error = %e, path = %path.as_ref().display(), "Skipping unreadable YAML settings file.");
                self
            }
        }
    }

    /// Adds a JSON settings file.
    ///
    /// # Errors
    ///
    /// If the file cannot be read or is not valid JSON, an error is returned.
    pub fn from_json<P>(self, path: P) -> Result<Self, ConfigurationError>
    where
        P: AsRef<Path>,
    {
        let file = SettingsFile::json(path).context(Load)?;
        Ok(self.with_file(file))
    }

    /// Adds a JSON settings file if it can be loaded, and skips it otherwise.
    pub fn try_from_json<P>(self, path: P) -> Self
    where
        P: AsRef<Path>,
    {
        match SettingsFile::json(&path) {
            Ok(file) => self.with_file(file),
            Err(e) => {
                debug!(error = %e, path = %path.as_ref().display(), "Skipping unreadable JSON settings file.");
                self
            }
        }
    }

    /// Adds the environment variables starting with `prefix`.
    ///
    /// The prefix is matched case-insensitively, and is separated from the setting name by an underscore: with a
    /// prefix of `sparkplug`, `SPARKPLUG_MAX_DEPTH` sets `max_depth`.
    ///
    /// # Errors
    ///
    /// If the prefix is empty, an error is returned.
    pub fn from_environment(mut self, prefix: &str) -> Result<Self, ConfigurationError> {
        snafu::ensure!(!prefix.is_empty(), EmptyPrefix);

        let mut prefix = prefix.to_uppercase();
        if !prefix.ends_with('_') {
            prefix.push('_');
        }

        self.figment = self.figment.admerge(Env::prefixed(&prefix));
        self.env_prefixes.push(prefix);
        Ok(self)
    }

    /// Merges every source and deserializes the result as `T`.
    ///
    /// # Errors
    ///
    /// If a required setting is missing, or a setting has the wrong type, an error is returned.
    pub fn into_typed<'a, T>(self) -> Result<T, ConfigurationError>
    where
        T: Deserialize<'a>,
    {
        self.figment.extract().map_err(|e| explain(&self.env_prefixes, e))
    }
}

fn explain(env_prefixes: &[String], e: figment::Error) -> ConfigurationError {
    match e.kind {
        Kind::MissingField(field) => {
            let mut hint = format!("Set `{}` in a settings file", field);
            for prefix in env_prefixes {
                hint.push_str(&format!(" or `{}{}` in the environment", prefix, field.replace('.', "_").to_uppercase()));
            }
            hint.push('.');
            ConfigurationError::MissingField { hint, field }
        }
        Kind::InvalidType(found, expected) => ConfigurationError::InvalidFieldType {
            field: e.path.join("."),
            expected,
            found: found.to_string(),
        },
        _ => ConfigurationError::Load { source: e },
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write as _;

    use serde::Deserialize;

    use super::*;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Limits {
        max_depth: usize,
        #[serde(default)]
        flatten: bool,
    }

    fn write_temp(contents: &str, suffix: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn yaml_file() {
        let file = write_temp("max_depth: 12\nflatten: true\n", ".yaml");

        let limits: Limits = ConfigurationLoader::default()
            .from_yaml(file.path())
            .unwrap()
            .into_typed()
            .unwrap();

        assert_eq!(
            limits,
            Limits {
                max_depth: 12,
                flatten: true
            }
        );
    }

    #[test]
    fn later_sources_take_precedence() {
        let yaml = write_temp("max_depth: 12\nflatten: true\n", ".yaml");
        let json = write_temp(r#"{ "max_depth": 3 }"#, ".json");

        let limits: Limits = ConfigurationLoader::default()
            .from_yaml(yaml.path())
            .unwrap()
            .from_json(json.path())
            .unwrap()
            .into_typed()
            .unwrap();

        assert_eq!(limits.max_depth, 3);
        assert!(limits.flatten);
    }

    #[test]
    fn missing_file_is_an_error_unless_tried() {
        let result = ConfigurationLoader::default().from_yaml("/nonexistent/sparkplug.yaml");
        assert!(matches!(result, Err(ConfigurationError::Load { .. })));

        let json = write_temp(r#"{ "max_depth": 7 }"#, ".json");
        let limits: Limits = ConfigurationLoader::default()
            .try_from_yaml("/nonexistent/sparkplug.yaml")
            .try_from_json(json.path())
            .into_typed()
            .unwrap();
        assert_eq!(limits.max_depth, 7);
    }

    #[test]
    fn environment_variables() {
        std::env::set_var("SPKCFGTEST_MAX_DEPTH", "9");

        let limits: Limits = ConfigurationLoader::default()
            .from_environment("spkcfgtest")
            .unwrap()
            .into_typed()
            .unwrap();

        assert_eq!(limits.max_depth, 9);
        std::env::remove_var("SPKCFGTEST_MAX_DEPTH");
    }

    #[test]
    fn empty_prefix() {
        let result = ConfigurationLoader::default().from_environment("");
        assert!(matches!(result, Err(ConfigurationError::EmptyPrefix)));
    }

    #[test]
    fn missing_field() {
        let file = write_temp("flatten: true\n", ".yaml");

        let result = ConfigurationLoader::default()
            .from_yaml(file.path())
            .unwrap()
            .from_environment("spkcfgmissing")
            .unwrap()
            .into_typed::<Limits>();

        match result {
            Err(ConfigurationError::MissingField { field, hint }) => {
                assert_eq!(field, "max_depth");
                assert_eq!(
                    hint,
                    "Set `max_depth` in a settings file or `SPKCFGMISSING_MAX_DEPTH` in the environment."
                );
            }
            other => panic!("unexpected result: {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn invalid_field_type() {
        let file = write_temp("max_depth: deep\n", ".yaml");

        let result = ConfigurationLoader::default()
            .from_yaml(file.path())
            .unwrap()
            .into_typed::<Limits>();

        match result {
            Err(ConfigurationError::InvalidFieldType { field, .. }) => assert_eq!(field, "max_depth"),
            other => panic!("unexpected result: {:?}", other.map(|_| ())),
        }
    }
}
