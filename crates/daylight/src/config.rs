//! Controller configuration.
//!
//! Every field has a default, so an empty document is a valid configuration:
//!
//! ```yaml
//! storage_key: theme-preference
//! marker_class: dark-theme
//! watch_system: true
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

/// Key the preference is stored under unless configured otherwise.
pub const DEFAULT_STORAGE_KEY: &str = "theme-preference";

/// Class added to the surface root in dark mode unless configured otherwise.
pub const DEFAULT_MARKER_CLASS: &str = "dark-theme";

/// Error returned when a configuration cannot be loaded.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{message}")]
    Load { message: String },
    #[error("invalid configuration: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Settings for a [`ThemeController`](crate::ThemeController).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ControllerConfig {
    /// Storage key holding the preference.
    pub storage_key: String,
    /// Root class present iff the effective theme is dark.
    pub marker_class: String,
    /// Whether `init` subscribes to system color mode changes.
    pub watch_system: bool,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            marker_class: DEFAULT_MARKER_CLASS.to_string(),
            watch_system: true,
        }
    }
}

impl ControllerConfig {
    /// Parses a YAML document. Missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed YAML or unknown fields and
    /// [`ConfigError::Invalid`] when the key or class is empty.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        // serde_yaml rejects an empty document for a struct
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Load`] if the file cannot be read, otherwise the
    /// same errors as [`from_yaml`](Self::from_yaml).
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Load {
            message: format!("Failed to read {}: {}", path.display(), e),
        })?;
        Self::from_yaml(&content)
    }

    pub fn with_storage_key(mut self, key: impl Into<String>) -> Self {
        self.storage_key = key.into();
        self
    }

    pub fn with_marker_class(mut self, class: impl Into<String>) -> Self {
        self.marker_class = class.into();
        self
    }

    pub fn with_watch_system(mut self, watch: bool) -> Self {
        self.watch_system = watch;
        self
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.storage_key.trim().is_empty() {
            return Err(ConfigError::Invalid("storage_key must not be empty".into()));
        }
        if self.marker_class.trim().is_empty() {
            return Err(ConfigError::Invalid("marker_class must not be empty".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = ControllerConfig::default();
        assert_eq!(config.storage_key, "theme-preference");
        assert_eq!(config.marker_class, "dark-theme");
        assert!(config.watch_system);
    }

    #[test]
    fn test_empty_yaml_is_default() {
        assert_eq!(
            ControllerConfig::from_yaml("").unwrap(),
            ControllerConfig::default()
        );
    }

    #[test]
    fn test_partial_yaml() {
        let config = ControllerConfig::from_yaml("marker_class: night\n").unwrap();
        assert_eq!(config.marker_class, "night");
        assert_eq!(config.storage_key, DEFAULT_STORAGE_KEY);
    }

    #[test]
    fn test_unknown_field_rejected() {
        let err = ControllerConfig::from_yaml("palette: solarized\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_empty_key_rejected() {
        let err = ControllerConfig::from_yaml("storage_key: ''\n").unwrap_err();
        assert!(err.to_string().contains("storage_key"));
    }

    #[test]
    fn test_empty_marker_class_rejected() {
        let err = ControllerConfig::from_yaml("marker_class: '  '\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
        assert!(err.to_string().contains("marker_class"));
    }

    #[test]
    fn test_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("daylight.yaml");
        std::fs::write(&path, "watch_system: false\n").unwrap();

        let config = ControllerConfig::from_file(&path).unwrap();
        assert!(!config.watch_system);
    }

    #[test]
    fn test_from_missing_file() {
        let err = ControllerConfig::from_file("/nonexistent/daylight.yaml").unwrap_err();
        assert!(matches!(err, ConfigError::Load { .. }));
        assert!(err.to_string().contains("daylight.yaml"));
    }
}
