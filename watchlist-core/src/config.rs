//! Configuration types

use crate::{ConfigError, Namespace};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Watchlist configuration.
///
/// Both notification flags default to off, in which case store-level
/// notification timestamps are never reset by the clear operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct WatchlistConfig {
    /// Email users about changes to watched pages.
    #[serde(default)]
    pub enable_email_notification: bool,
    /// Mark changed watched pages in change lists.
    #[serde(default)]
    pub show_updated_marker: bool,
    /// Namespaces excluded from watching on top of the virtual ones.
    #[serde(default)]
    pub non_watchable_namespaces: Vec<Namespace>,
}

impl WatchlistConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_email_notification(mut self, enabled: bool) -> Self {
        self.enable_email_notification = enabled;
        self
    }

    pub fn with_updated_marker(mut self, enabled: bool) -> Self {
        self.show_updated_marker = enabled;
        self
    }

    pub fn with_non_watchable_namespace(mut self, namespace: Namespace) -> Self {
        self.non_watchable_namespaces.push(namespace);
        self
    }

    /// Whether store-level notification timestamps drive anything.
    pub fn notifications_enabled(&self) -> bool {
        self.enable_email_notification || self.show_updated_marker
    }

    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: WatchlistConfig = toml::from_str(source).map_err(|e| ConfigError::Parse {
            reason: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            reason: format!("{}: {}", path.display(), e),
        })?;
        Self::from_toml_str(&contents)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for ns in &self.non_watchable_namespaces {
            if ns.is_virtual() {
                return Err(ConfigError::InvalidValue {
                    field: "non_watchable_namespaces".to_string(),
                    value: ns.to_string(),
                    reason: "virtual namespaces are never watchable".to_string(),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_has_notifications_disabled() {
        let config = WatchlistConfig::default();
        assert!(!config.notifications_enabled());
        assert!(config.non_watchable_namespaces.is_empty());
    }

    #[test]
    fn test_either_flag_enables_notifications() {
        assert!(WatchlistConfig::new().with_email_notification(true).notifications_enabled());
        assert!(WatchlistConfig::new().with_updated_marker(true).notifications_enabled());
    }

    #[test]
    fn test_from_toml_str() {
        let config = WatchlistConfig::from_toml_str(
            r#"
            enable_email_notification = true
            show_updated_marker = false
            non_watchable_namespaces = [4, 5]
            "#,
        )
        .unwrap();
        assert!(config.enable_email_notification);
        assert!(!config.show_updated_marker);
        assert_eq!(
            config.non_watchable_namespaces,
            vec![Namespace::PROJECT, Namespace::PROJECT_TALK]
        );
    }

    #[test]
    fn test_from_toml_str_missing_fields_default_off() {
        let config = WatchlistConfig::from_toml_str("").unwrap();
        assert_eq!(config, WatchlistConfig::default());
    }

    #[test]
    fn test_unknown_field_is_parse_error() {
        let err = WatchlistConfig::from_toml_str("enotif_watchlist = true").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_virtual_namespace_is_rejected() {
        let err = WatchlistConfig::from_toml_str("non_watchable_namespaces = [-1]").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }

    #[test]
    fn test_from_path_missing_file() {
        let err = WatchlistConfig::from_path(Path::new("/nonexistent/watchlist.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
