//! Wizard configuration.

use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use cleanorder_observability::LoggingConfig;
use cleanorder_wizard::{RuleValidationGate, ValidationLimits};

/// Environment variable holding the path to a JSON config file.
pub const CONFIG_ENV: &str = "CLEANORDER_CONFIG";
/// Environment variable overriding the log filter.
pub const LOG_ENV: &str = "CLEANORDER_LOG";

/// Everything tunable about the wizard. Missing fields fall back to defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WizardConfig {
    pub limits: ValidationLimits,
    pub logging: LoggingConfig,
}

impl WizardConfig {
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn from_path(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading wizard config {}", path.display()))?;
        Self::from_json_str(&raw).with_context(|| format!("parsing wizard config {}", path.display()))
    }

    /// Load from `CLEANORDER_CONFIG`, then apply `CLEANORDER_LOG`.
    pub fn from_env() -> anyhow::Result<Self> {
        let mut config = match std::env::var(CONFIG_ENV) {
            Ok(path) => Self::from_path(path)?,
            Err(_) => {
                tracing::warn!("{CONFIG_ENV} not set; using default wizard configuration");
                Self::default()
            }
        };
        match std::env::var(LOG_ENV) {
            Ok(filter) => config.logging.filter = filter,
            Err(_) => tracing::warn!(
                filter = %config.logging.filter,
                "{LOG_ENV} not set; using configured log filter"
            ),
        }
        Ok(config)
    }

    pub fn gate(&self) -> RuleValidationGate {
        RuleValidationGate::new(self.limits.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cleanorder_core::OrderId;

    #[test]
    fn empty_json_gives_defaults() {
        let config = WizardConfig::from_json_str("{}").unwrap();
        assert_eq!(config, WizardConfig::default());
        assert_eq!(config.limits.max_photos, 5);
        assert_eq!(config.logging.filter, "info");
    }

    #[test]
    fn nested_fields_override_individually() {
        let config = WizardConfig::from_json_str(
            r#"{"limits": {"max_items": 3}, "logging": {"json": false}}"#,
        )
        .unwrap();
        assert_eq!(config.limits.max_items, 3);
        assert_eq!(config.limits.quantity_max, 100);
        assert!(!config.logging.json);
        assert_eq!(config.gate().limits().max_items, 3);
    }

    #[test]
    fn from_path_reads_file_and_reports_missing_one() {
        let path = std::env::temp_dir().join(format!("cleanorder-{}.json", OrderId::new()));
        std::fs::write(&path, r#"{"limits": {"notes_max": 120}}"#).unwrap();
        let config = WizardConfig::from_path(&path).unwrap();
        assert_eq!(config.limits.notes_max, 120);
        std::fs::remove_file(&path).unwrap();

        let err = WizardConfig::from_path(&path).unwrap_err();
        assert!(err.to_string().contains("reading wizard config"));
    }
}
