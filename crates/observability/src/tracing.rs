//! Tracing/logging initialization.

use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

/// Log output settings.
///
/// `RUST_LOG` wins over `filter` when it is set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is absent.
    pub filter: String,
    /// JSON lines instead of human-readable text.
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
            json: true,
        }
    }
}

impl LoggingConfig {
    pub(crate) fn env_filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(&self.filter))
            .unwrap_or_else(|_| EnvFilter::new("info"))
    }
}

/// Initialize tracing/logging for the process.
///
/// Safe to call multiple times (subsequent calls are no-ops).
pub fn init_with(config: &LoggingConfig) {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(config.env_filter())
        .with_timer(tracing_subscriber::fmt::time::SystemTime)
        .with_target(false);

    // A second call finds a global subscriber already installed; ignore that.
    let _ = if config.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_json_at_info() {
        let config = LoggingConfig::default();
        assert_eq!(config.filter, "info");
        assert!(config.json);
    }

    #[test]
    fn partial_config_keeps_defaults() {
        let config: LoggingConfig = serde_json::from_str(r#"{"json": false}"#).unwrap();
        assert_eq!(config.filter, "info");
        assert!(!config.json);
    }

    #[test]
    fn init_twice_is_harmless() {
        init_with(&LoggingConfig::default());
        init_with(&LoggingConfig {
            filter: "debug".into(),
            json: false,
        });
        ::tracing::info!("still logging");
    }
}
