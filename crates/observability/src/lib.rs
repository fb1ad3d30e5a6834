//! Tracing and logging setup shared by every binary embedding the wizard.

/// Initialize process-wide logging with the default configuration.
///
/// This is safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    self::tracing::init_with(&LoggingConfig::default());
}

/// Initialize process-wide logging from explicit settings.
pub fn init_with(config: &LoggingConfig) {
    self::tracing::init_with(config);
}

/// Tracing configuration (filters, output format).
pub mod tracing;

pub use self::tracing::LoggingConfig;
