//! Structured logging configuration.

use crate::config::{LogFormat, LoggingSettings};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter.
pub const LOG_ENV: &str = "MOTIFSCOPE_LOG";

/// Resolved logging configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    /// Output format.
    pub format: LogFormat,
    /// Filter directive.
    pub directive: String,
    /// Optional log file.
    pub file: Option<PathBuf>,
}

impl LoggingConfig {
    /// Resolves the filter from settings and environment.
    ///
    /// `MOTIFSCOPE_LOG` wins over `RUST_LOG`, which wins over the configured
    /// level. `verbose` raises the configured level to `debug`.
    #[must_use]
    pub fn from_settings(settings: &LoggingSettings, verbose: bool) -> Self {
        let configured = if verbose {
            "debug".to_string()
        } else {
            settings.level.clone()
        };
        let directive = [LOG_ENV, "RUST_LOG"]
            .iter()
            .find_map(|var| std::env::var(var).ok().filter(|v| !v.trim().is_empty()))
            .unwrap_or(configured);

        Self {
            format: settings.format,
            directive,
            file: settings.file.clone(),
        }
    }

    /// Builds the subscriber filter, falling back to `info` for an invalid
    /// directive.
    #[must_use]
    pub fn filter(&self) -> EnvFilter {
        EnvFilter::try_new(&self.directive).unwrap_or_else(|_| EnvFilter::new("info"))
    }
}
