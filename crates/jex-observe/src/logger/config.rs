use std::io::IsTerminal;

use serde::{Deserialize, Serialize};

use crate::logger::level::LogLevel;

/// Output format for the logger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable text (default).
    #[default]
    Text,
    /// Structured JSON for log collectors.
    Json,
    /// systemd-journald output; init fails on non-Linux platforms.
    Journald,
}

/// Logger configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggerConfig {
    /// Output format.
    pub format: LogFormat,
    /// Filter expression (e.g. `"info"`, `"jex_core=debug,info"`).
    pub level: LogLevel,
    /// Whether to include module targets in log output.
    pub with_targets: bool,
    /// Whether to use colored output.
    pub use_color: bool,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::default(),
            level: LogLevel::default(),
            with_targets: true,
            use_color: true,
        }
    }
}

impl LoggerConfig {
    /// Color is used only when enabled in config and stdout is a terminal.
    ///
    /// Checked at init time rather than parse time so redirection is
    /// detected accurately.
    pub fn should_use_color(&self) -> bool {
        self.use_color && std::io::stdout().is_terminal()
    }
}
