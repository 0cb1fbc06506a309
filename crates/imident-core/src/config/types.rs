//! Sub-configuration structs with defaults.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// ImageMagick binaries and run limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MagickConfig {
    /// Binary used for `identify -verbose` (supports ~)
    pub identify_bin: String,

    /// Binary used for conversions (supports ~)
    pub convert_bin: String,

    /// Wall-clock limit for one run in milliseconds
    pub timeout_ms: u64,
}

impl Default for MagickConfig {
    fn default() -> Self {
        Self {
            identify_bin: "identify".to_string(),
            convert_bin: "convert".to_string(),
            timeout_ms: 30_000,
        }
    }
}

impl MagickConfig {
    /// Resolved identify binary path (with ~ expansion).
    pub fn identify_path(&self) -> PathBuf {
        expand(&self.identify_bin)
    }

    /// Resolved convert binary path (with ~ expansion).
    pub fn convert_path(&self) -> PathBuf {
        expand(&self.convert_bin)
    }
}

fn expand(bin: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(bin).into_owned())
}

/// Output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Output format: "json" or "jsonl"
    pub format: String,

    /// Pretty-print JSON output
    pub pretty: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: "json".to_string(),
            pretty: false,
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: error, warn, info, debug, trace
    pub level: String,

    /// Log format: "pretty" or "json"
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}
