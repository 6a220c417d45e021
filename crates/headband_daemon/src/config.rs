//! Daemon configuration, loaded from a JSON file with sane defaults.

use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use tracing::info;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DaemonConfig {
    /// Per-modality ring buffer capacity in samples.
    #[serde(default = "default_capacity")]
    pub buffer_capacity: usize,
    /// Trailing window length served to the presentation sink, in seconds.
    #[serde(default = "default_window_seconds")]
    pub window_seconds: f64,
    /// Render tick interval in milliseconds.
    #[serde(default = "default_tick_ms")]
    pub tick_interval_ms: u64,
    /// Directory CSV session exports are written to.
    #[serde(default = "default_export_dir")]
    pub export_directory: String,
}

fn default_capacity() -> usize {
    500
}

fn default_window_seconds() -> f64 {
    5.0
}

fn default_tick_ms() -> u64 {
    50
}

fn default_export_dir() -> String {
    "./recordings".to_string()
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            buffer_capacity: default_capacity(),
            window_seconds: default_window_seconds(),
            tick_interval_ms: default_tick_ms(),
            export_directory: default_export_dir(),
        }
    }
}

/// Load the config file at `path`, or fall back to defaults when it does
/// not exist. A present-but-invalid file is an error, not a silent default.
pub fn load_config(path: &Path) -> anyhow::Result<DaemonConfig> {
    if !path.exists() {
        info!(path = %path.display(), "no config file, using defaults");
        return Ok(DaemonConfig::default());
    }
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("reading config file {}", path.display()))?;
    let config: DaemonConfig = serde_json::from_str(&contents)
        .with_context(|| format!("parsing config file {}", path.display()))?;
    info!(path = %path.display(), "loaded configuration");
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_stream_cadence() {
        let config = DaemonConfig::default();
        assert_eq!(config.buffer_capacity, 500);
        assert_eq!(config.tick_interval_ms, 50);
        assert_eq!(config.window_seconds, 5.0);
    }

    #[test]
    fn partial_config_files_fill_in_defaults() {
        let config: DaemonConfig = serde_json::from_str(r#"{"window_seconds": 10.0}"#).unwrap();
        assert_eq!(config.window_seconds, 10.0);
        assert_eq!(config.buffer_capacity, 500);
    }

    #[test]
    fn missing_file_yields_defaults_and_bad_json_errors() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.json");
        assert!(load_config(&missing).is_ok());

        let bad = dir.path().join("bad.json");
        std::fs::write(&bad, "{not json").unwrap();
        assert!(load_config(&bad).is_err());
    }
}
