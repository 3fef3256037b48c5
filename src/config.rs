//! Runtime configuration for gpu-free.
//!
//! Configuration can be loaded from a JSON file or constructed programmatically.
//! The query command and the free/occupied threshold live here; CLI flags win
//! over file values.

use std::path::PathBuf;

use clap::Parser;
use serde::{Deserialize, Serialize};

/// Memory threshold (MB) below which a GPU counts as free.
pub const DEFAULT_THRESHOLD_MB: u64 = 300;

/// Command-line arguments.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "gpu-free",
    about = "Find GPUs that are currently not in use (memory usage < threshold)"
)]
pub struct Cli {
    /// Memory usage threshold in MB to consider a GPU free.
    #[arg(short, long)]
    pub threshold: Option<u64>,

    /// Show every device with its memory usage and free/occupied status.
    #[arg(short, long, conflicts_with_all = ["quiet", "json"])]
    pub verbose: bool,

    /// Print nothing; the exit code reports whether a free GPU exists.
    #[arg(short, long, conflicts_with = "json")]
    pub quiet: bool,

    /// Emit the report as a JSON document.
    #[arg(long)]
    pub json: bool,

    /// Path to configuration file (JSON).
    #[arg(short, long, default_value = "gpu-free.json")]
    pub config: PathBuf,
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// External query command settings.
    pub query: QueryConfig,

    /// Report settings.
    pub report: ReportConfig,
}

/// Settings for the external GPU query command.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryConfig {
    /// Query binary to invoke (e.g. "nvidia-smi").
    pub binary: String,

    /// Abort the query if the command runs longer than this many seconds.
    pub timeout_secs: u64,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            binary: "nvidia-smi".to_string(),
            timeout_secs: 10,
        }
    }
}

/// Settings for classification and reporting.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Memory usage threshold in MB; devices strictly below it are free.
    pub threshold_mb: u64,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            threshold_mb: DEFAULT_THRESHOLD_MB,
        }
    }
}

impl Config {
    /// Load configuration from a JSON file, falling back to defaults when the
    /// file does not exist.
    pub fn load(path: &std::path::Path) -> anyhow::Result<Self> {
        if path.exists() {
            let data = std::fs::read_to_string(path)?;
            let config: Config = serde_json::from_str(&data)?;
            Ok(config)
        } else {
            tracing::debug!("Config file not found at {:?}, using defaults", path);
            Ok(Config::default())
        }
    }

    /// Resolve the effective threshold: the `-t` flag wins over the file.
    pub fn effective_threshold(&self, cli: &Cli) -> u64 {
        cli.threshold.unwrap_or(self.report.threshold_mb)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let cfg = Config::default();
        assert_eq!(cfg.query.binary, "nvidia-smi");
        assert_eq!(cfg.query.timeout_secs, 10);
        assert_eq!(cfg.report.threshold_mb, 300);
    }

    #[test]
    fn test_cli_threshold_overrides_file() {
        let cfg = Config::default();
        let cli = Cli::parse_from(["gpu-free", "-t", "500"]);
        assert_eq!(cfg.effective_threshold(&cli), 500);

        let cli = Cli::parse_from(["gpu-free"]);
        assert_eq!(cfg.effective_threshold(&cli), 300);
    }

    #[test]
    fn test_output_flags_conflict() {
        assert!(Cli::try_parse_from(["gpu-free", "-v", "-q"]).is_err());
        assert!(Cli::try_parse_from(["gpu-free", "-v", "--json"]).is_err());
        assert!(Cli::try_parse_from(["gpu-free", "-q", "--json"]).is_err());
    }

    #[test]
    fn test_partial_config_file_fills_defaults() {
        let cfg: Config = serde_json::from_str(r#"{"report": {"threshold_mb": 100}}"#).unwrap();
        assert_eq!(cfg.report.threshold_mb, 100);
        assert_eq!(cfg.query.binary, "nvidia-smi");
    }
}
