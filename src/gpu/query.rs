//! Runs the external GPU query command.
//!
//! Invokes nvidia-smi with a CSV query and captures stdout as text. The
//! invocation is the only hardware-touching step in the pipeline; everything
//! downstream works on the returned string, so the parser and classifier are
//! testable without a GPU.

use std::io::ErrorKind;
use std::process::Stdio;
use std::time::Duration;

use thiserror::Error;
use tokio::process::Command;
use tracing::debug;

use crate::config::QueryConfig;

/// Fields requested from the query tool, in output order.
pub const QUERY_FIELDS: &str = "index,name,memory.used,memory.total";

/// Output format: comma-separated values, no header row, no unit suffixes.
pub const QUERY_FORMAT: &str = "csv,noheader,nounits";

#[derive(Error, Debug)]
pub enum QueryError {
    #[error("{binary} not found. Make sure NVIDIA drivers are installed")]
    CommandNotFound { binary: String },

    #[error("{binary} exited with {status}: {stderr}")]
    CommandFailed {
        binary: String,
        status: std::process::ExitStatus,
        stderr: String,
    },

    #[error("{binary} did not finish within {timeout_secs}s")]
    TimedOut { binary: String, timeout_secs: u64 },

    #[error("failed to run {binary}: {source}")]
    Io {
        binary: String,
        source: std::io::Error,
    },
}

/// The external query command.
pub struct GpuQuery {
    binary: String,
    timeout: Duration,
}

impl GpuQuery {
    pub fn new(config: &QueryConfig) -> Self {
        Self {
            binary: config.binary.clone(),
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }

    /// Run the query and return its raw stdout.
    ///
    /// The child's stderr is captured so it can be included in the error when
    /// the tool exits non-zero (e.g. "Driver not loaded").
    pub async fn run(&self) -> Result<String, QueryError> {
        debug!(binary = %self.binary, fields = QUERY_FIELDS, "Running GPU query");

        let result = tokio::time::timeout(
            self.timeout,
            Command::new(&self.binary)
                .arg(format!("--query-gpu={QUERY_FIELDS}"))
                .arg(format!("--format={QUERY_FORMAT}"))
                .stdin(Stdio::null())
                .output(),
        )
        .await
        .map_err(|_| QueryError::TimedOut {
            binary: self.binary.clone(),
            timeout_secs: self.timeout.as_secs(),
        })?;

        let output = result.map_err(|e| {
            if e.kind() == ErrorKind::NotFound {
                QueryError::CommandNotFound {
                    binary: self.binary.clone(),
                }
            } else {
                QueryError::Io {
                    binary: self.binary.clone(),
                    source: e,
                }
            }
        })?;

        if !output.status.success() {
            return Err(QueryError::CommandFailed {
                binary: self.binary.clone(),
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        debug!(bytes = output.stdout.len(), "GPU query finished");
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query_for(binary: &str) -> GpuQuery {
        GpuQuery::new(&QueryConfig {
            binary: binary.to_string(),
            timeout_secs: 5,
        })
    }

    #[tokio::test]
    async fn test_missing_binary_maps_to_command_not_found() {
        let err = query_for("definitely-not-a-real-smi-binary")
            .run()
            .await
            .unwrap_err();
        assert!(matches!(err, QueryError::CommandNotFound { .. }));
    }

    #[tokio::test]
    async fn test_nonzero_exit_maps_to_command_failed() {
        // `false` exits 1 with no output on any Unix.
        let err = query_for("false").run().await.unwrap_err();
        match err {
            QueryError::CommandFailed { status, .. } => assert_eq!(status.code(), Some(1)),
            other => panic!("expected CommandFailed, got {other:?}"),
        }
    }
}
