//! Report rendering and exit-code policy.
//!
//! Rendering is pure (readings in, text out) so every mode is testable
//! without running the query tool; `main` only prints the result.

use serde::Serialize;

use crate::config::Cli;
use crate::gpu::classify::free_devices;
use crate::gpu::device::GpuReading;

/// Printed in index mode when no device is below the threshold.
pub const NO_FREE_GPUS: &str = "No free GPUs found.";

/// Output mode, resolved from the mutually exclusive CLI flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportMode {
    /// Free device indexes, space-separated, one line.
    Indexes,
    /// Every device with its memory usage and free/occupied status.
    Verbose,
    /// No stdout; the exit code carries the result.
    Quiet,
    /// Machine-readable JSON document.
    Json,
}

impl ReportMode {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            ReportMode::Json
        } else if cli.quiet {
            ReportMode::Quiet
        } else if cli.verbose {
            ReportMode::Verbose
        } else {
            ReportMode::Indexes
        }
    }
}

#[derive(Serialize)]
struct JsonReport<'a> {
    threshold_mb: u64,
    devices: Vec<JsonDevice<'a>>,
}

#[derive(Serialize)]
struct JsonDevice<'a> {
    index: u32,
    name: &'a str,
    memory_used_mb: u64,
    memory_total_mb: u64,
    free: bool,
}

/// Render the report for the given mode.
///
/// Quiet mode renders the empty string; callers should skip printing it.
pub fn render(
    readings: &[GpuReading],
    threshold_mb: u64,
    mode: ReportMode,
) -> anyhow::Result<String> {
    let free = free_devices(readings, threshold_mb);

    let out = match mode {
        ReportMode::Quiet => String::new(),
        ReportMode::Indexes => {
            if free.is_empty() {
                NO_FREE_GPUS.to_string()
            } else {
                free.iter()
                    .map(|r| r.index.to_string())
                    .collect::<Vec<_>>()
                    .join(" ")
            }
        }
        ReportMode::Verbose => readings
            .iter()
            .map(|r| {
                let status = if r.is_free(threshold_mb) {
                    "free"
                } else {
                    "occupied"
                };
                format!(
                    "GPU {}: {} ({}MB / {}MB used) [{}]",
                    r.index, r.name, r.memory_used_mb, r.memory_total_mb, status
                )
            })
            .collect::<Vec<_>>()
            .join("\n"),
        ReportMode::Json => {
            let report = JsonReport {
                threshold_mb,
                devices: readings
                    .iter()
                    .map(|r| JsonDevice {
                        index: r.index,
                        name: &r.name,
                        memory_used_mb: r.memory_used_mb,
                        memory_total_mb: r.memory_total_mb,
                        free: r.is_free(threshold_mb),
                    })
                    .collect(),
            };
            serde_json::to_string_pretty(&report)?
        }
    };

    Ok(out)
}

/// Process exit code for a successful run.
///
/// Only quiet mode communicates through the exit code: 0 when at least one
/// free GPU exists, 1 otherwise. The other modes report through stdout and
/// exit 0 whenever the query and parse succeeded.
pub fn exit_code(readings: &[GpuReading], threshold_mb: u64, mode: ReportMode) -> i32 {
    match mode {
        ReportMode::Quiet => {
            if free_devices(readings, threshold_mb).is_empty() {
                1
            } else {
                0
            }
        }
        _ => 0,
    }
}
