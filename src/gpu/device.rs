//! Per-device memory readings.
//!
//! One [`GpuReading`] corresponds to one row of the nvidia-smi query output.
//! Readings are immutable once parsed and live only for the current run.

use serde::{Deserialize, Serialize};

/// A single GPU's memory usage at query time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GpuReading {
    /// Device index as reported by the driver.
    pub index: u32,

    /// Device name (e.g. "NVIDIA GeForce RTX 3080").
    pub name: String,

    /// Used memory in MB.
    pub memory_used_mb: u64,

    /// Total memory in MB.
    pub memory_total_mb: u64,
}

impl GpuReading {
    /// Whether this device counts as free under the given threshold.
    ///
    /// Strictly less-than: a device sitting exactly at the threshold is
    /// occupied.
    pub fn is_free(&self, threshold_mb: u64) -> bool {
        self.memory_used_mb < threshold_mb
    }
}
