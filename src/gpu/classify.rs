//! Free/occupied classification.
//!
//! A device is free when its used memory is strictly below the threshold.
//! Pure functions over parsed readings; no side effects.

use crate::gpu::device::GpuReading;

/// Return the readings considered free under `threshold_mb`, in input order.
pub fn free_devices(readings: &[GpuReading], threshold_mb: u64) -> Vec<&GpuReading> {
    readings
        .iter()
        .filter(|r| r.is_free(threshold_mb))
        .collect()
}
