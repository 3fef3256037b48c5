//! GPU discovery via the external query tool.
//!
//! - [`device`]: per-device memory reading
//! - [`query`]: runs the nvidia-smi query and captures its output
//! - [`parser`]: turns the captured CSV text into readings
//! - [`classify`]: marks readings free or occupied against a threshold

pub mod classify;
pub mod device;
pub mod parser;
pub mod query;
