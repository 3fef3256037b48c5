//! gpu-free: find idle NVIDIA GPUs.
//!
//! Shells out to nvidia-smi, parses its CSV query output, and reports which
//! devices have memory usage below a configurable threshold (default 300 MB).
//! One linear pipeline per run:
//!   query → parse → classify → report
//!
//! The query step is the only one that touches hardware; everything after it
//! operates on plain text and parsed readings, so the pipeline is testable
//! without a GPU.

pub mod config;
pub mod gpu;
pub mod report;
