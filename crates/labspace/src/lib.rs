//! Core library for the lab common-space service.
//!
//! The numeric subsystems live under [`workflows`]: composite material
//! screening/selection, tensile curve metrics, and DSC thermal-event
//! extraction. Everything here is a pure computation over in-memory
//! structures; persistence goes through the repository traits so the
//! service and tests can swap backends.

pub mod config;
pub mod error;
pub mod telemetry;
pub mod workflows;
