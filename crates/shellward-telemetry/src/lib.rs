//! Shellward Telemetry - Tracing setup and per-execution performance monitoring.
//!
//! This crate provides:
//! - Configurable `tracing` subscriber setup with multiple formats and
//!   targets ([`LogConfig`], [`setup_logging`])
//! - A [`PerformanceMonitor`] that samples CPU and memory while a command
//!   runs
//! - Static estimators for the file and network activity of a command line
//!
//! # Example
//!
//! ```rust,no_run
//! use shellward_telemetry::{LogConfig, LogFormat, setup_logging};
//!
//! # fn main() -> Result<(), shellward_telemetry::TelemetryError> {
//! let config = LogConfig::new("debug")
//!     .with_format(LogFormat::Pretty)
//!     .with_directive("shellward_policy=trace");
//!
//! setup_logging(&config)?;
//! tracing::info!("gate ready");
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod prelude;

pub mod estimate;
mod error;
mod logging;
pub mod monitor;

pub use error::{TelemetryError, TelemetryResult};
pub use estimate::{estimate_file_operations, estimate_network_activity};
pub use logging::{
    LOG_FILE_PREFIX, LogConfig, LogFormat, LogTarget, setup_default_logging, setup_logging,
};
#[cfg(unix)]
pub use monitor::RusageSampler;
pub use monitor::{
    DEFAULT_SAMPLE_INTERVAL, NullSampler, PerformanceMonitor, ResourceSample, ResourceSampler,
    default_sampler,
};
