//! Shellward Runtime - The end-to-end command pipeline.
//!
//! [`CommandGuard`] wires the stages together:
//!
//! ```text
//! command ─► PolicyFilter ─► ConfirmationGate ─► CommandExecutor ─► ExecutionLogger
//!                 │                 │                   │
//!                 └── refusal ──────┴──► security log   └── PerformanceMonitor
//! ```
//!
//! The [`config_bridge`] module turns a loaded `shellward_config::Config`
//! into the settings each stage takes.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use shellward_runtime::prelude::*;
//!
//! let resolved = shellward_config::Config::load(Some(&cwd))?;
//! let guard = CommandGuard::from_config(
//!     &resolved.config,
//!     &cwd,
//!     None,
//!     Arc::new(AutoDenyPrompt),
//!     executor,
//! )?;
//!
//! match guard.run("cargo build", &cwd).await {
//!     Ok(run) => println!("exit {:?}", run.output.exit_code),
//!     Err(refusal) => eprintln!("refused: {refusal}"),
//! }
//! ```

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod prelude;

pub mod config_bridge;
mod error;
pub mod executor;
pub mod guard;

pub use error::{RuntimeError, RuntimeResult};
pub use executor::{CommandExecutor, CommandOutput, DryRunExecutor, ExecutionRequest};
pub use guard::{
    Authorization, CommandGuard, EXECUTION_TIMEOUT_ERROR, EXIT_STATUS_ERROR, GuardSettings,
    GuardedExecution,
};
