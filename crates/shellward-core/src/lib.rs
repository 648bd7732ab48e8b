//! Shellward Core - Foundation types shared by every Shellward crate.
//!
//! This crate provides:
//! - The risk tiers a command can be classified into ([`CommandCategory`])
//! - The immutable classification record ([`Categorization`])
//! - Session and timestamp identifiers
//! - An injectable [`Clock`] so time-based expiry is testable
//! - The error taxonomy shared by the gate ([`SecurityError`])
//! - The resource summary attached to executions ([`PerformanceSnapshot`])
//! - Directory scaffolding for the Shellward home

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod prelude;

pub mod category;
pub mod clock;
pub mod dirs;
pub mod error;
pub mod performance;
pub mod types;

pub use category::{Categorization, CommandCategory, CommandContext};
pub use clock::{Clock, ManualClock, SystemClock};
pub use dirs::ShellwardHome;
pub use error::{SecurityError, SecurityResult, ViolationKind};
pub use performance::{FileSystemOperations, NetworkActivity, PerformanceSnapshot};
pub use types::{SessionId, Timestamp};
