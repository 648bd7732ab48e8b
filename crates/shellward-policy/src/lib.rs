//! Shellward Policy - Decides whether a proposed shell command may run.
//!
//! Raw command text flows through three stages:
//!
//! - **[`Sanitizer`]**: structural validation (length, control characters,
//!   shell-expansion hazards, injection chaining) and normalization
//! - **[`Categorizer`]**: classification into Safe, Risky, Dangerous or
//!   Blocked using prioritized pattern tables
//! - **[`PolicyFilter`]**: combines both with the configured allow/block
//!   lists, trusted patterns and the workspace boundary into one
//!   [`PolicyDecision`]
//!
//! # Example
//!
//! ```rust,ignore
//! use shellward_policy::prelude::*;
//!
//! let filter = PolicyFilter::new(
//!     Sanitizer::new(SanitizerRules::default())?,
//!     Categorizer::default(),
//!     FilterSettings::default(),
//! )?;
//!
//! let decision = filter.filter_command("mkdir build", Path::new("/work"));
//! assert!(decision.allowed());
//! assert!(decision.requires_confirmation());
//! ```

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod prelude;

pub mod categorizer;
pub mod decision;
pub mod error;
pub mod filter;
pub mod pattern;
pub mod sanitizer;

pub use categorizer::{CategoryRules, Categorizer};
pub use decision::PolicyDecision;
pub use error::{PolicyError, PolicyResult};
pub use filter::{FilterSettings, PolicyFilter};
pub use pattern::Pattern;
pub use sanitizer::{Sanitizer, SanitizerRules, ValidationFailure, ValidationResult};
