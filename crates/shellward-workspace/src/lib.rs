//! Shellward Workspace - Keeps commands inside the workspace root.
//!
//! Every filesystem path a command references, including `cd` targets, is
//! resolved and checked against the workspace before the command may run.
//!
//! # Key Concepts
//!
//! - **[`PathValidator`]**: resolves one path and confirms it stays inside the root
//! - **[`WorkspaceSecurity`]**: the default validator (lexical normalization plus symlink resolution)
//! - **[`BoundaryEnforcer`]**: applies the validator to whole commands and adds
//!   system-path and denied-glob checks
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use shellward_workspace::{BoundaryEnforcer, WorkspaceSecurity};
//!
//! let security = WorkspaceSecurity::new("/home/user/project")?;
//! let enforcer = BoundaryEnforcer::new(Arc::new(security), &[]);
//!
//! let report = enforcer.enforce("cat ../secrets", Path::new("/home/user/project"));
//! assert!(!report.is_allowed());
//! ```

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod prelude;

pub mod enforcer;
pub mod error;
pub mod paths;
pub mod validator;

pub use enforcer::{
    BoundaryEnforcer, BoundaryReport, BoundaryViolation, PathValidationResult,
    WorkingDirectoryValidationResult,
};
pub use error::{WorkspaceError, WorkspaceResult};
pub use validator::{PathValidator, WorkspaceSecurity};
