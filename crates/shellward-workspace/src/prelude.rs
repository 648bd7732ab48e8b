//! Prelude module - commonly used types for convenient import.
//!
//! Use `use shellward_workspace::prelude::*;` to import all essential types.

// Enforcement
pub use crate::{BoundaryEnforcer, BoundaryReport, BoundaryViolation};

// Validation
pub use crate::{PathValidator, WorkspaceSecurity};

// Errors
pub use crate::{WorkspaceError, WorkspaceResult};
