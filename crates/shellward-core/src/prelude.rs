//! Prelude module - commonly used types for convenient import.
//!
//! Use `use shellward_core::prelude::*;` to import all essential types.

// Errors
pub use crate::{SecurityError, SecurityResult, ViolationKind};

// Classification
pub use crate::{Categorization, CommandCategory, CommandContext};

// Execution metrics
pub use crate::PerformanceSnapshot;

// Time
pub use crate::{Clock, ManualClock, SystemClock};

// Common types
pub use crate::{SessionId, ShellwardHome, Timestamp};
