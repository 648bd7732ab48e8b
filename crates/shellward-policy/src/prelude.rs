//! Prelude module - commonly used types for convenient import.
//!
//! Use `use shellward_policy::prelude::*;` to import all essential types.

// Decisions
pub use crate::{FilterSettings, PolicyDecision, PolicyFilter};

// Stages
pub use crate::{CategoryRules, Categorizer, Sanitizer, SanitizerRules, ValidationResult};

// Errors
pub use crate::{PolicyError, PolicyResult};
