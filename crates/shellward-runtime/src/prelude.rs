//! Prelude module - commonly used types for convenient import.
//!
//! Use `use shellward_runtime::prelude::*;` to import all essential types.

// Pipeline
pub use crate::{Authorization, CommandGuard, GuardSettings, GuardedExecution};

// Execution seam
pub use crate::{CommandExecutor, CommandOutput, DryRunExecutor, ExecutionRequest};

// Errors
pub use crate::{RuntimeError, RuntimeResult};

// Headless prompts
pub use shellward_approval::{AutoDenyPrompt, ConfirmationPrompt, StaticPrompt};
