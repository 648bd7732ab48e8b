//! Prelude module - commonly used types for convenient import.
//!
//! Use `use shellward_approval::prelude::*;` to import all essential types.

// Gate
pub use crate::{ConfirmationGate, ConfirmationPrompt};

// Requests
pub use crate::{ConfirmationDecision, ConfirmationRequest, ConfirmationResponse};

// Session memory
pub use crate::{RememberedDecision, SessionDecision, SessionMemory};

// Headless prompts
pub use crate::{AutoDenyPrompt, StaticPrompt};

// Errors
pub use crate::{ApprovalError, ApprovalResult};
