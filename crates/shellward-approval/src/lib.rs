//! Shellward Approval - Human confirmation for commands that need it.
//!
//! When the policy filter asks for confirmation, the [`ConfirmationGate`]
//! first consults [`SessionMemory`] for a remembered answer and otherwise
//! suspends on an injected [`ConfirmationPrompt`] until a human answers or
//! the timeout elapses.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use shellward_approval::prelude::*;
//!
//! let gate = ConfirmationGate::new(Arc::new(AutoDenyPrompt))
//!     .with_memory(Arc::new(SessionMemory::default()));
//!
//! let response = gate.prompt_user(&request).await;
//! assert!(!response.is_approved());
//! ```

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod prelude;

/// Error types and results for the approval module.
pub mod error;
pub mod gate;
pub mod memory;
pub mod prompt;
pub mod request;

pub use error::{ApprovalError, ApprovalResult};
pub use gate::ConfirmationGate;
pub use memory::{RememberedDecision, SessionDecision, SessionMemory, derive_pattern};
pub use prompt::{AutoDenyPrompt, ConfirmationPrompt, StaticPrompt};
pub use request::{ConfirmationDecision, ConfirmationRequest, ConfirmationResponse};
