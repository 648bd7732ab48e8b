//! Shellward Test - Shared test utilities for the command gate.
//!
//! Scripted confirmation prompts, a recording executor and fixtures that
//! assemble a [`CommandGuard`](shellward_runtime::CommandGuard) over a
//! temporary workspace.
//!
//! # Usage
//!
//! ```toml
//! [dev-dependencies]
//! shellward-test.workspace = true
//! ```
//!
//! ```rust,ignore
//! use shellward_test::prelude::*;
//!
//! #[tokio::test]
//! async fn risky_command_is_confirmed() {
//!     let prompt = ScriptedPrompt::new().then_allow();
//!     let harness = GuardHarness::new(prompt.clone(), MockExecutor::new());
//!
//!     harness.run("mkdir build").await.unwrap();
//!     assert_eq!(prompt.requests().len(), 1);
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]

pub mod prelude;

pub mod fixtures;
pub mod mocks;

pub use fixtures::*;
pub use mocks::*;
