//! Prelude module - commonly used types for convenient import.
//!
//! Use `use shellward_test::prelude::*;` to import all essential types.

// Mocks
pub use crate::{MockExecutor, ScriptedPrompt};

// Fixtures
pub use crate::{GuardHarness, init_test_tracing, test_categorization, test_config};
