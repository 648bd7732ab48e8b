//! Prelude module - commonly used types for convenient import.
//!
//! Use `use shellward_audit::prelude::*;` to import all essential types.

// Logging
pub use crate::{ExecutionLogger, LoggerSettings};

// Records
pub use crate::{ExecutionLogEntry, ExecutionRecord, SecurityEvent, SecurityEventType, Severity};

// Reading back
pub use crate::{ExecutionStatistics, ExportFormat, LogQuery};

// Errors
pub use crate::{AuditError, AuditResult};
