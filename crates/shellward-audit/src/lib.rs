//! Shellward Audit - Append-only record of what the gate ran and refused.
//!
//! Two logs are kept per session:
//!
//! - **Execution log**: one [`ExecutionLogEntry`] per command that ran or
//!   was refused, with exit status, timing, category and captured output
//! - **Security log**: one [`SecurityEvent`] per refusal that indicates a
//!   probe (blocked command, injection attempt, workspace escape)
//!
//! Both are bounded in memory and mirrored to line-oriented files under the
//! Shellward home. Captured output is redacted and truncated before storage.
//! Logging never fails the caller; file problems surface on the
//! `shellward::diagnostics` tracing target.

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod prelude;

pub mod entry;
pub mod error;
pub mod export;
pub mod logger;
pub mod query;
pub mod redact;
pub mod stats;

pub use entry::{ExecutionLogEntry, ExecutionRecord, SecurityEvent, SecurityEventType, Severity};
pub use error::{AuditError, AuditResult};
pub use export::ExportFormat;
pub use logger::{DIAGNOSTICS_TARGET, ExecutionLogger, LoggerSettings, read_tail};
pub use query::LogQuery;
pub use redact::{redact_secrets, truncate_output};
pub use stats::{CommandStat, ErrorStat, ExecutionStatistics, TimeBuckets};
