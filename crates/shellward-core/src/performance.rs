//! Resource usage observed while one command ran.

use serde::{Deserialize, Serialize};

/// Network activity attributed to a command.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkActivity {
    /// Estimated number of requests.
    pub requests: u64,
    /// Estimated bytes transferred.
    pub bytes_transferred: u64,
}

/// Filesystem activity attributed to a command.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileSystemOperations {
    /// Read operations.
    pub reads: u64,
    /// Write operations.
    pub writes: u64,
    /// Bytes read.
    pub bytes_read: u64,
    /// Bytes written.
    pub bytes_written: u64,
}

/// Resource summary for one monitoring session.
///
/// CPU and memory are means over the samples taken; they are absent when no
/// sample was recorded.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PerformanceSnapshot {
    /// Mean CPU usage, in percent of one core.
    pub cpu_usage: Option<f64>,
    /// Mean resident memory, in bytes.
    pub memory_usage: Option<f64>,
    /// Network counters.
    pub network_activity: NetworkActivity,
    /// Filesystem counters.
    pub file_system_operations: FileSystemOperations,
}
