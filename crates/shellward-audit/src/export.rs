//! Rendering logs for export.

use std::fmt::Write as _;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::entry::{ExecutionLogEntry, SecurityEvent};
use crate::error::AuditResult;
use crate::stats::ExecutionStatistics;

/// Output format for [`ExecutionLogger::export_logs`](crate::ExecutionLogger::export_logs).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// Pretty-printed JSON document.
    Json,
    /// One row per execution.
    Csv,
    /// The on-disk line format.
    Text,
    /// Standalone page with statistics.
    Html,
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "csv" => Ok(Self::Csv),
            "text" | "txt" => Ok(Self::Text),
            "html" => Ok(Self::Html),
            other => Err(format!(
                "unknown export format '{other}' (expected json, csv, text or html)"
            )),
        }
    }
}

#[derive(Serialize)]
struct JsonExport<'a> {
    executions: &'a [ExecutionLogEntry],
    security_events: &'a [SecurityEvent],
}

/// Render `executions` and `events` in `format`.
///
/// # Errors
///
/// Returns [`AuditError::SerializationError`](crate::AuditError::SerializationError)
/// if JSON encoding fails.
pub fn render(
    format: ExportFormat,
    executions: &[ExecutionLogEntry],
    events: &[SecurityEvent],
) -> AuditResult<String> {
    match format {
        ExportFormat::Json => Ok(serde_json::to_string_pretty(&JsonExport {
            executions,
            security_events: events,
        })?),
        ExportFormat::Csv => Ok(render_csv(executions)),
        ExportFormat::Text => Ok(render_text(executions, events)),
        ExportFormat::Html => Ok(render_html(executions, events)),
    }
}

const CSV_HEADER: &str = "id,session_id,timestamp,command,working_directory,exit_code,execution_time_ms,success,category,error_type";

fn render_csv(executions: &[ExecutionLogEntry]) -> String {
    let mut out = String::from(CSV_HEADER);
    out.push('\n');
    for e in executions {
        let fields = [
            e.id.to_string(),
            e.session_id.to_string(),
            e.timestamp.to_rfc3339(),
            e.command.clone(),
            e.working_directory.display().to_string(),
            e.exit_code.map(|c| c.to_string()).unwrap_or_default(),
            e.execution_time_ms.to_string(),
            e.success.to_string(),
            e.category.map(|c| c.to_string()).unwrap_or_default(),
            e.error_type.clone().unwrap_or_default(),
        ];
        let row: Vec<String> = fields.iter().map(|f| csv_field(f)).collect();
        out.push_str(&row.join(","));
        out.push('\n');
    }
    out
}

fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_owned()
    }
}

fn render_text(executions: &[ExecutionLogEntry], events: &[SecurityEvent]) -> String {
    let mut out = String::new();
    for e in executions {
        out.push_str(&e.log_line());
        out.push('\n');
    }
    if !events.is_empty() {
        out.push_str("\n# Security events\n");
        for ev in events {
            out.push_str(&ev.log_line());
            out.push('\n');
        }
    }
    out
}

fn render_html(executions: &[ExecutionLogEntry], events: &[SecurityEvent]) -> String {
    let stats = ExecutionStatistics::compute(executions, events);
    let mut out = String::from(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>Shellward execution log</title>\n</head>\n<body>\n",
    );

    out.push_str("<h1>Shellward execution log</h1>\n<h2>Statistics</h2>\n<ul>\n");
    let _ = writeln!(out, "<li>Total executions: {}</li>", stats.total_executions);
    let _ = writeln!(
        out,
        "<li>Success rate: {:.1}%</li>",
        stats.success_rate * 100.0
    );
    let _ = writeln!(
        out,
        "<li>Mean execution time: {:.1}ms</li>",
        stats.mean_execution_ms
    );
    for (category, count) in &stats.categories {
        let _ = writeln!(out, "<li>{category}: {count}</li>");
    }
    for (event_type, count) in &stats.security_events {
        let _ = writeln!(out, "<li>Security events ({event_type}): {count}</li>");
    }
    out.push_str("</ul>\n");

    out.push_str("<h2>Executions</h2>\n<table>\n<tr><th>Time</th><th>Command</th><th>Directory</th><th>Exit</th><th>Duration (ms)</th><th>Success</th><th>Category</th></tr>\n");
    for e in executions {
        let _ = writeln!(
            out,
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
            e.timestamp.to_rfc3339(),
            escape_html(&e.command),
            escape_html(&e.working_directory.display().to_string()),
            e.exit_code.map(|c| c.to_string()).unwrap_or_default(),
            e.execution_time_ms,
            e.success,
            e.category.map(|c| c.to_string()).unwrap_or_default(),
        );
    }
    out.push_str("</table>\n");

    if !events.is_empty() {
        out.push_str("<h2>Security events</h2>\n<table>\n<tr><th>Time</th><th>Type</th><th>Severity</th><th>Command</th><th>Reason</th></tr>\n");
        for ev in events {
            let _ = writeln!(
                out,
                "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
                ev.timestamp.to_rfc3339(),
                ev.event_type,
                ev.severity,
                escape_html(&ev.command),
                escape_html(&ev.reason),
            );
        }
        out.push_str("</table>\n");
    }

    out.push_str("</body>\n</html>\n");
    out
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
