//! Diagnostics accumulated by the decoder.
//!
//! Decoding never aborts: structural problems become [`Diagnostic`] records
//! on the result and the cursor recovers. Both severities share one record
//! shape -- message, cursor position (char index plus 1-based line/column),
//! the schema context label at the time of the report, and a short source
//! excerpt around the cursor.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

#[derive(Debug, Clone, Serialize, thiserror::Error)]
#[error("[{severity:?}] {message} (at {line}:{column})")]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
    /// Char offset into the decoded buffer (schema prefix included).
    pub position: usize,
    /// 1-based.
    pub line: u32,
    /// 1-based.
    pub column: u32,
    /// Type label of the schema context the decoder was working under.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
    /// Source window around the cursor, newlines escaped.
    pub context: String,
}
