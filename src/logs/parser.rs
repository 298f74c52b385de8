use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::models::record::LogRecord;

/// Three lazy fields up to the next comma, then the rest of the line.
static LINE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(.*?),(.*?),(.*?),(.*)$").expect("log line pattern compiles"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// Line dropped: not four comma-separated fields.
    Malformed,
    /// Record kept, but its reading is ignored by the aggregates.
    BadReading,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParseDiagnostic {
    /// 1-based line number in the source file.
    pub line: usize,
    pub kind: DiagnosticKind,
    pub reason: String,
}

/// Result of reading the event log: every record that parsed, plus what was skipped and why.
#[derive(Debug, Clone, Default)]
pub struct ParsedLog {
    pub records: Vec<LogRecord>,
    pub diagnostics: Vec<ParseDiagnostic>,
    pub source_error: Option<String>,
}

impl ParsedLog {
    /// Lines that produced no record.
    pub fn skipped_lines(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.kind == DiagnosticKind::Malformed)
            .count()
    }

    fn unavailable(reason: String) -> Self {
        Self {
            source_error: Some(reason),
            ..Self::default()
        }
    }
}

pub fn parse_line(line: &str) -> Option<LogRecord> {
    let caps = LINE_PATTERN.captures(line.trim())?;
    Some(LogRecord {
        date: caps[1].to_string(),
        user: caps[2].to_string(),
        action: caps[3].to_string(),
        value: caps[4].to_string(),
    })
}

pub fn parse_str(input: &str) -> ParsedLog {
    let mut parsed = ParsedLog::default();

    for (idx, line) in input.lines().enumerate() {
        let line_no = idx + 1;
        if line.trim().is_empty() {
            continue;
        }

        let Some(record) = parse_line(line) else {
            debug!(line = line_no, "Skipping malformed log line");
            parsed.diagnostics.push(ParseDiagnostic {
                line: line_no,
                kind: DiagnosticKind::Malformed,
                reason: "expected four comma-separated fields".into(),
            });
            continue;
        };

        // Kept in the table; aggregates skip the reading.
        if record.is_heart_rate() && record.heart_rate().is_none() {
            debug!(line = line_no, value = %record.value, "Non-integer heart rate");
            parsed.diagnostics.push(ParseDiagnostic {
                line: line_no,
                kind: DiagnosticKind::BadReading,
                reason: format!("heart rate value '{}' is not an integer", record.value),
            });
        }

        parsed.records.push(record);
    }

    parsed
}

/// Reads and parses the whole file. A missing or unreadable file degrades to an empty table
/// with `source_error` set.
pub async fn read_logs(path: &Path) -> ParsedLog {
    match tokio::fs::read_to_string(path).await {
        Ok(contents) => {
            let parsed = parse_str(&contents);
            info!(
                path = %path.display(),
                records = parsed.records.len(),
                skipped = parsed.skipped_lines(),
                diagnostics = parsed.diagnostics.len(),
                "Loaded event log"
            );
            parsed
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            warn!(path = %path.display(), "Log file not found");
            ParsedLog::unavailable(format!("log file not found: {}", path.display()))
        }
        Err(e) => {
            error!(path = %path.display(), error = %e, "Error reading logs");
            ParsedLog::unavailable(format!("failed to read {}: {e}", path.display()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_four_fields() {
        let record = parse_line("2024-01-01,alice,LOGIN,success").unwrap();
        assert_eq!(record.date, "2024-01-01");
        assert_eq!(record.user, "alice");
        assert_eq!(record.action, "LOGIN");
        assert_eq!(record.value, "success");
    }

    #[test]
    fn fewer_than_four_fields_is_skipped() {
        assert!(parse_line("2024-01-01,alice,LOGIN").is_none());
        assert!(parse_line("just text").is_none());
    }

    #[test]
    fn value_keeps_embedded_commas() {
        let record = parse_line("2024-01-01,bob,NOTE,felt fine, slept well,ok").unwrap();
        assert_eq!(record.action, "NOTE");
        assert_eq!(record.value, "felt fine, slept well,ok");
    }

    #[test]
    fn collects_diagnostics_for_skipped_lines() {
        let input = "2024-01-01,alice,LOGIN,success\nbroken line\n\n2024-01-02,alice,HEART_RATE,abc\n";
        let parsed = parse_str(input);

        assert_eq!(parsed.records.len(), 2);
        assert_eq!(parsed.diagnostics.len(), 2);
        assert_eq!(parsed.diagnostics[0].line, 2);
        assert_eq!(parsed.diagnostics[1].line, 4);
        assert!(parsed.diagnostics[1].reason.contains("abc"));
        assert_eq!(parsed.diagnostics[0].kind, DiagnosticKind::Malformed);
        assert_eq!(parsed.diagnostics[1].kind, DiagnosticKind::BadReading);
        assert_eq!(parsed.skipped_lines(), 1);
        assert!(parsed.source_error.is_none());
    }

    #[tokio::test]
    async fn missing_file_is_empty_not_fatal() {
        let parsed = read_logs(Path::new("/definitely/not/here.txt")).await;
        assert!(parsed.records.is_empty());
        assert!(parsed.source_error.is_some());
    }
}
