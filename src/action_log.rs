//! Append-only action log
//!
//! One line per operation attempt, in the form
//! `<ISO-8601 timestamp> - <VERB> request for SIRET: <id>`.
//! Lines go through a `tracing-appender` non-blocking writer, so recording
//! never waits on disk I/O; under sustained back-pressure lines are dropped.

use std::fmt;
use std::io::Write;
use std::path::Path;

use chrono::{DateTime, SecondsFormat, Utc};
use tracing::warn;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};

/// Operation recorded in the action log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestVerb {
    Get,
    Delete,
    Add,
    Update,
}

impl RequestVerb {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Delete => "DELETE",
            Self::Add => "ADD",
            Self::Update => "UPDATE",
        }
    }
}

impl fmt::Display for RequestVerb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Format one log line (newline included). Control characters in the
/// identifier are escaped so a crafted path cannot forge extra lines; all
/// other characters are written as received.
pub fn format_entry(at: DateTime<Utc>, verb: RequestVerb, id: &str) -> String {
    format!(
        "{} - {} request for SIRET: {}\n",
        at.to_rfc3339_opts(SecondsFormat::Millis, true),
        verb,
        escape_controls(id)
    )
}

fn escape_controls(id: &str) -> String {
    let mut out = String::with_capacity(id.len());
    for c in id.chars() {
        if c.is_control() {
            out.extend(c.escape_default());
        } else {
            out.push(c);
        }
    }
    out
}

/// Cloneable handle to the action log sink.
#[derive(Clone)]
pub struct ActionLog {
    writer: Option<NonBlocking>,
}

impl ActionLog {
    /// Append to `dir/file_name`. The returned guard flushes pending lines
    /// when dropped and must be kept alive for the life of the process.
    pub fn to_file(dir: impl AsRef<Path>, file_name: &str) -> (Self, WorkerGuard) {
        let appender = tracing_appender::rolling::never(dir, file_name);
        let (writer, guard) = tracing_appender::non_blocking(appender);
        (
            Self {
                writer: Some(writer),
            },
            guard,
        )
    }

    /// Log sink that discards everything.
    pub fn disabled() -> Self {
        Self { writer: None }
    }

    pub fn record(&self, verb: RequestVerb, id: &str) {
        self.record_at(Utc::now(), verb, id);
    }

    pub fn record_at(&self, at: DateTime<Utc>, verb: RequestVerb, id: &str) {
        let Some(writer) = &self.writer else {
            return;
        };
        let mut writer = writer.clone();
        if let Err(e) = writer.write_all(format_entry(at, verb, id).as_bytes()) {
            warn!("Failed to write action log entry: {}", e);
        }
    }
}

impl fmt::Debug for ActionLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionLog")
            .field("enabled", &self.writer.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 5, 14, 7, 9).unwrap()
    }

    #[test]
    fn test_entry_format() {
        assert_eq!(
            format_entry(at(), RequestVerb::Delete, "91158733500025"),
            "2024-03-05T14:07:09.000Z - DELETE request for SIRET: 91158733500025\n"
        );
    }

    #[test]
    fn test_entry_escapes_line_breaks() {
        let line = format_entry(at(), RequestVerb::Get, "1\n2024-01-01 - forged");
        assert_eq!(line.matches('\n').count(), 1);
        assert!(line.contains("1\\n2024"));

        let line = format_entry(at(), RequestVerb::Get, "a\tb\u{1b}c");
        assert!(line.ends_with("SIRET: a\\tb\\u{1b}c\n"));
    }

    #[test]
    fn test_entry_keeps_quotes_and_backslashes() {
        let line = format_entry(at(), RequestVerb::Get, r#"91"1'5\8"#);
        assert_eq!(
            line,
            "2024-03-05T14:07:09.000Z - GET request for SIRET: 91\"1'5\\8\n"
        );
    }

    #[test]
    fn test_lines_are_appended_to_file() {
        let dir = tempfile::tempdir().unwrap();
        {
            let (log, _guard) = ActionLog::to_file(dir.path(), "log.txt");
            log.record_at(at(), RequestVerb::Add, "91158733500025");
            log.record_at(at(), RequestVerb::Get, "91158733500025");
        }
        {
            let (log, _guard) = ActionLog::to_file(dir.path(), "log.txt");
            log.record_at(at(), RequestVerb::Update, "91158733500025");
        }

        let contents = std::fs::read_to_string(dir.path().join("log.txt")).unwrap();
        let lines: Vec<_> = contents.lines().collect();
        assert_eq!(
            lines,
            vec![
                "2024-03-05T14:07:09.000Z - ADD request for SIRET: 91158733500025",
                "2024-03-05T14:07:09.000Z - GET request for SIRET: 91158733500025",
                "2024-03-05T14:07:09.000Z - UPDATE request for SIRET: 91158733500025",
            ]
        );
    }

    #[test]
    fn test_disabled_log_is_noop() {
        ActionLog::disabled().record(RequestVerb::Get, "91158733500025");
    }
}
