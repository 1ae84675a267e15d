//! Session exports
//!
//! Serialization of the two artifacts a session leaves behind: the summary
//! record as JSON and the behavior log as delimited text. Both carry event
//! descriptions and timestamps only; raw imagery and landmark coordinates
//! never cross this boundary.

use crate::error::MonitorError;
use crate::types::{LogEntry, SessionSummary};

/// Header row of the behavior log export.
pub const LOG_CSV_HEADER: &str = "Timestamp,Type,Message,Details";

/// Serialize a session summary as pretty-printed JSON.
pub fn summary_to_json(summary: &SessionSummary) -> Result<String, MonitorError> {
    Ok(serde_json::to_string_pretty(summary)?)
}

/// Render the behavior log as CSV. Every field is quoted, with embedded
/// quotes doubled, so messages may contain commas and newlines.
pub fn log_to_csv(entries: &[LogEntry]) -> String {
    let mut out = String::with_capacity(64 * (entries.len() + 1));
    out.push_str(LOG_CSV_HEADER);
    out.push('\n');
    for entry in entries {
        out.push_str(&format!(
            "\"{}\",\"{}\",\"{}\",\"{}\"\n",
            entry.timestamp.to_rfc3339(),
            entry.kind.as_str(),
            escape(&entry.message),
            escape(&entry.details),
        ));
    }
    out
}

fn escape(field: &str) -> String {
    field.replace('"', "\"\"")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ConfidenceLevel, LogKind};
    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;
    use uuid::Uuid;

    fn make_entry(message: &str, details: &str) -> LogEntry {
        LogEntry {
            timestamp: Utc.with_ymd_and_hms(2024, 1, 15, 9, 0, 0).unwrap(),
            kind: LogKind::Alert,
            message: message.to_string(),
            details: details.to_string(),
        }
    }

    #[test]
    fn test_summary_json_fields() {
        let summary = SessionSummary {
            session_id: Uuid::nil(),
            duration_seconds: 124.5,
            total_alerts: 3,
            gaze_alerts: 2,
            head_alerts: 1,
            absence_alerts: 0,
            final_confidence_level: ConfidenceLevel::Medium,
            profile_name: "standard".to_string(),
        };

        let json = summary_to_json(&summary).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["duration_seconds"], 124.5);
        assert_eq!(value["total_alerts"], 3);
        assert_eq!(value["gaze_alerts"], 2);
        assert_eq!(value["head_alerts"], 1);
        assert_eq!(value["absence_alerts"], 0);
        assert_eq!(value["final_confidence_level"], "medium");
        assert_eq!(value["profile_name"], "standard");
    }

    #[test]
    fn test_csv_header_and_rows() {
        let entries = vec![
            make_entry("Eye gaze LEFT for extended period", "Duration: 3.2s"),
            make_entry("Face not detected", "Duration: 4.0s"),
        ];

        let csv = log_to_csv(&entries);
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], LOG_CSV_HEADER);
        assert!(lines[1].contains("\"alert\""));
        assert!(lines[1].contains("\"Eye gaze LEFT for extended period\""));
        assert!(lines[2].contains("\"Duration: 4.0s\""));
    }

    #[test]
    fn test_csv_escapes_embedded_quotes() {
        let entries = vec![make_entry("said \"hello\"", "")];
        let csv = log_to_csv(&entries);
        assert!(csv.contains("\"said \"\"hello\"\"\""));
    }

    #[test]
    fn test_empty_log_is_header_only() {
        let csv = log_to_csv(&[]);
        assert_eq!(csv, format!("{}\n", LOG_CSV_HEADER));
    }
}
