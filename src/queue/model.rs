use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Layout of the job timestamps the backend hands out.
pub const QUEUE_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";
const DISPLAY_TIMESTAMP_FORMAT: &str = "%m/%d/%Y %H:%M:%S";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueueStatus {
    Pending,
    Processing,
    Completed,
    Failed,
    #[serde(other)]
    Unknown,
}

impl std::fmt::Display for QueueStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QueueStatus::Pending => write!(f, "pending"),
            QueueStatus::Processing => write!(f, "processing"),
            QueueStatus::Completed => write!(f, "completed"),
            QueueStatus::Failed => write!(f, "failed"),
            QueueStatus::Unknown => write!(f, "unknown"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
    pub timestamp: String,
    pub status: QueueStatus,
}

impl QueueItem {
    /// One rendered row: optional author, formatted time, status.
    pub fn display_line(&self) -> String {
        let when = format_timestamp(&self.timestamp);
        match self.user_name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => format!("{name} - {when} - {}", self.status),
            _ => format!("{when} - {}", self.status),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueResponse {
    pub queue: Vec<QueueItem>,
}

/// Render a `YYYYMMDD_HHMMSS` stamp as `MM/DD/YYYY HH:MM:SS`.
///
/// Stamps that are not valid dates are still rearranged by position; strings
/// too short for that are returned unchanged.
pub fn format_timestamp(timestamp: &str) -> String {
    if let Ok(parsed) = NaiveDateTime::parse_from_str(timestamp, QUEUE_TIMESTAMP_FORMAT) {
        return parsed.format(DISPLAY_TIMESTAMP_FORMAT).to_string();
    }
    slice_timestamp(timestamp).unwrap_or_else(|| timestamp.to_string())
}

fn slice_timestamp(timestamp: &str) -> Option<String> {
    let year = timestamp.get(0..4)?;
    let month = timestamp.get(4..6)?;
    let day = timestamp.get(6..8)?;
    let hour = timestamp.get(9..11)?;
    let minute = timestamp.get(11..13)?;
    let second = timestamp.get(13..15)?;
    Some(format!("{month}/{day}/{year} {hour}:{minute}:{second}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_backend_timestamp() {
        assert_eq!(format_timestamp("20250119_085732"), "01/19/2025 08:57:32");
    }

    #[test]
    fn invalid_date_is_rearranged_by_position() {
        assert_eq!(format_timestamp("20251399_250000"), "13/99/2025 25:00:00");
    }

    #[test]
    fn short_stamp_is_left_alone() {
        assert_eq!(format_timestamp("2025"), "2025");
        assert_eq!(format_timestamp(""), "");
    }

    #[test]
    fn parses_queue_payload_with_and_without_names() {
        let body = r#"{"queue":[
            {"timestamp":"20250119_085732","status":"pending"},
            {"user_name":"Ada","timestamp":"20250119_085800","status":"processing"},
            {"timestamp":"20250119_090000","status":"archived"}
        ]}"#;
        let response: QueueResponse = serde_json::from_str(body).expect("parse");

        assert_eq!(response.queue.len(), 3);
        assert_eq!(response.queue[0].user_name, None);
        assert_eq!(response.queue[1].user_name.as_deref(), Some("Ada"));
        assert_eq!(response.queue[1].status, QueueStatus::Processing);
        assert_eq!(response.queue[2].status, QueueStatus::Unknown);
    }

    #[test]
    fn display_line_includes_name_when_present() {
        let mut item = QueueItem {
            user_name: Some("Ada".into()),
            timestamp: "20250119_085732".into(),
            status: QueueStatus::Completed,
        };
        assert_eq!(item.display_line(), "Ada - 01/19/2025 08:57:32 - completed");

        item.user_name = Some("   ".into());
        item.status = QueueStatus::Failed;
        assert_eq!(item.display_line(), "01/19/2025 08:57:32 - failed");
    }
}
