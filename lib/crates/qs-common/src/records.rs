use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Timestamp layout accepted in retrieval payloads (the store's native format).
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Record families that retrieval commands export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    CommandLog,
    SystemMessages,
    FlightData,
}

impl RecordKind {
    /// Category name used in output artifact names.
    #[must_use]
    pub const fn category(self) -> &'static str {
        match self {
            Self::CommandLog => "command_log",
            Self::SystemMessages => "system_messages",
            Self::FlightData => "flight",
        }
    }
}

/// Selection applied to a record query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "by", content = "value")]
pub enum RecordFilter {
    /// Every record.
    All,
    /// Records of one recording session.
    Session(i64),
    /// Records at or after a point in time.
    Since(NaiveDateTime),
}
