use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Status of a media-library item.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "u8", into = "u8")]
pub enum LibraryStatus {
    #[default]
    Todo,
    Doing,
    Done,
    Wait,
    GiveUp,
    Archived,
}

impl From<u8> for LibraryStatus {
    fn from(v: u8) -> LibraryStatus {
        match v {
            1 => LibraryStatus::Doing,
            2 => LibraryStatus::Done,
            3 => LibraryStatus::Wait,
            4 => LibraryStatus::GiveUp,
            5 => LibraryStatus::Archived,
            _ => LibraryStatus::Todo,
        }
    }
}

impl From<LibraryStatus> for u8 {
    fn from(v: LibraryStatus) -> u8 {
        match v {
            LibraryStatus::Todo => 0,
            LibraryStatus::Doing => 1,
            LibraryStatus::Done => 2,
            LibraryStatus::Wait => 3,
            LibraryStatus::GiveUp => 4,
            LibraryStatus::Archived => 5,
        }
    }
}

/// What one log entry records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "u8", into = "u8")]
pub enum LogKind {
    #[default]
    StatusChange,
    Score,
    Note,
    /// History before the latest cutoff stays out of the overall timeline.
    TimelineCutoff,
    AddedToLibrary,
}

impl From<u8> for LogKind {
    fn from(v: u8) -> LogKind {
        match v {
            1 => LogKind::Score,
            2 => LogKind::Note,
            3 => LogKind::TimelineCutoff,
            4 => LogKind::AddedToLibrary,
            _ => LogKind::StatusChange,
        }
    }
}

impl From<LogKind> for u8 {
    fn from(v: LogKind) -> u8 {
        match v {
            LogKind::StatusChange => 0,
            LogKind::Score => 1,
            LogKind::Note => 2,
            LogKind::TimelineCutoff => 3,
            LogKind::AddedToLibrary => 4,
        }
    }
}

/// One chronological log entry inside a round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    #[serde(rename = "type", default)]
    pub kind: LogKind,
    #[serde(default = "epoch")]
    pub time: DateTime<Utc>,
    /// New status, for `StatusChange` entries.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<LibraryStatus>,
    /// Score 1–5, for `Score` entries.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<u8>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub score_plus: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub score_sub: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

impl LogEntry {
    pub fn new(kind: LogKind, time: DateTime<Utc>) -> LogEntry {
        LogEntry {
            kind,
            time,
            status: None,
            score: None,
            score_plus: false,
            score_sub: false,
            comment: None,
        }
    }
}

/// One play-through/viewing session, holding its own chronological log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Round {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub logs: Vec<LogEntry>,
    #[serde(default = "epoch")]
    pub start_time: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
}

/// Current version of the serialized payload. The original blob carried no
/// version tag; absence deserializes as 0 and is upgraded on the next save.
pub const LIBRARY_EXTRA_VERSION: u32 = 1;

/// The richer per-task payload serialized as JSON into `PTask.Note`.
///
/// Every field applies a default when absent — older blobs must stay
/// readable, so missing data is never a hard error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LibraryExtra {
    #[serde(default)]
    pub version: u32,
    #[serde(default)]
    pub picture_address: String,
    #[serde(default)]
    pub author: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<u16>,
    #[serde(default)]
    pub remark: String,
    /// Category such as anime / film / game / novel.
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub is_favorite: bool,
    /// Index into `rounds`; exactly one round is current.
    #[serde(default)]
    pub current_round: usize,
    #[serde(default)]
    pub rounds: Vec<Round>,
    /// Designated authoritative score: (round index, log index).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub main_score_round: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub main_score_log: Option<usize>,
    #[serde(default = "epoch")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "epoch")]
    pub updated_at: DateTime<Utc>,
}

fn epoch() -> DateTime<Utc> {
    DateTime::UNIX_EPOCH
}

/// One flattened timeline row across library items, newest first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimelineEntry {
    pub time: DateTime<Utc>,
    pub item_id: u32,
    pub item_title: String,
    pub round_name: String,
    pub kind: LogKind,
    pub status: Option<LibraryStatus>,
    pub score: Option<u8>,
    pub comment: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_log_entry_wire_shape() {
        let entry = LogEntry {
            status: Some(LibraryStatus::Doing),
            ..LogEntry::new(LogKind::StatusChange, epoch())
        };
        let v = serde_json::to_value(&entry).unwrap();
        assert_eq!(v["type"], 0);
        assert_eq!(v["status"], 1);
        // Unset score fields stay off the wire.
        assert!(v.get("score").is_none());
        assert!(v.get("scorePlus").is_none());
    }

    #[test]
    fn test_missing_fields_apply_defaults() {
        let extra: LibraryExtra = serde_json::from_value(serde_json::json!({
            "rounds": [{"name": "first"}],
        }))
        .unwrap();
        assert_eq!(extra.version, 0);
        assert_eq!(extra.current_round, 0);
        assert_eq!(extra.rounds[0].logs.len(), 0);
        assert!(!extra.is_favorite);
    }

    #[test]
    fn test_status_out_of_range_falls_back_to_todo() {
        let status: LibraryStatus = serde_json::from_value(serde_json::json!(42)).unwrap();
        assert_eq!(status, LibraryStatus::Todo);
    }
}
