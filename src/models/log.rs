use serde::{Deserialize, Serialize};

pub const REALM_REVIEWING: &str = "reviewing";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum LogKind {
    Positive,
    Negative,
    Change,
    Other,
}

impl LogKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogKind::Positive => "positive",
            LogKind::Negative => "negative",
            LogKind::Change => "change",
            LogKind::Other => "other",
        }
    }

    pub fn parse(value: &str) -> Self {
        match value {
            "positive" => LogKind::Positive,
            "negative" => LogKind::Negative,
            "change" => LogKind::Change,
            _ => LogKind::Other,
        }
    }
}

/// A new entry to append to an event's log.
#[derive(Debug, Clone)]
pub struct NewLogEntry {
    pub event_id: i64,
    pub realm: &'static str,
    pub kind: LogKind,
    pub module: &'static str,
    pub summary: String,
    pub user_id: Option<i64>,
    pub data: serde_json::Value,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct LogEntry {
    pub id: i64,
    pub event_id: i64,
    pub realm: String,
    pub kind: LogKind,
    pub module: String,
    pub summary: String,
    pub user_id: Option<i64>,
    pub user_name: Option<String>,
    pub logged_dt: String,
    pub data: serde_json::Value,
}
