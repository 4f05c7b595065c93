use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use strum_macros::{Display, EnumIter, EnumString};
use utoipa::ToSchema;

use crate::model::attendance::AttendanceAction;

/// One backend WebSocket channel.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter, ToSchema,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum Topic {
    Attendance,
    Employee,
    Invoice,
    Stock,
}

impl Topic {
    pub fn path(&self) -> &'static str {
        match self {
            Topic::Attendance => "/ws/absensi",
            Topic::Employee => "/ws/pegawai",
            Topic::Invoice => "/ws/invoice",
            Topic::Stock => "/ws",
        }
    }

    /// `tipe` carried by record-change messages on this topic.
    pub fn record_kind(&self) -> Option<&'static str> {
        match self {
            Topic::Employee => Some("masterpegawai"),
            Topic::Invoice => Some("invoice"),
            Topic::Attendance | Topic::Stock => None,
        }
    }

    /// Whether a parsed message belongs on this topic.
    pub fn accepts(&self, msg: &LiveMessage) -> bool {
        match (self, msg) {
            (_, LiveMessage::Unrecognized) => false,
            (Topic::Attendance, LiveMessage::Attendance(_)) => true,
            (Topic::Stock, LiveMessage::Stock(_)) => true,
            (topic, LiveMessage::Record(rec)) => topic.record_kind() == Some(rec.tipe.as_str()),
            _ => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    Created,
    Updated,
    Deleted,
}

/// `{tipe, event, payload}` record change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordEvent {
    pub tipe: String,
    pub event: ChangeKind,
    #[serde(default)]
    pub payload: Value,
}

/// Broadcast after every clock-in attempt on the attendance channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttendanceEvent {
    pub event: String,
    pub status: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub client_ip: Option<String>,
}

impl AttendanceEvent {
    pub fn is_ok(&self) -> bool {
        self.status.eq_ignore_ascii_case("ok")
    }

    /// The action a successful event recorded, if it recorded one.
    pub fn recorded_action(&self) -> Option<AttendanceAction> {
        if !self.is_ok() {
            return None;
        }
        self.event.parse().ok()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StockChange {
    StokCreated,
    StokUpdated,
    StokDeleted,
    MovementCreated,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockEvent {
    pub event: StockChange,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

/// A backend push, tagged by shape. Anything that fits no shape is
/// `Unrecognized` and gets dropped by every topic.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum LiveMessage {
    Record(RecordEvent),
    Attendance(AttendanceEvent),
    Stock(StockEvent),
    Unrecognized,
}

impl LiveMessage {
    pub fn parse(raw: &str) -> Self {
        let Ok(value) = serde_json::from_str::<Value>(raw) else {
            return LiveMessage::Unrecognized;
        };
        let Some(obj) = value.as_object() else {
            return LiveMessage::Unrecognized;
        };

        if obj.contains_key("tipe") {
            serde_json::from_value(value).map(LiveMessage::Record).unwrap_or(LiveMessage::Unrecognized)
        } else if obj.contains_key("status") {
            serde_json::from_value(value).map(LiveMessage::Attendance).unwrap_or(LiveMessage::Unrecognized)
        } else if obj.contains_key("event") {
            serde_json::from_value(value).map(LiveMessage::Stock).unwrap_or(LiveMessage::Unrecognized)
        } else {
            LiveMessage::Unrecognized
        }
    }
}
