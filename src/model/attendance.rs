use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;
use uuid::Uuid;

/// A clock-in row as stored by the backend. Never modified on this side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({
    "id": "6f1c1c7e-3a0b-4d5e-9a55-7d2f0f3f6a10",
    "nama": "Hilmy Raihan",
    "action": "hadir",
    "client_ip": "192.168.1.23",
    "created_at": "2024-03-05T02:30:00Z"
}))]
pub struct AttendanceRecord {
    #[schema(value_type = String, format = "uuid")]
    pub id: Uuid,

    #[serde(rename = "nama", alias = "name")]
    pub person_name: String,

    /// Free text, usually "hadir" | "izin" | "sakit"
    #[serde(default)]
    pub action: Option<String>,

    #[serde(default)]
    pub client_ip: Option<String>,

    #[schema(value_type = String, format = "date-time")]
    pub created_at: DateTime<Utc>,
}

/// Derived status of one calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, ToSchema)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum DailyStatus {
    NotClockedIn,
    Present,
    OnLeave,
    Sick,
}

/// What a person may submit for a day.
///
/// Serialized with the backend's vocabulary; parsing also accepts the
/// English names, case-insensitively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, ToSchema)]
#[strum(ascii_case_insensitive)]
pub enum AttendanceAction {
    #[serde(rename = "hadir")]
    #[strum(to_string = "hadir", serialize = "present", serialize = "check-in", serialize = "check_in")]
    Present,

    #[serde(rename = "izin")]
    #[strum(to_string = "izin", serialize = "leave")]
    OnLeave,

    #[serde(rename = "sakit")]
    #[strum(to_string = "sakit", serialize = "sick")]
    Sick,
}

impl From<AttendanceAction> for DailyStatus {
    fn from(action: AttendanceAction) -> Self {
        match action {
            AttendanceAction::Present => DailyStatus::Present,
            AttendanceAction::OnLeave => DailyStatus::OnLeave,
            AttendanceAction::Sick => DailyStatus::Sick,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct CalendarDay {
    #[schema(value_type = String, format = "date", example = "2024-03-05")]
    pub date: NaiveDate,
    pub is_today: bool,
    pub status: DailyStatus,
    /// Only ever true when `status` is `present`
    pub is_late: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record: Option<AttendanceRecord>,
}

/// Counters for the month currently on screen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct MonthStats {
    pub present_on_time: u32,
    pub present_late: u32,
    pub on_leave: u32,
    pub sick: u32,
    /// Past days without any record
    pub absent: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum DayLabel {
    #[strum(to_string = "Absent (no clock-in)")]
    Absent,
    #[strum(to_string = "Not clocked in")]
    NotClockedIn,
    #[strum(to_string = "Present (on time)")]
    PresentOnTime,
    #[strum(to_string = "Present (late)")]
    PresentLate,
    #[strum(to_string = "On leave")]
    OnLeave,
    #[strum(to_string = "Sick")]
    Sick,
}
