use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, Timelike, Utc};
use serde::Serialize;

/// Western Indonesia Time, UTC+7 with no DST.
pub const WIB_OFFSET_HOURS: i32 = 7;

/// Wall-clock fields of an instant in the office zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LocalParts {
    pub year: i32,
    /// 1-12
    pub month: u32,
    pub day: u32,
    pub hour: u32,
    pub minute: u32,
    pub second: u32,
}

impl LocalParts {
    pub fn same_day(&self, other: &LocalParts) -> bool {
        self.year == other.year && self.month == other.month && self.day == other.day
    }

    pub fn seconds_of_day(&self) -> u32 {
        self.hour * 3600 + self.minute * 60 + self.second
    }
}

/// Fixed-offset zone every attendance rule is evaluated in, regardless of
/// where the viewer sits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalZone {
    offset: FixedOffset,
    label: String,
}

impl Default for LocalZone {
    fn default() -> Self {
        Self::wib()
    }
}

impl LocalZone {
    pub fn wib() -> Self {
        Self {
            offset: FixedOffset::east_opt(WIB_OFFSET_HOURS * 3600).expect("UTC+7 is a valid offset"),
            label: "WIB".to_string(),
        }
    }

    /// `None` when the offset is outside +-23 hours.
    pub fn new(offset_hours: i32, label: impl Into<String>) -> Option<Self> {
        if !(-23..=23).contains(&offset_hours) {
            return None;
        }
        let offset = FixedOffset::east_opt(offset_hours * 3600)?;
        Some(Self {
            offset,
            label: label.into(),
        })
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn parts(&self, instant: DateTime<Utc>) -> LocalParts {
        let local = instant.with_timezone(&self.offset);
        LocalParts {
            year: local.year(),
            month: local.month(),
            day: local.day(),
            hour: local.hour(),
            minute: local.minute(),
            second: local.second(),
        }
    }

    pub fn today(&self, now: DateTime<Utc>) -> NaiveDate {
        now.with_timezone(&self.offset).date_naive()
    }

    /// `05/03/2024 09.30.00 WIB`
    pub fn format_human(&self, instant: DateTime<Utc>) -> String {
        let local = instant.with_timezone(&self.offset);
        format!("{} {}", local.format("%d/%m/%Y %H.%M.%S"), self.label)
    }
}
