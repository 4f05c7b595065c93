use std::str::FromStr;

use crate::attendance::clock::LocalParts;
use crate::model::attendance::{AttendanceAction, DailyStatus};

/// End of the 09:00:00 to 10:00:00 clock-in window, inclusive.
pub const WINDOW_END_SECS: u32 = 10 * 3600;

/// Map a raw action to a daily status.
///
/// A record exists, so anything unrecognised (empty included) counts as
/// present.
pub fn classify_action(action: Option<&str>) -> DailyStatus {
    let action = action.unwrap_or_default().trim();
    AttendanceAction::from_str(action)
        .map(DailyStatus::from)
        .unwrap_or(DailyStatus::Present)
}

/// Strictly after 10:00:00 is late. Early arrivals are never flagged.
pub fn is_late(parts: &LocalParts) -> bool {
    parts.seconds_of_day() > WINDOW_END_SECS
}

pub fn classify(action: Option<&str>, parts: &LocalParts) -> (DailyStatus, bool) {
    let status = classify_action(action);
    let late = status == DailyStatus::Present && is_late(parts);
    (status, late)
}
