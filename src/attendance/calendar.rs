use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use derive_more::Display;

use crate::attendance::classify::classify;
use crate::attendance::clock::{LocalParts, LocalZone};
use crate::model::attendance::{AttendanceRecord, CalendarDay, DailyStatus, DayLabel, MonthStats};

#[derive(Debug, Display, PartialEq, Eq)]
pub enum CalendarError {
    #[display(fmt = "month index {} is outside 0..=11", _0)]
    MonthOutOfRange(u32),
    #[display(fmt = "year {} is out of range", _0)]
    YearOutOfRange(i32),
}

impl std::error::Error for CalendarError {}

/// `month` is 1-12.
pub fn days_in_month(year: i32, month: u32) -> Option<u32> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    u32::try_from(next.signed_duration_since(first).num_days()).ok()
}

/// Ascending by timestamp. Stable, so equal timestamps keep input order.
fn sorted_by_time(records: &[AttendanceRecord]) -> Vec<&AttendanceRecord> {
    let mut sorted: Vec<&AttendanceRecord> = records.iter().collect();
    sorted.sort_by_key(|r| r.created_at);
    sorted
}

fn day_from_record(date: NaiveDate, is_today: bool, rec: &AttendanceRecord, parts: &LocalParts) -> CalendarDay {
    let (status, is_late) = classify(rec.action.as_deref(), parts);
    CalendarDay {
        date,
        is_today,
        status,
        is_late,
        record: Some(rec.clone()),
    }
}

fn empty_day(date: NaiveDate, is_today: bool) -> CalendarDay {
    CalendarDay {
        date,
        is_today,
        status: DailyStatus::NotClockedIn,
        is_late: false,
        record: None,
    }
}

/// One entry per day of the month, the last record of each local day
/// deciding its status.
pub fn build_calendar_days(
    records: &[AttendanceRecord],
    year: i32,
    month_index: u32,
    zone: &LocalZone,
    now: DateTime<Utc>,
) -> Result<Vec<CalendarDay>, CalendarError> {
    if month_index > 11 {
        return Err(CalendarError::MonthOutOfRange(month_index));
    }
    let month = month_index + 1;
    let day_count = days_in_month(year, month).ok_or(CalendarError::YearOutOfRange(year))?;

    let mut latest: BTreeMap<u32, (&AttendanceRecord, LocalParts)> = BTreeMap::new();
    for rec in sorted_by_time(records) {
        let parts = zone.parts(rec.created_at);
        if parts.year != year || parts.month != month {
            continue;
        }
        latest.insert(parts.day, (rec, parts));
    }

    let today = zone.parts(now);
    let viewing_current_month = today.year == year && today.month == month;

    (1..=day_count)
        .map(|day| {
            let date = NaiveDate::from_ymd_opt(year, month, day)
                .ok_or(CalendarError::YearOutOfRange(year))?;
            let is_today = viewing_current_month && today.day == day;
            Ok(match latest.get(&day) {
                Some((rec, parts)) => day_from_record(date, is_today, rec, parts),
                None => empty_day(date, is_today),
            })
        })
        .collect()
}

/// Today's outcome from the whole history, independent of the month
/// being viewed.
pub fn build_today(records: &[AttendanceRecord], zone: &LocalZone, now: DateTime<Utc>) -> CalendarDay {
    let today = zone.parts(now);
    let date = zone.today(now);

    let last = sorted_by_time(records)
        .into_iter()
        .map(|rec| (rec, zone.parts(rec.created_at)))
        .filter(|(_, parts)| parts.same_day(&today))
        .last();

    match last {
        Some((rec, parts)) => day_from_record(date, true, rec, &parts),
        None => empty_day(date, true),
    }
}

pub fn month_stats(days: &[CalendarDay], today: NaiveDate) -> MonthStats {
    days.iter().fold(MonthStats::default(), |mut stats, day| {
        match day.status {
            DailyStatus::Present if day.is_late => stats.present_late += 1,
            DailyStatus::Present => stats.present_on_time += 1,
            DailyStatus::OnLeave => stats.on_leave += 1,
            DailyStatus::Sick => stats.sick += 1,
            DailyStatus::NotClockedIn if day.date < today => stats.absent += 1,
            DailyStatus::NotClockedIn => {}
        }
        stats
    })
}

pub fn label_for_day(day: &CalendarDay, today: NaiveDate) -> DayLabel {
    match day.status {
        DailyStatus::NotClockedIn if day.date < today => DayLabel::Absent,
        DailyStatus::NotClockedIn => DayLabel::NotClockedIn,
        DailyStatus::Present if day.is_late => DayLabel::PresentLate,
        DailyStatus::Present => DayLabel::PresentOnTime,
        DailyStatus::OnLeave => DayLabel::OnLeave,
        DailyStatus::Sick => DayLabel::Sick,
    }
}

/// Records whose name matches, ignoring case and surrounding whitespace.
pub fn records_for_person(records: &[AttendanceRecord], name: &str) -> Vec<AttendanceRecord> {
    let target = name.trim().to_lowercase();
    if target.is_empty() {
        return Vec::new();
    }
    records
        .iter()
        .filter(|rec| rec.person_name.trim().to_lowercase() == target)
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use uuid::Uuid;

    fn record(action: &str, created_at: &str) -> AttendanceRecord {
        AttendanceRecord {
            id: Uuid::new_v4(),
            person_name: "Hilmy".to_string(),
            action: Some(action.to_string()),
            client_ip: None,
            created_at: created_at.parse().unwrap(),
        }
    }

    fn now(y: i32, mo: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, 0, 0).unwrap()
    }

    fn date(y: i32, mo: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, mo, d).unwrap()
    }

    #[test]
    fn on_time_clock_in_marks_day_present() {
        let records = vec![record("present", "2024-03-05T02:30:00Z")];
        let days = build_calendar_days(&records, 2024, 2, &LocalZone::wib(), now(2024, 4, 1, 0)).unwrap();

        assert_eq!(days.len(), 31);
        let day5 = &days[4];
        assert_eq!(day5.date, date(2024, 3, 5));
        assert_eq!(day5.status, DailyStatus::Present);
        assert!(!day5.is_late);
        assert_eq!(day5.record.as_ref(), Some(&records[0]));
    }

    #[test]
    fn quarter_past_ten_is_late() {
        let records = vec![record("present", "2024-03-05T03:15:00Z")];
        let days = build_calendar_days(&records, 2024, 2, &LocalZone::wib(), now(2024, 4, 1, 0)).unwrap();

        assert_eq!(days[4].status, DailyStatus::Present);
        assert!(days[4].is_late);
    }

    #[test]
    fn last_record_of_the_day_wins_regardless_of_input_order() {
        let records = vec![
            record("sakit", "2024-03-05T09:00:00Z"),
            record("hadir", "2024-03-05T01:00:00Z"),
            record("izin", "2024-03-05T05:00:00Z"),
        ];
        let days = build_calendar_days(&records, 2024, 2, &LocalZone::wib(), now(2024, 4, 1, 0)).unwrap();

        assert_eq!(days[4].status, DailyStatus::Sick);
        assert_eq!(days[4].record.as_ref(), Some(&records[0]));
    }

    #[test]
    fn equal_timestamps_keep_input_order() {
        let records = vec![
            record("hadir", "2024-03-05T01:00:00Z"),
            record("izin", "2024-03-05T01:00:00Z"),
        ];
        let days = build_calendar_days(&records, 2024, 2, &LocalZone::wib(), now(2024, 4, 1, 0)).unwrap();
        assert_eq!(days[4].status, DailyStatus::OnLeave);
    }

    #[test]
    fn records_bucket_by_local_day_not_utc_day() {
        // 2024-03-04 20:00 UTC is 03:00 on the 5th in Jakarta
        let records = vec![record("hadir", "2024-03-04T20:00:00Z")];
        let days = build_calendar_days(&records, 2024, 2, &LocalZone::wib(), now(2024, 4, 1, 0)).unwrap();

        assert_eq!(days[3].status, DailyStatus::NotClockedIn);
        assert_eq!(days[4].status, DailyStatus::Present);
    }

    #[test]
    fn empty_history_yields_full_month_of_not_clocked_in() {
        let days = build_calendar_days(&[], 2024, 1, &LocalZone::wib(), now(2024, 4, 1, 0)).unwrap();

        assert_eq!(days.len(), 29);
        assert!(days
            .iter()
            .all(|d| d.status == DailyStatus::NotClockedIn && !d.is_late && d.record.is_none()));
    }

    #[test]
    fn records_from_other_months_are_ignored() {
        let records = vec![
            record("hadir", "2024-02-10T02:00:00Z"),
            record("hadir", "2023-03-10T02:00:00Z"),
        ];
        let days = build_calendar_days(&records, 2024, 2, &LocalZone::wib(), now(2024, 4, 1, 0)).unwrap();
        assert!(days.iter().all(|d| d.status == DailyStatus::NotClockedIn));
    }

    #[test]
    fn late_flag_never_set_for_non_present_days() {
        let records = vec![
            record("izin", "2024-03-01T08:00:00Z"),
            record("sakit", "2024-03-02T08:00:00Z"),
        ];
        let days = build_calendar_days(&records, 2024, 2, &LocalZone::wib(), now(2024, 4, 1, 0)).unwrap();
        assert!(days.iter().all(|d| !d.is_late || d.status == DailyStatus::Present));
    }

    #[test]
    fn marks_today_only_in_current_month() {
        let zone = LocalZone::wib();
        // 2024-03-14 20:00 UTC = 2024-03-15 03:00 WIB
        let clock = now(2024, 3, 14, 20);

        let march = build_calendar_days(&[], 2024, 2, &zone, clock).unwrap();
        let flagged: Vec<_> = march.iter().filter(|d| d.is_today).collect();
        assert_eq!(flagged.len(), 1);
        assert_eq!(flagged[0].date, date(2024, 3, 15));

        let april = build_calendar_days(&[], 2024, 3, &zone, clock).unwrap();
        assert!(april.iter().all(|d| !d.is_today));
    }

    #[test]
    fn rejects_month_index_past_december() {
        let err = build_calendar_days(&[], 2024, 12, &LocalZone::wib(), now(2024, 4, 1, 0)).unwrap_err();
        assert_eq!(err, CalendarError::MonthOutOfRange(12));
    }

    #[test]
    fn days_in_month_handles_leap_years_and_december() {
        assert_eq!(days_in_month(2024, 2), Some(29));
        assert_eq!(days_in_month(2023, 2), Some(28));
        assert_eq!(days_in_month(2024, 12), Some(31));
        assert_eq!(days_in_month(2024, 4), Some(30));
        assert_eq!(days_in_month(2024, 13), None);
    }

    #[test]
    fn today_without_records_is_not_clocked_in() {
        let today = build_today(&[], &LocalZone::wib(), now(2024, 3, 5, 1));
        assert_eq!(today.date, date(2024, 3, 5));
        assert!(today.is_today);
        assert_eq!(today.status, DailyStatus::NotClockedIn);
        assert!(today.record.is_none());
    }

    #[test]
    fn today_takes_latest_record_of_the_local_day() {
        let records = vec![
            record("hadir", "2024-03-05T03:30:00Z"),
            record("hadir", "2024-03-04T02:00:00Z"),
            record("izin", "2024-03-05T01:00:00Z"),
        ];
        let today = build_today(&records, &LocalZone::wib(), now(2024, 3, 5, 6));

        assert_eq!(today.status, DailyStatus::Present);
        assert!(today.is_late);
        assert_eq!(today.record.as_ref(), Some(&records[0]));
    }

    #[test]
    fn today_ignores_yesterday() {
        let records = vec![record("hadir", "2024-03-04T02:00:00Z")];
        let today = build_today(&records, &LocalZone::wib(), now(2024, 3, 5, 6));
        assert_eq!(today.status, DailyStatus::NotClockedIn);
    }

    #[test]
    fn stats_count_absences_only_for_past_days() {
        let records = vec![
            record("hadir", "2024-03-01T02:00:00Z"),
            record("hadir", "2024-03-04T04:00:00Z"),
            record("izin", "2024-03-05T02:00:00Z"),
            record("sakit", "2024-03-06T02:00:00Z"),
        ];
        let days = build_calendar_days(&records, 2024, 2, &LocalZone::wib(), now(2024, 3, 10, 0)).unwrap();
        let stats = month_stats(&days, date(2024, 3, 10));

        assert_eq!(
            stats,
            MonthStats {
                present_on_time: 1,
                present_late: 1,
                on_leave: 1,
                sick: 1,
                // 2, 3, 7, 8, 9
                absent: 5,
            }
        );
    }

    #[test]
    fn labels_distinguish_past_and_future_gaps() {
        let today = date(2024, 3, 10);
        let past = empty_day(date(2024, 3, 9), false);
        let current = empty_day(today, true);

        assert_eq!(label_for_day(&past, today), DayLabel::Absent);
        assert_eq!(label_for_day(&current, today), DayLabel::NotClockedIn);
        assert_eq!(DayLabel::PresentLate.to_string(), "Present (late)");
    }

    #[test]
    fn person_filter_ignores_case_and_padding() {
        let mut other = record("hadir", "2024-03-05T02:00:00Z");
        other.person_name = "Someone Else".to_string();
        let mut padded = record("hadir", "2024-03-05T02:00:00Z");
        padded.person_name = "  HILMY ".to_string();

        let records = vec![record("hadir", "2024-03-05T02:00:00Z"), other, padded];
        assert_eq!(records_for_person(&records, "hilmy").len(), 2);
        assert!(records_for_person(&records, "   ").is_empty());
    }
}
