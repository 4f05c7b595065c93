use std::str::FromStr;

use crate::attendance::calendar::{
    CalendarError, build_calendar_days, build_today, label_for_day, month_stats, records_for_person,
};
use crate::auth::auth::AuthUser;
use crate::backend::BackendClient;
use crate::config::Config;
use crate::error::ApiError;
use crate::model::attendance::{AttendanceAction, AttendanceRecord, CalendarDay, DailyStatus, DayLabel, MonthStats};
use crate::model::envelope::Envelope;
use crate::utils::history_cache::HistoryCache;
use actix_web::{HttpResponse, web};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CalendarQuery {
    /// Person to show, matched case-insensitively
    pub name: String,
    /// Defaults to the current local year
    pub year: Option<i32>,
    /// 0 = January ... 11 = December; defaults to the current local month
    pub month: Option<u32>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct TodayQuery {
    pub name: String,
}

#[derive(Debug, Deserialize, ToSchema)]
#[schema(example = json!({"name": "Hilmy Raihan", "action": "hadir"}))]
pub struct SubmitAttendance {
    pub name: String,
    /// hadir | izin | sakit (English names accepted)
    pub action: String,
}

/// A calendar day with the label the dashboard shows for it.
#[derive(Debug, Serialize, ToSchema)]
pub struct LabeledDay {
    #[serde(flatten)]
    pub day: CalendarDay,
    pub label: DayLabel,
    pub label_text: String,
}

impl LabeledDay {
    fn new(day: CalendarDay, today: NaiveDate) -> Self {
        let label = label_for_day(&day, today);
        Self {
            day,
            label,
            label_text: label.to_string(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CalendarResponse {
    pub name: String,
    pub year: i32,
    /// 0-based month index
    pub month: u32,
    pub zone: String,
    pub days: Vec<LabeledDay>,
    pub stats: MonthStats,
    pub today: LabeledDay,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SubmitResponse {
    pub record: AttendanceRecord,
    pub today: LabeledDay,
    /// e.g. `05/03/2024 09.30.00 WIB`
    pub recorded_at: String,
}

fn required_name(raw: &str) -> Result<&str, ApiError> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(ApiError::BadRequest("name is required".into()));
    }
    Ok(name)
}

/// Monthly calendar for one person
#[utoipa::path(
    get,
    path = "/api/attendance/calendar",
    params(CalendarQuery),
    responses(
        (status = 200, description = "Calendar days and month counters", body = CalendarResponse),
        (status = 400, description = "Blank name or month outside 0..=11"),
        (status = 401, description = "Unauthorized"),
        (status = 502, description = "Backend unavailable")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn get_calendar(
    _auth: AuthUser,
    query: web::Query<CalendarQuery>,
    config: web::Data<Config>,
    backend: web::Data<BackendClient>,
    cache: web::Data<HistoryCache>,
) -> Result<HttpResponse, ApiError> {
    let name = required_name(&query.name)?;
    let zone = &config.zone;
    let now = Utc::now();
    let current = zone.parts(now);

    let year = query.year.unwrap_or(current.year);
    let month = query.month.unwrap_or(current.month - 1);
    if month > 11 {
        return Err(CalendarError::MonthOutOfRange(month).into());
    }

    let history = cache.recent(&backend).await?;
    let records = records_for_person(&history, name);

    let today = zone.today(now);
    let days = build_calendar_days(&records, year, month, zone, now)?;
    let stats = month_stats(&days, today);
    let today_day = LabeledDay::new(build_today(&records, zone, now), today);

    Ok(HttpResponse::Ok().json(Envelope::ok(CalendarResponse {
        name: name.to_string(),
        year,
        month,
        zone: zone.label().to_string(),
        days: days.into_iter().map(|d| LabeledDay::new(d, today)).collect(),
        stats,
        today: today_day,
    })))
}

/// Today's status for one person
#[utoipa::path(
    get,
    path = "/api/attendance/today",
    params(TodayQuery),
    responses(
        (status = 200, description = "Today's status", body = LabeledDay),
        (status = 400, description = "Blank name"),
        (status = 401, description = "Unauthorized"),
        (status = 502, description = "Backend unavailable")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn get_today(
    _auth: AuthUser,
    query: web::Query<TodayQuery>,
    config: web::Data<Config>,
    backend: web::Data<BackendClient>,
    cache: web::Data<HistoryCache>,
) -> Result<HttpResponse, ApiError> {
    let name = required_name(&query.name)?;
    let now = Utc::now();
    let history = cache.recent(&backend).await?;
    let records = records_for_person(&history, name);
    let day = build_today(&records, &config.zone, now);

    Ok(HttpResponse::Ok().json(Envelope::ok(LabeledDay::new(day, config.zone.today(now)))))
}

/// Submit today's attendance
///
/// One submission per person per local day; later changes go through an
/// administrator.
#[utoipa::path(
    post,
    path = "/api/attendance",
    request_body = SubmitAttendance,
    responses(
        (status = 201, description = "Attendance recorded", body = SubmitResponse),
        (status = 400, description = "Blank name or unknown action", body = Object, example = json!({
            "success": false,
            "message": "action must be one of hadir, izin, sakit"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 409, description = "Already recorded today", body = Object, example = json!({
            "success": false,
            "message": "Attendance for today is already recorded as present"
        })),
        (status = 502, description = "Backend unavailable")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn submit_attendance(
    auth: AuthUser,
    body: web::Json<SubmitAttendance>,
    config: web::Data<Config>,
    backend: web::Data<BackendClient>,
    cache: web::Data<HistoryCache>,
) -> Result<HttpResponse, ApiError> {
    let name = required_name(&body.name)?;
    let action = AttendanceAction::from_str(body.action.trim())
        .map_err(|_| ApiError::BadRequest("action must be one of hadir, izin, sakit".into()))?;

    let zone = &config.zone;
    let now = Utc::now();

    // The duplicate check must not trust a stale copy.
    let history = cache.refresh(&backend).await?;
    let existing = build_today(&records_for_person(&history, name), zone, now);
    if existing.status != DailyStatus::NotClockedIn {
        return Err(ApiError::Conflict(format!(
            "Attendance for today is already recorded as {}",
            existing.status.to_string().replace('_', " ")
        )));
    }

    let record = backend.submit_attendance(name, action).await?;
    cache.invalidate().await;

    tracing::info!(
        user_id = %auth.user_id,
        name,
        %action,
        record_id = %record.id,
        "Attendance submitted"
    );

    let recorded_at = zone.format_human(record.created_at);
    let today = build_today(std::slice::from_ref(&record), zone, now);
    let today = LabeledDay::new(today, zone.today(now));

    Ok(HttpResponse::Created().json(
        Envelope::ok(SubmitResponse {
            record,
            today,
            recorded_at,
        })
        .with_message("Attendance recorded"),
    ))
}
