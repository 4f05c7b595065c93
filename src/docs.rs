use crate::api::attendance::{CalendarResponse, LabeledDay, SubmitAttendance, SubmitResponse};
use crate::live::client::LiveSnapshot;
use crate::live::notify::{Level, Notification, NotifyKind};
use crate::live::state::{ConnectionState, LiveStatus};
use crate::model::attendance::{
    AttendanceAction, AttendanceRecord, CalendarDay, DailyStatus, DayLabel, MonthStats,
};
use crate::model::live::Topic;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi, openapi};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "SBP Dashboard API",
        version = "1.0.0",
        description = r#"
## SBP Dashboard backend-for-frontend

Sits between the SBP dashboard and the SBP backend. It derives what the
dashboard shows from backend data and keeps the backend's live feeds
connected.

### Key Features
- **Attendance**
  - Monthly calendar with per-day status and lateness (after 10:00 WIB)
  - Today's status and once-per-day submission (hadir / izin / sakit)
- **Live feeds**
  - Connection state, recent messages and notifications per topic
  - Automatic reconnect with capped backoff, plus manual reconnect
- **Print**
  - A5 payslips and cash advance statements as printable HTML

### Security
All `/api` endpoints require a **JWT Bearer** token issued by the SBP backend.
Print endpoints are limited to **HR** and **Admin**.

### Response Format
JSON endpoints answer `{ "success": bool, "data": ..., "message": ... }`.
"#,
    ),
    paths(
        crate::api::health::health,

        crate::api::attendance::get_calendar,
        crate::api::attendance::get_today,
        crate::api::attendance::submit_attendance,

        crate::api::live::list_live,
        crate::api::live::get_live,
        crate::api::live::reconnect_live,

        crate::api::print::print_payslip,
        crate::api::print::print_cash_advance
    ),
    components(
        schemas(
            AttendanceRecord,
            AttendanceAction,
            DailyStatus,
            DayLabel,
            CalendarDay,
            MonthStats,
            LabeledDay,
            CalendarResponse,
            SubmitAttendance,
            SubmitResponse,
            Topic,
            ConnectionState,
            LiveStatus,
            LiveSnapshot,
            NotifyKind,
            Level,
            Notification
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Liveness"),
        (name = "Attendance", description = "Attendance calendar and submission APIs"),
        (name = "Live", description = "Backend live feed status APIs"),
        (name = "Print", description = "Printable payroll documents"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}
