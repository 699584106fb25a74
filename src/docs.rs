use crate::api::attendance::{
    CheckInReq, OverviewUser, ReportResponse, ScanStatusResponse, UserOverview,
};
use crate::api::chatbot::ChatbotReq;
use crate::api::dashboard::{
    DashboardResponse, MonthlyCount, RankedUser, RecentAttendance,
};
use crate::api::face::{FaceCaptureReq, FaceRequestRow, FaceViewResponse};
use crate::api::leave_request::{CreateLeave, LeaveFilter, LeaveListResponse, LeaveResponse};
use crate::api::master_data::{ImportResult, MasterListResponse};
use crate::api::user::UserListResponse;
use crate::model::master_record::MasterUserRecord;
use crate::model::user::User;
use crate::timeline::{CalendarMark, DayRecord, DayStatus, Summary};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi, openapi};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "AttendEase API",
        version = "1.0.0",
        description = r#"
## AttendEase — Campus Attendance System

Face-verified check-in/check-out for students and faculty, with per-day
attendance reconstruction from enrollment to today.

### Key Features
- **Attendance**
  - Face-verified daily check-in and check-out
  - Per-day status timeline (Present / Absent / Leave / Holiday) and percentages
  - CSV export, month calendar, all-users admin overview
- **Leave Management**
  - Apply for leave, admin approve/reject, leave history
- **Face Management**
  - Enrollment, change requests, auto and manual approval
- **Master Data**
  - CSV import/export of the authorized-users list
- **Dashboard**
  - Today's attendance, top-3 rankings, low-attendance list, monthly charts

### Security
Most endpoints are protected using **JWT Bearer authentication**.
Admin-only operations require the admin role.

---
Built with **Rust**, **Actix Web**, **SQLx**, and **Utoipa**.
"#,
    ),
    paths(
        crate::api::attendance::check_in,
        crate::api::attendance::check_out,
        crate::api::attendance::today_status,
        crate::api::attendance::report,
        crate::api::attendance::report_csv,
        crate::api::attendance::calendar,
        crate::api::attendance::users_overview,

        crate::api::leave_request::create_leave,
        crate::api::leave_request::my_leaves,
        crate::api::leave_request::leave_list,
        crate::api::leave_request::get_leave,
        crate::api::leave_request::approve_leave,
        crate::api::leave_request::reject_leave,

        crate::api::face::face_view,
        crate::api::face::face_add,
        crate::api::face::pending_requests,
        crate::api::face::approve_request,
        crate::api::face::reject_request,

        crate::api::master_data::import,
        crate::api::master_data::list,
        crate::api::master_data::export,

        crate::api::user::list_users,
        crate::api::user::approve_user,

        crate::api::dashboard::dashboard,

        crate::api::chatbot::ask
    ),
    components(
        schemas(
            CheckInReq,
            ScanStatusResponse,
            ReportResponse,
            UserOverview,
            OverviewUser,
            DayRecord,
            DayStatus,
            CalendarMark,
            Summary,
            CreateLeave,
            LeaveFilter,
            LeaveResponse,
            LeaveListResponse,
            FaceCaptureReq,
            FaceViewResponse,
            FaceRequestRow,
            ImportResult,
            MasterListResponse,
            MasterUserRecord,
            User,
            UserListResponse,
            DashboardResponse,
            RankedUser,
            MonthlyCount,
            RecentAttendance,
            ChatbotReq
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Attendance", description = "Attendance tracking APIs"),
        (name = "Leave", description = "Leave management APIs"),
        (name = "Face", description = "Face enrollment and approval APIs"),
        (name = "MasterData", description = "Authorized-users master list APIs"),
        (name = "Users", description = "User administration APIs"),
        (name = "Dashboard", description = "Admin dashboard APIs"),
        (name = "Chatbot", description = "Assistant proxy APIs"),
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
